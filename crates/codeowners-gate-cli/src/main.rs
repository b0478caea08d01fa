//! Code-owner approval gate CLI
//!
//! A command-line tool that fails a pull request check unless enough code
//! owners currently approve it.

use clap::Parser;
use std::io::{self, IsTerminal};
use std::process::ExitCode as StdExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::sync::Notify;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;
use cli::config::{ExitCode, ValidatedConfig, create_octocrab};
use cli::github::OctocrabClient;
use cli::output::{HumanOutput, JsonOutput};
use codeowners_gate_core::gate::{Gate, PullRequestRef};

#[tokio::main]
async fn main() -> StdExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.verbose);

    // Set up signal handling for graceful shutdown
    let terminated = Arc::new(AtomicBool::new(false));
    let terminated_clone = terminated.clone();
    let shutdown = Arc::new(Notify::new());
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        let ctrl_c = signal::ctrl_c();
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }

        terminated_clone.store(true, Ordering::SeqCst);
        shutdown_clone.notify_one();
    });

    // Run the gate, abandoning it if a signal arrives first
    let exit_code = tokio::select! {
        code = run(args) => code,
        _ = shutdown.notified() => ExitCode::Terminated,
    };

    if terminated.load(Ordering::SeqCst) {
        return StdExitCode::from(ExitCode::Terminated as u8);
    }

    StdExitCode::from(i32::from(exit_code) as u8)
}

/// Initialize tracing based on verbosity level.
///
/// The default level is INFO so the owner, approver and match diagnostics
/// always reach the job log. Logs go to stderr, leaving stdout to the report
/// in every output mode.
fn init_tracing(verbosity: u8) {
    let mut filter = EnvFilter::from_default_env().add_directive(tracing_level(verbosity).into());
    for directive in ["octocrab=warn", "hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Maps `-v` counts to a log level; the output format never silences logs.
fn tracing_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Run the gate with the given arguments.
async fn run(args: Args) -> ExitCode {
    let use_colors = !args.json && io::stdout().is_terminal();

    // Validate configuration
    let config = match ValidatedConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            write_failure(args.json, None, &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    debug!("Validated configuration: {:?}", config);
    info!("Pull request: {}", config.pull_request);
    info!(
        "Ownership file: {}, required approvals: {}, team failure policy: {}",
        config.gate_config.codeowners_path,
        config.gate_config.required_approvals,
        config.gate_config.team_failure_policy
    );

    let client = match create_octocrab(&config) {
        Ok(octocrab) => OctocrabClient::new(octocrab),
        Err(e) => {
            report_error(&config, &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    let gate = Gate::new(&client, config.gate_config.clone());
    let evaluation = match gate.run(&config.pull_request).await {
        Ok(evaluation) => evaluation,
        Err(e) => {
            error!("Gate run failed: {}", e);
            report_error(&config, &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    let written = if config.json_output {
        JsonOutput::from_evaluation(&config.pull_request, &evaluation).write(&mut io::stdout())
    } else {
        HumanOutput::new(io::stdout().lock(), use_colors)
            .write_evaluation(&config.pull_request, &evaluation)
    };
    if let Err(e) = written {
        error!("Failed to write output: {}", e);
        return ExitCode::StartupFailure;
    }

    if evaluation.passed() {
        ExitCode::Success
    } else {
        ExitCode::GateFailed
    }
}

/// Reports an error that prevented a verdict.
fn report_error(config: &ValidatedConfig, message: &str, use_colors: bool) {
    write_failure(
        config.json_output,
        Some(&config.pull_request),
        message,
        use_colors,
    );
}

/// Writes a failure as a JSON report on stdout, or as text on stderr.
fn write_failure(json: bool, pr: Option<&PullRequestRef>, message: &str, use_colors: bool) {
    if json {
        let output = JsonOutput::from_error(pr, message);
        if let Err(e) = output.write(&mut io::stdout()) {
            error!("Failed to write JSON output: {}", e);
        }
    } else {
        let _ = HumanOutput::new(io::stderr(), use_colors).write_error(message);
    }
}
