//! Configuration handling for the CLI.
//!
//! Converts CLI arguments (and the GitHub Actions event payload) into the
//! library's configuration types, and sets up GitHub authentication.

use crate::cli::{Args, DEFAULT_GITHUB_BASE_URL};
use codeowners_gate_core::gate::{GateConfig, PullRequestRef};
use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration.
    #[error("missing required configuration: {0}")]
    MissingRequired(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// GitHub authentication error.
    #[error("GitHub authentication error: {0}")]
    GitHubAuth(String),

    /// The event payload is unusable.
    #[error("event payload error: {0}")]
    Event(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The gate passed.
    Success = 0,
    /// Application startup failed (configuration, GitHub access or internal error).
    StartupFailure = 1,
    /// Application terminated by signal (SIGINT/SIGTERM).
    Terminated = 2,
    /// The gate failed (not enough code-owner approvals).
    GateFailed = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// How the CLI authenticates against GitHub.
#[derive(Debug)]
pub enum GithubAuth {
    /// Personal access token or `GITHUB_TOKEN`.
    Token(SecretString),
    /// GitHub App installation.
    App {
        app_id: u64,
        installation_id: u64,
        private_key: SecretString,
    },
}

/// Validated and processed configuration for a gate run.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// The pull request to evaluate.
    pub pull_request: PullRequestRef,
    /// Settings passed to the gate.
    pub gate_config: GateConfig,
    /// GitHub credentials.
    pub auth: GithubAuth,
    /// Custom API base URL, `None` for github.com.
    pub base_url: Option<String>,
    /// Whether to output JSON.
    pub json_output: bool,
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments.
    ///
    /// Performs no network access.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.codeowners_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "CODEOWNERS_PATH must not be empty".to_string(),
            ));
        }
        if args.required_approvals == 0 {
            return Err(ConfigError::Invalid(
                "REQUIRED_APPROVALS must be at least 1".to_string(),
            ));
        }

        let pull_request = resolve_pull_request(
            args.repository.as_deref(),
            args.pull_number,
            args.event_path.as_deref(),
        )?;

        let auth = if args.has_github_app_auth() {
            GithubAuth::App {
                app_id: args.github_app_id.unwrap_or_default(),
                installation_id: args.github_app_installation_id.unwrap_or_default(),
                private_key: SecretString::from(
                    args.github_app_private_key.clone().unwrap_or_default(),
                ),
            }
        } else if let Some(ref token) = args.github_access_token {
            GithubAuth::Token(SecretString::from(token.clone()))
        } else {
            return Err(ConfigError::MissingRequired(
                "GITHUB_TOKEN or GitHub App credentials (GITHUB_APP_ID, GITHUB_APP_INSTALLATION_ID, GITHUB_APP_PRIVATE_KEY)".to_string(),
            ));
        };

        let base_url = match args.github_base_url.trim() {
            "" => None,
            url if url.trim_end_matches('/') == DEFAULT_GITHUB_BASE_URL.trim_end_matches('/') => {
                None
            }
            url => Some(url.to_string()),
        };

        let gate_config = GateConfig::new()
            .with_codeowners_path(args.codeowners_path.trim())
            .with_required_approvals(args.required_approvals)
            .with_team_failure_policy(args.team_failure_policy.into());

        Ok(Self {
            pull_request,
            gate_config,
            auth,
            base_url,
            json_output: args.json,
        })
    }
}

/// The parts of a GitHub Actions event payload the gate reads.
#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestEvent>,
    repository: Option<RepositoryEvent>,
}

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct RepositoryEvent {
    full_name: String,
}

/// Determines which pull request to evaluate.
///
/// An explicit pull number wins; otherwise the event payload must describe a
/// pull request. The repository comes from `repository`, falling back to the
/// payload's `repository.full_name`.
pub fn resolve_pull_request(
    repository: Option<&str>,
    pull_number: Option<u64>,
    event_path: Option<&Path>,
) -> Result<PullRequestRef, ConfigError> {
    let event = match (pull_number, event_path) {
        (Some(_), _) => None,
        (None, Some(path)) => Some(read_event(path)?),
        (None, None) => {
            return Err(ConfigError::MissingRequired(
                "PULL_NUMBER or GITHUB_EVENT_PATH".to_string(),
            ));
        }
    };

    let number = match (pull_number, &event) {
        (Some(number), _) => number,
        (None, Some(EventPayload {
            pull_request: Some(pr),
            ..
        })) => pr.number,
        _ => {
            return Err(ConfigError::Event(
                "must be run on pull request events".to_string(),
            ));
        }
    };

    let full_name = repository
        .map(str::to_string)
        .or_else(|| {
            event
                .and_then(|e| e.repository)
                .map(|repository| repository.full_name)
        })
        .ok_or_else(|| ConfigError::MissingRequired("GITHUB_REPOSITORY".to_string()))?;

    let (owner, repo) = parse_repository(&full_name)?;
    Ok(PullRequestRef::new(owner, repo, number))
}

fn read_event(path: &Path) -> Result<EventPayload, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        ConfigError::Event(format!("failed to parse '{}': {}", path.display(), e))
    })
}

/// Splits `owner/repo` into its parts.
pub fn parse_repository(full_name: &str) -> Result<(&str, &str), ConfigError> {
    match full_name.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(ConfigError::Invalid(format!(
            "repository '{}' is not in 'owner/repo' format",
            full_name
        ))),
    }
}

/// Creates an authenticated Octocrab client.
pub fn create_octocrab(config: &ValidatedConfig) -> Result<Octocrab, ConfigError> {
    let base_url = config.base_url.as_deref();

    match &config.auth {
        GithubAuth::App {
            app_id,
            installation_id,
            private_key,
        } => {
            let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())
                .map_err(|e| ConfigError::GitHubAuth(format!("invalid private key: {}", e)))?;

            let mut app_builder = Octocrab::builder().app(AppId(*app_id), key);
            if let Some(url) = base_url {
                app_builder = app_builder
                    .base_uri(url)
                    .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
            }
            let app_client = app_builder.build().map_err(|e| {
                ConfigError::GitHubAuth(format!("failed to create app client: {}", e))
            })?;

            app_client
                .installation(InstallationId(*installation_id))
                .map_err(|e| {
                    ConfigError::GitHubAuth(format!("failed to get installation client: {}", e))
                })
        }
        GithubAuth::Token(token) => {
            let mut builder = Octocrab::builder();
            if let Some(url) = base_url {
                builder = builder
                    .base_uri(url)
                    .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
            }
            builder
                .personal_token(token.expose_secret().to_string())
                .build()
                .map_err(|e| ConfigError::GitHubAuth(format!("failed to build client: {}", e)))
        }
    }
}
