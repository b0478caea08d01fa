//! Command-line arguments for the code-owner gate.
//!
//! Every option can also be supplied through an environment variable, so the
//! binary runs unchanged inside a GitHub Actions job.

pub mod config;
pub mod github;
pub mod output;

use clap::{Parser, ValueEnum};
use codeowners_gate_core::gate::{
    DEFAULT_CODEOWNERS_PATH, DEFAULT_REQUIRED_APPROVALS, TeamFailurePolicy,
};
use std::path::PathBuf;

/// Default GitHub REST API endpoint.
pub const DEFAULT_GITHUB_BASE_URL: &str = "https://api.github.com/";

/// Code-owner gate - requires approvals from CODEOWNERS on a pull request.
///
/// Fetches the repository's CODEOWNERS file and the pull request's reviews,
/// and passes only when enough code owners currently approve.
#[derive(Parser, Debug)]
#[command(name = "codeowners-gate")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// GitHub token used for all API requests.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_access_token: Option<String>,

    /// GitHub base URL for API requests (for GitHub Enterprise).
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_BASE_URL)]
    pub github_base_url: String,

    /// GitHub App ID for authentication (alternative to access token).
    #[arg(long, env = "GITHUB_APP_ID")]
    pub github_app_id: Option<u64>,

    /// GitHub App Installation ID (required when using App authentication).
    #[arg(long, env = "GITHUB_APP_INSTALLATION_ID")]
    pub github_app_installation_id: Option<u64>,

    /// GitHub App private key in PEM format (required when using App authentication).
    #[arg(long, env = "GITHUB_APP_PRIVATE_KEY", hide_env_values = true)]
    pub github_app_private_key: Option<String>,

    /// Repository in 'owner/repo' format.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Pull request number. Read from the event payload when omitted.
    #[arg(long, env = "PULL_NUMBER")]
    pub pull_number: Option<u64>,

    /// Path to the GitHub Actions event payload.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Path of the CODEOWNERS file inside the repository.
    #[arg(long, env = "CODEOWNERS_PATH", default_value = DEFAULT_CODEOWNERS_PATH)]
    pub codeowners_path: String,

    /// Number of code-owner approvals required to pass.
    #[arg(long, env = "REQUIRED_APPROVALS", default_value_t = DEFAULT_REQUIRED_APPROVALS)]
    pub required_approvals: u32,

    /// What to do when a team's members cannot be fetched.
    #[arg(long, env = "TEAM_FAILURE_POLICY", default_value = "continue")]
    pub team_failure_policy: FailurePolicyArg,

    /// Output the evaluation as JSON instead of human-readable format.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Increase verbosity level (-v for debug, -vv for trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Team resolution failure handling, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FailurePolicyArg {
    /// Warn and treat the team as having no members.
    #[default]
    Continue,
    /// Abort the run.
    Fail,
}

impl From<FailurePolicyArg> for TeamFailurePolicy {
    fn from(arg: FailurePolicyArg) -> Self {
        match arg {
            FailurePolicyArg::Continue => TeamFailurePolicy::Continue,
            FailurePolicyArg::Fail => TeamFailurePolicy::Fail,
        }
    }
}

impl Args {
    /// Returns true if GitHub App authentication is configured.
    pub fn has_github_app_auth(&self) -> bool {
        self.github_app_id.is_some()
            && self.github_app_installation_id.is_some()
            && self.github_app_private_key.is_some()
    }

    /// Returns true if any GitHub authentication is configured.
    pub fn has_github_auth(&self) -> bool {
        self.github_access_token.is_some() || self.has_github_app_auth()
    }
}
