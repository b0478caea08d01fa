//! Error types for gate runs.

use super::github_client::GithubClientError;
use thiserror::Error;

/// A team's membership could not be fetched.
#[derive(Debug, Error)]
#[error("failed to resolve team @{org}/{team}: {source}")]
pub struct TeamResolutionError {
    /// The organization name.
    pub org: String,
    /// The team slug.
    pub team: String,
    /// The underlying client failure.
    #[source]
    pub source: GithubClientError,
}

impl TeamResolutionError {
    /// Creates a new team resolution error.
    pub fn new(org: impl Into<String>, team: impl Into<String>, source: GithubClientError) -> Self {
        Self {
            org: org.into(),
            team: team.into(),
            source,
        }
    }

    /// Returns the team as written in an ownership file (`@org/team`).
    pub fn team_ref(&self) -> String {
        format!("@{}/{}", self.org, self.team)
    }
}

/// Errors that stop a gate run before a verdict can be computed.
#[derive(Debug, Error)]
pub enum GateError {
    /// The ownership file is absent at the configured path.
    #[error("ownership file '{path}' not found")]
    SourceFileNotFound {
        /// The configured path.
        path: String,
    },

    /// The ownership file exists but could not be retrieved.
    #[error("failed to retrieve ownership file '{path}': {source}")]
    FileRetrieval {
        /// The configured path.
        path: String,
        /// The underlying client failure.
        #[source]
        source: GithubClientError,
    },

    /// A team could not be resolved and the run is configured to fail closed.
    #[error(transparent)]
    TeamResolution(#[from] TeamResolutionError),

    /// The pull request's reviews could not be listed.
    #[error("failed to list reviews for {pull_request}: {source}")]
    ReviewListRetrieval {
        /// The pull request, as `owner/repo#number`.
        pull_request: String,
        /// The underlying client failure.
        #[source]
        source: GithubClientError,
    },

    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GateError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
