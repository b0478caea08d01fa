//! GitHub client trait abstraction for the approval gate.
//!
//! The gate never talks to the network itself. Everything it needs from the
//! hosting platform goes through [`GithubClient`], which the host constructs
//! and passes in (e.g., an octocrab wrapper in the CLI, or a mock in tests).

use super::review::Review;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifies the pull request a gate run evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// The repository owner (user or organization).
    pub owner: String,
    /// The repository name.
    pub repo: String,
    /// The pull request number.
    pub number: u64,
}

impl PullRequestRef {
    /// Creates a new pull request reference.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Errors that can occur when interacting with the GitHub client.
#[derive(Debug, Error)]
pub enum GithubClientError {
    /// The requested resource does not exist (or is hidden from the token).
    #[error("not found: {0}")]
    NotFound(String),

    /// An API error occurred.
    #[error("GitHub API error: {0}")]
    ApiError(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Authentication failed.
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl GithubClientError {
    /// Returns true if this error means the resource is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GithubClientError::NotFound(_))
    }
}

/// Trait for GitHub API client implementations.
///
/// # Example
///
/// ```rust,ignore
/// use codeowners_gate_core::gate::{GithubClient, GithubClientError, Review};
///
/// struct MyGithubClient { /* ... */ }
///
/// #[async_trait::async_trait]
/// impl GithubClient for MyGithubClient {
///     async fn fetch_file_content(&self, owner: &str, repo: &str, path: &str)
///         -> Result<String, GithubClientError> {
///         Ok("* @octocat\n".to_string())
///     }
///
///     async fn list_reviews(&self, owner: &str, repo: &str, pull_number: u64)
///         -> Result<Vec<Review>, GithubClientError> {
///         Ok(Vec::new())
///     }
///
///     async fn list_team_members(&self, org: &str, team: &str)
///         -> Result<Vec<String>, GithubClientError> {
///         Ok(vec!["octocat".to_string()])
///     }
/// }
/// ```
#[async_trait]
pub trait GithubClient: Send + Sync {
    /// Retrieves and decodes a file from a repository's default branch.
    ///
    /// Returns `Err(GithubClientError::NotFound)` if the file does not exist.
    async fn fetch_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, GithubClientError>;

    /// Retrieves every submitted review on a pull request.
    async fn list_reviews(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<Vec<Review>, GithubClientError>;

    /// Retrieves the logins of a team's members.
    ///
    /// # Arguments
    ///
    /// * `org` - The organization name
    /// * `team` - The team slug
    async fn list_team_members(
        &self,
        org: &str,
        team: &str,
    ) -> Result<Vec<String>, GithubClientError>;
}
