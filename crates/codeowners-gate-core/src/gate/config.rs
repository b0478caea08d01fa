//! Configuration for gate runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default location of the ownership file within a repository.
pub const DEFAULT_CODEOWNERS_PATH: &str = ".github/CODEOWNERS";

/// Default number of matched code-owner approvals required to pass.
pub const DEFAULT_REQUIRED_APPROVALS: u32 = 2;

/// What to do when a team's membership cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamFailurePolicy {
    /// Log a warning and treat the team as having no members.
    ///
    /// The run still produces a verdict, against a weaker owner set.
    #[default]
    Continue,
    /// Abort the run without a verdict.
    Fail,
}

impl fmt::Display for TeamFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamFailurePolicy::Continue => write!(f, "continue"),
            TeamFailurePolicy::Fail => write!(f, "fail"),
        }
    }
}

/// Configuration options for a gate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Path of the ownership file inside the repository.
    pub codeowners_path: String,
    /// Minimum number of code owners whose latest review is an approval.
    pub required_approvals: u32,
    /// Handling of team resolution failures.
    pub team_failure_policy: TeamFailurePolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            codeowners_path: DEFAULT_CODEOWNERS_PATH.to_string(),
            required_approvals: DEFAULT_REQUIRED_APPROVALS,
            team_failure_policy: TeamFailurePolicy::default(),
        }
    }
}

impl GateConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ownership file path.
    pub fn with_codeowners_path(mut self, path: impl Into<String>) -> Self {
        self.codeowners_path = path.into();
        self
    }

    /// Sets the required number of approvals.
    pub fn with_required_approvals(mut self, count: u32) -> Self {
        self.required_approvals = count;
        self
    }

    /// Sets the team failure policy.
    pub fn with_team_failure_policy(mut self, policy: TeamFailurePolicy) -> Self {
        self.team_failure_policy = policy;
        self
    }
}
