//! The code-owner approval gate.
//!
//! Resolves who may approve (individual owners plus expanded team members),
//! who currently approves (latest review per reviewer), and whether enough
//! owners approve to pass.
//!
//! # Example
//!
//! ```rust
//! use codeowners_gate_core::gate::{evaluate, FnTeamResolver, GateConfig, Review, ReviewState};
//!
//! # tokio_test::block_on(async {
//! let resolver = FnTeamResolver::new(|_org, _team| Ok(vec!["carol".to_string()]));
//! let reviews = vec![Review::new("carol", ReviewState::Approved, None)];
//! let config = GateConfig::new().with_required_approvals(1);
//!
//! let evaluation = evaluate("* @org/team-a", &reviews, &config, &resolver)
//!     .await
//!     .unwrap();
//! assert!(evaluation.passed());
//! # });
//! ```

mod config;
mod error;
pub mod github_client;
mod matcher;
mod owners;
mod review;
mod runner;

// Re-export public types
pub use config::{
    DEFAULT_CODEOWNERS_PATH, DEFAULT_REQUIRED_APPROVALS, GateConfig, TeamFailurePolicy,
};
pub use error::{GateError, TeamResolutionError};
pub use github_client::{GithubClient, GithubClientError, PullRequestRef};
pub use matcher::{Verdict, match_approvals, matched_owners};
pub use owners::{
    ClientTeamResolver, FnTeamResolver, OwnerResolution, OwnerSet, OwnerSetBuilder, TeamResolver,
};
pub use review::{ApprovedSet, Review, ReviewState, extract_approvals};
pub use runner::{Evaluation, Gate, evaluate};
