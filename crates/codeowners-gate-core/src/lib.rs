//! Code-owner approval gate core
//!
//! Decides whether a pull request has enough approvals from its code owners.
//!
//! # Features
//!
//! - **Parser**: Total parser for CODEOWNERS files; malformed lines degrade
//!   instead of failing
//! - **Team expansion**: `@org/team` owners are expanded to their members,
//!   concurrently, with an explicit failure policy
//! - **Approval tracking**: Only each reviewer's latest review counts
//! - **Verdict**: Matched owner approvals compared against a threshold
//!
//! # Quick Start
//!
//! ```rust
//! use codeowners_gate_core::gate::{
//!     FnTeamResolver, GateConfig, OwnerSetBuilder, Review, ReviewState, extract_approvals,
//!     match_approvals,
//! };
//! use codeowners_gate_core::parse::parse_ownership;
//!
//! # tokio_test::block_on(async {
//! let file = parse_ownership("* @alice @bob\n/docs/ @org/writers\n");
//! let resolver = FnTeamResolver::new(|_org, _team| Ok(vec!["dora".to_string()]));
//! let owners = OwnerSetBuilder::new(&resolver).build(&file).await.unwrap().owners;
//!
//! let reviews = vec![
//!     Review::new("alice", ReviewState::Approved, None),
//!     Review::new("dora", ReviewState::Approved, None),
//! ];
//! let approved = extract_approvals(&reviews);
//!
//! let verdict = match_approvals(&owners, &approved, GateConfig::new().required_approvals);
//! assert!(verdict.passed);
//! # });
//! ```
//!
//! # Modules
//!
//! - [`parse`]: Parser for CODEOWNERS files
//! - [`gate`]: Owner resolution, approval extraction and the verdict

pub mod gate;
pub mod parse;

// Re-export commonly used types at the crate root
pub use gate::{Evaluation, Gate, GateConfig, GateError, GithubClient, Verdict, evaluate};
pub use parse::{OwnerRef, OwnershipFile, OwnershipRule, parse_ownership};
