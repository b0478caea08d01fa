//! Parser module for ownership declaration (CODEOWNERS) files.
//!
//! Turns raw file content into an ordered list of rules, each mapping a path
//! pattern to its owner references.
//!
//! # Example
//!
//! ```rust
//! use codeowners_gate_core::parse::{parse_ownership, OwnerRef};
//!
//! let input = "# CODEOWNERS file\n*.rs @rustacean\n/docs/ @github/docs-team\n";
//!
//! let file = parse_ownership(input);
//! assert_eq!(file.rules.len(), 2);
//! assert_eq!(file.rules[1].owners, vec![OwnerRef::team("github", "docs-team")]);
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::{OwnerRef, OwnershipFile, OwnershipRule};
pub use parser::parse_ownership;

// Re-export lexer utilities that may be useful for custom parsing
pub use lexer::{OwnerKind, classify_owner};
