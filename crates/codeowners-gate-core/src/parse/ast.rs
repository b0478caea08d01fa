//! Data structures for parsed ownership declarations.
//!
//! An ownership file is reduced to its rule lines; blank and comment lines
//! carry no ownership and are dropped during parsing.

use serde::Serialize;
use std::fmt::{self, Display};

/// A reference to a code owner as written in the ownership file.
///
/// Whether a token names a team or an individual is decided once, at parse
/// time. Downstream code matches on the variant and never re-inspects the
/// identifier text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OwnerRef {
    /// A single account (e.g., "@octocat"), stored without the leading '@'.
    Individual {
        /// The account identifier.
        name: String,
    },
    /// A team within an organization (e.g., "@github/core").
    Team {
        /// The organization name.
        org: String,
        /// The team slug within the organization.
        team: String,
    },
}

impl OwnerRef {
    /// Creates an individual owner reference.
    pub fn individual(name: impl Into<String>) -> Self {
        Self::Individual { name: name.into() }
    }

    /// Creates a team owner reference.
    pub fn team(org: impl Into<String>, team: impl Into<String>) -> Self {
        Self::Team {
            org: org.into(),
            team: team.into(),
        }
    }

    /// Returns true if this reference names a team.
    pub fn is_team(&self) -> bool {
        matches!(self, OwnerRef::Team { .. })
    }
}

impl Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerRef::Individual { name } => write!(f, "@{}", name),
            OwnerRef::Team { org, team } => write!(f, "@{}/{}", org, team),
        }
    }
}

/// A single rule: a path pattern and the owners declared for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipRule {
    /// The path pattern (first token of the line). Kept as metadata only.
    pub pattern: String,
    /// The declared owners, in file order.
    pub owners: Vec<OwnerRef>,
    /// The 1-based line number the rule was read from.
    pub line: usize,
}

impl OwnershipRule {
    /// Creates a new rule.
    pub fn new(pattern: impl Into<String>, owners: Vec<OwnerRef>, line: usize) -> Self {
        Self {
            pattern: pattern.into(),
            owners,
            line,
        }
    }
}

impl Display for OwnershipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)?;
        for owner in &self.owners {
            write!(f, " {}", owner)?;
        }
        Ok(())
    }
}

/// The parsed ownership file: its rules, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnershipFile {
    /// All rule lines, in order.
    pub rules: Vec<OwnershipRule>,
}

impl OwnershipFile {
    /// Creates a new ownership file from the given rules.
    pub fn new(rules: Vec<OwnershipRule>) -> Self {
        Self { rules }
    }

    /// Returns true if the file declares no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over every owner reference across all rules.
    pub fn owner_refs(&self) -> impl Iterator<Item = &OwnerRef> {
        self.rules.iter().flat_map(|rule| rule.owners.iter())
    }
}
