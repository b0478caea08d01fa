//! Approval matching: owners who currently approve, against a threshold.

use super::owners::OwnerSet;
use super::review::ApprovedSet;
use serde::Serialize;
use std::fmt;

/// The outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Number of code owners whose latest review is an approval.
    pub matched_count: usize,
    /// Number of such approvals required to pass.
    pub required_count: u32,
    /// `matched_count >= required_count`.
    pub passed: bool,
}

impl Verdict {
    /// Creates a verdict, deriving `passed` from the counts.
    pub fn new(matched_count: usize, required_count: u32) -> Self {
        Self {
            matched_count,
            required_count,
            passed: matched_count >= required_count as usize,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} of {} required code owner approvals)",
            if self.passed { "passed" } else { "failed" },
            self.matched_count,
            self.required_count
        )
    }
}

/// Returns the owners who currently approve, in sorted order.
pub fn matched_owners<'a>(owners: &'a OwnerSet, approved: &ApprovedSet) -> Vec<&'a str> {
    owners.iter().filter(|login| approved.contains(login)).collect()
}

/// Counts owners who currently approve and compares against `required`.
pub fn match_approvals(owners: &OwnerSet, approved: &ApprovedSet, required: u32) -> Verdict {
    Verdict::new(matched_owners(owners, approved).len(), required)
}
