//! Pull request reviews and approval extraction.
//!
//! Review state is not monotonic: a reviewer who approved and later
//! requested changes (or had the approval dismissed) no longer approves.
//! Only the latest review per reviewer counts.

use chrono::{DateTime, Utc};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// The state a submitted review leaves the pull request in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// The reviewer approved the change.
    Approved,
    /// The reviewer requested changes.
    ChangesRequested,
    /// The reviewer only commented.
    Commented,
    /// A previous review was dismissed.
    Dismissed,
    /// The review has not been submitted yet.
    Pending,
    /// A state this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewState::Approved => write!(f, "APPROVED"),
            ReviewState::ChangesRequested => write!(f, "CHANGES_REQUESTED"),
            ReviewState::Commented => write!(f, "COMMENTED"),
            ReviewState::Dismissed => write!(f, "DISMISSED"),
            ReviewState::Pending => write!(f, "PENDING"),
            ReviewState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A single review on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// The reviewer's login.
    pub reviewer: String,
    /// The state of this review.
    pub state: ReviewState,
    /// When the review was submitted; `None` for unsubmitted reviews.
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Creates a new review.
    pub fn new(
        reviewer: impl Into<String>,
        state: ReviewState,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            reviewer: reviewer.into(),
            state,
            submitted_at,
        }
    }
}

/// Logins whose latest review is an approval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApprovedSet(BTreeSet<String>);

impl ApprovedSet {
    /// Returns true if `login` currently approves.
    pub fn contains(&self, login: &str) -> bool {
        self.0.contains(login)
    }

    /// Returns the number of approving reviewers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nobody currently approves.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over approving logins in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ApprovedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ApprovedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().cloned().collect::<Vec<_>>().join(", "))
    }
}

/// Reduces a pull request's reviews to the set of current approvers.
///
/// For each reviewer the review with the latest `submitted_at` wins; among
/// equal timestamps the one appearing later in `reviews` wins. Unsubmitted
/// reviews (no timestamp) never supersede submitted ones.
pub fn extract_approvals(reviews: &[Review]) -> ApprovedSet {
    let mut latest: HashMap<&str, &Review> = HashMap::new();

    for review in reviews {
        match latest.entry(review.reviewer.as_str()) {
            Entry::Vacant(entry) => {
                entry.insert(review);
            }
            Entry::Occupied(mut entry) => {
                if review.submitted_at >= entry.get().submitted_at {
                    trace!(
                        "Review by {} ({}) supersedes earlier {}",
                        review.reviewer,
                        review.state,
                        entry.get().state
                    );
                    entry.insert(review);
                }
            }
        }
    }

    latest
        .into_iter()
        .filter(|(_, review)| review.state == ReviewState::Approved)
        .map(|(login, _)| login)
        .collect()
}
