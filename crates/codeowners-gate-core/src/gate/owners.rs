//! Owner set construction.
//!
//! Flattens the owner references of every rule into one set of individual
//! logins, expanding each team into its members. Rule patterns are not
//! consulted: every rule's owners are eligible approvers for the whole pull
//! request.

use super::config::TeamFailurePolicy;
use super::error::{GateError, TeamResolutionError};
use super::github_client::GithubClient;
use crate::parse::{OwnerRef, OwnershipFile};
use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, trace, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Expands a team reference into its members' logins.
#[async_trait]
pub trait TeamResolver: Send + Sync {
    /// Returns the logins of the members of `@org/team`.
    async fn resolve_team(&self, org: &str, team: &str)
    -> Result<Vec<String>, TeamResolutionError>;
}

/// Resolves teams through a [`GithubClient`].
pub struct ClientTeamResolver<'a> {
    client: &'a dyn GithubClient,
}

impl<'a> ClientTeamResolver<'a> {
    /// Creates a resolver backed by the given client.
    pub fn new(client: &'a dyn GithubClient) -> Self {
        Self { client }
    }
}

impl fmt::Debug for ClientTeamResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientTeamResolver")
            .field("client", &"<dyn GithubClient>")
            .finish()
    }
}

#[async_trait]
impl TeamResolver for ClientTeamResolver<'_> {
    async fn resolve_team(
        &self,
        org: &str,
        team: &str,
    ) -> Result<Vec<String>, TeamResolutionError> {
        self.client
            .list_team_members(org, team)
            .await
            .map_err(|e| TeamResolutionError::new(org, team, e))
    }
}

/// Resolves teams with a plain function, e.g. a fixed lookup table.
pub struct FnTeamResolver<F>(F);

impl<F> FnTeamResolver<F>
where
    F: Fn(&str, &str) -> Result<Vec<String>, TeamResolutionError> + Send + Sync,
{
    /// Wraps `resolve` as a [`TeamResolver`].
    pub fn new(resolve: F) -> Self {
        Self(resolve)
    }
}

#[async_trait]
impl<F> TeamResolver for FnTeamResolver<F>
where
    F: Fn(&str, &str) -> Result<Vec<String>, TeamResolutionError> + Send + Sync,
{
    async fn resolve_team(
        &self,
        org: &str,
        team: &str,
    ) -> Result<Vec<String>, TeamResolutionError> {
        (self.0)(org, team)
    }
}

/// The deduplicated logins authorized to approve as code owners.
///
/// Built once per run by [`OwnerSetBuilder`] and not modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OwnerSet(BTreeSet<String>);

impl OwnerSet {
    /// Returns true if `login` is a code owner.
    pub fn contains(&self, login: &str) -> bool {
        self.0.contains(login)
    }

    /// Returns the number of owners.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no owners.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over owner logins in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for OwnerSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for OwnerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().cloned().collect::<Vec<_>>().join(", "))
    }
}

/// The result of building an owner set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnerResolution {
    /// The resolved owners.
    pub owners: OwnerSet,
    /// Teams (`@org/team`) that could not be resolved and contributed nobody.
    pub unresolved_teams: Vec<String>,
}

/// Builds an [`OwnerSet`] from parsed rules.
pub struct OwnerSetBuilder<'a> {
    resolver: &'a dyn TeamResolver,
    policy: TeamFailurePolicy,
}

impl<'a> OwnerSetBuilder<'a> {
    /// Creates a builder that resolves teams with `resolver`.
    pub fn new(resolver: &'a dyn TeamResolver) -> Self {
        Self {
            resolver,
            policy: TeamFailurePolicy::default(),
        }
    }

    /// Sets what happens when a team cannot be resolved.
    pub fn with_policy(mut self, policy: TeamFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves every owner reference in `file` into one set of logins.
    ///
    /// Each distinct team is resolved once, concurrently with the others.
    /// Under [`TeamFailurePolicy::Continue`] a failing team is logged and
    /// contributes no members; under [`TeamFailurePolicy::Fail`] it aborts
    /// the build.
    pub async fn build(&self, file: &OwnershipFile) -> Result<OwnerResolution, GateError> {
        let mut owners = BTreeSet::new();
        let mut teams = BTreeSet::new();

        for owner in file.owner_refs() {
            match owner {
                OwnerRef::Individual { name } => {
                    trace!("Owner @{}", name);
                    owners.insert(name.clone());
                }
                OwnerRef::Team { org, team } => {
                    teams.insert((org.as_str(), team.as_str()));
                }
            }
        }

        debug!(
            "Resolving {} distinct team(s) for {} individual owner(s)",
            teams.len(),
            owners.len()
        );

        let results = join_all(teams.iter().map(|&(org, team)| async move {
            (org, team, self.resolver.resolve_team(org, team).await)
        }))
        .await;

        let mut unresolved_teams = Vec::new();
        for (org, team, result) in results {
            match result {
                Ok(members) => {
                    debug!("Team @{}/{} has {} member(s)", org, team, members.len());
                    owners.extend(members);
                }
                Err(e) => match self.policy {
                    TeamFailurePolicy::Fail => return Err(e.into()),
                    TeamFailurePolicy::Continue => {
                        warn!("{}; continuing without its members", e);
                        unresolved_teams.push(e.team_ref());
                    }
                },
            }
        }

        Ok(OwnerResolution {
            owners: OwnerSet(owners),
            unresolved_teams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::github_client::GithubClientError;
    use crate::gate::review::Review;
    use crate::parse::parse_ownership;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A mock GitHub client that only knows team memberships.
    struct MockGithubClient {
        teams: HashMap<(String, String), Vec<String>>,
        team_call_count: AtomicUsize,
    }

    impl MockGithubClient {
        fn new() -> Self {
            Self {
                teams: HashMap::new(),
                team_call_count: AtomicUsize::new(0),
            }
        }

        fn with_team(mut self, org: &str, team: &str, members: &[&str]) -> Self {
            self.teams.insert(
                (org.to_string(), team.to_string()),
                members.iter().map(|m| m.to_string()).collect(),
            );
            self
        }

        fn team_calls(&self) -> usize {
            self.team_call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GithubClient for MockGithubClient {
        async fn fetch_file_content(
            &self,
            _owner: &str,
            _repo: &str,
            path: &str,
        ) -> Result<String, GithubClientError> {
            Err(GithubClientError::NotFound(path.to_string()))
        }

        async fn list_reviews(
            &self,
            _owner: &str,
            _repo: &str,
            _pull_number: u64,
        ) -> Result<Vec<Review>, GithubClientError> {
            Ok(Vec::new())
        }

        async fn list_team_members(
            &self,
            org: &str,
            team: &str,
        ) -> Result<Vec<String>, GithubClientError> {
            self.team_call_count.fetch_add(1, Ordering::SeqCst);
            self.teams
                .get(&(org.to_string(), team.to_string()))
                .cloned()
                .ok_or_else(|| GithubClientError::NotFound(format!("team {}/{}", org, team)))
        }
    }

    fn logins(set: &OwnerSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[tokio::test]
    async fn individuals_across_rules_are_deduplicated() {
        let client = MockGithubClient::new();
        let resolver = ClientTeamResolver::new(&client);
        let file = parse_ownership("*.rs @alice @bob\n*.md @bob\n/docs/ carol\n");

        let resolution = OwnerSetBuilder::new(&resolver).build(&file).await.unwrap();
        assert_eq!(logins(&resolution.owners), vec!["alice", "bob", "carol"]);
        assert!(resolution.unresolved_teams.is_empty());
    }

    #[tokio::test]
    async fn teams_expand_to_members() {
        let client = MockGithubClient::new().with_team("org", "team-a", &["carol", "dave"]);
        let resolver = ClientTeamResolver::new(&client);
        let file = parse_ownership("* @org/team-a @erin\n");

        let resolution = OwnerSetBuilder::new(&resolver).build(&file).await.unwrap();
        assert_eq!(logins(&resolution.owners), vec!["carol", "dave", "erin"]);
    }

    #[tokio::test]
    async fn duplicate_teams_resolved_once() {
        let client = MockGithubClient::new().with_team("org", "core", &["x"]);
        let resolver = ClientTeamResolver::new(&client);
        let file = parse_ownership("*.rs @org/core\n*.md @org/core\n");

        OwnerSetBuilder::new(&resolver).build(&file).await.unwrap();
        assert_eq!(client.team_calls(), 1);
    }

    #[tokio::test]
    async fn failed_team_contributes_nobody_by_default() {
        let client = MockGithubClient::new();
        let resolver = ClientTeamResolver::new(&client);
        let file = parse_ownership("* @org/team-a @eve\n");

        let resolution = OwnerSetBuilder::new(&resolver).build(&file).await.unwrap();
        assert_eq!(logins(&resolution.owners), vec!["eve"]);
        assert_eq!(resolution.unresolved_teams, vec!["@org/team-a".to_string()]);
    }

    #[tokio::test]
    async fn failed_team_aborts_when_failing_closed() {
        let client = MockGithubClient::new();
        let resolver = ClientTeamResolver::new(&client);
        let file = parse_ownership("* @org/team-a @eve\n");

        let result = OwnerSetBuilder::new(&resolver)
            .with_policy(TeamFailurePolicy::Fail)
            .build(&file)
            .await;

        match result {
            Err(GateError::TeamResolution(e)) => assert_eq!(e.team_ref(), "@org/team-a"),
            other => panic!("Expected TeamResolution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn expansion_is_order_independent() {
        let resolver = FnTeamResolver::new(|_org, team| {
            Ok(match team {
                "a" => vec!["p".to_string(), "q".to_string()],
                _ => vec!["q".to_string(), "r".to_string()],
            })
        });

        let forward = parse_ownership("* @o/a @o/b\n");
        let reverse = parse_ownership("* @o/b\n* @o/a @o/b\n");

        let first = OwnerSetBuilder::new(&resolver).build(&forward).await.unwrap();
        let second = OwnerSetBuilder::new(&resolver).build(&reverse).await.unwrap();
        assert_eq!(first.owners, second.owners);
        assert_eq!(logins(&first.owners), vec!["p", "q", "r"]);
    }

    #[tokio::test]
    async fn empty_file_yields_empty_set() {
        let resolver = FnTeamResolver::new(|_, _| Ok(Vec::new()));
        let file = parse_ownership("# nothing here\n\n");

        let resolution = OwnerSetBuilder::new(&resolver).build(&file).await.unwrap();
        assert!(resolution.owners.is_empty());
    }

    #[test]
    fn owner_set_display() {
        let set: OwnerSet = ["bob", "alice"].into_iter().collect();
        assert_eq!(set.to_string(), "[alice, bob]");
        assert_eq!(set.len(), 2);
    }
}
