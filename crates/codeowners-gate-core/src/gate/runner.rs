//! End-to-end gate evaluation.
//!
//! [`evaluate`] is the pure-ish core: ownership text, reviews and a team
//! resolver in, [`Evaluation`] out. [`Gate`] wires it to a [`GithubClient`]
//! for a concrete pull request.

use super::config::GateConfig;
use super::error::GateError;
use super::github_client::{GithubClient, PullRequestRef};
use super::matcher::{Verdict, matched_owners};
use super::owners::{ClientTeamResolver, OwnerSet, OwnerSetBuilder, TeamResolver};
use super::review::{ApprovedSet, Review, extract_approvals};
use crate::parse::parse_ownership;
use log::{debug, info};
use serde::Serialize;
use std::fmt;

/// Everything a gate run found out, including the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Logins authorized to approve as code owners.
    pub owners: OwnerSet,
    /// Logins whose latest review is an approval.
    pub approved: ApprovedSet,
    /// Owners who currently approve, sorted.
    pub matched: Vec<String>,
    /// Teams that could not be resolved and contributed no owners.
    pub unresolved_teams: Vec<String>,
    /// The pass/fail outcome.
    pub verdict: Verdict,
}

impl Evaluation {
    /// Returns true if the gate passed.
    pub fn passed(&self) -> bool {
        self.verdict.passed
    }

    /// Logs the owner set, the approver set and the matched count.
    ///
    /// Operators rely on these three lines to audit a verdict without
    /// re-running the gate.
    pub fn log_diagnostics(&self) {
        info!("Code owners: {}", self.owners);
        info!("Approved reviewers: {}", self.approved);
        info!(
            "Matched code owner approvals: {} (required {})",
            self.verdict.matched_count, self.verdict.required_count
        );
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verdict)
    }
}

/// Evaluates ownership text against a pull request's reviews.
///
/// Team references are expanded through `resolver`. Fails only when a team
/// cannot be resolved and `config` asks to fail closed.
pub async fn evaluate(
    ownership_text: &str,
    reviews: &[Review],
    config: &GateConfig,
    resolver: &dyn TeamResolver,
) -> Result<Evaluation, GateError> {
    let file = parse_ownership(ownership_text);
    let resolution = OwnerSetBuilder::new(resolver)
        .with_policy(config.team_failure_policy)
        .build(&file)
        .await?;

    let approved = extract_approvals(reviews);
    let matched: Vec<String> = matched_owners(&resolution.owners, &approved)
        .into_iter()
        .map(str::to_string)
        .collect();
    let verdict = Verdict::new(matched.len(), config.required_approvals);

    let evaluation = Evaluation {
        owners: resolution.owners,
        approved,
        matched,
        unresolved_teams: resolution.unresolved_teams,
        verdict,
    };
    evaluation.log_diagnostics();
    Ok(evaluation)
}

/// Runs the gate for pull requests through a GitHub client.
pub struct Gate<'a> {
    client: &'a dyn GithubClient,
    config: GateConfig,
}

impl fmt::Debug for Gate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("client", &"<dyn GithubClient>")
            .field("config", &self.config)
            .finish()
    }
}

impl<'a> Gate<'a> {
    /// Creates a gate that queries `client` and applies `config`.
    pub fn new(client: &'a dyn GithubClient, config: GateConfig) -> Self {
        Self { client, config }
    }

    /// Returns the configuration this gate applies.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Fetches the ownership file and reviews for `pr` and evaluates them.
    pub async fn run(&self, pr: &PullRequestRef) -> Result<Evaluation, GateError> {
        let path = self.config.codeowners_path.trim();
        if path.is_empty() {
            return Err(GateError::configuration("ownership file path is empty"));
        }

        info!("Evaluating {} against {}", pr, path);

        let ownership_text = self
            .client
            .fetch_file_content(&pr.owner, &pr.repo, path)
            .await
            .map_err(|source| {
                if source.is_not_found() {
                    GateError::SourceFileNotFound {
                        path: path.to_string(),
                    }
                } else {
                    GateError::FileRetrieval {
                        path: path.to_string(),
                        source,
                    }
                }
            })?;
        debug!("Fetched ownership file ({} bytes)", ownership_text.len());

        let reviews = self
            .client
            .list_reviews(&pr.owner, &pr.repo, pr.number)
            .await
            .map_err(|source| GateError::ReviewListRetrieval {
                pull_request: pr.to_string(),
                source,
            })?;
        debug!("Fetched {} review(s)", reviews.len());

        let resolver = ClientTeamResolver::new(self.client);
        evaluate(&ownership_text, &reviews, &self.config, &resolver).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::config::TeamFailurePolicy;
    use crate::gate::error::TeamResolutionError;
    use crate::gate::github_client::GithubClientError;
    use crate::gate::owners::FnTeamResolver;
    use crate::gate::review::ReviewState;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn approval(login: &str, minute: u32) -> Review {
        Review::new(
            login,
            ReviewState::Approved,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap()),
        )
    }

    /// A resolver for which every team lookup fails.
    struct NoTeams;

    #[async_trait]
    impl TeamResolver for NoTeams {
        async fn resolve_team(
            &self,
            org: &str,
            team: &str,
        ) -> Result<Vec<String>, TeamResolutionError> {
            Err(TeamResolutionError::new(
                org,
                team,
                GithubClientError::NotFound("team".into()),
            ))
        }
    }

    fn required(count: u32) -> GateConfig {
        GateConfig::new().with_required_approvals(count)
    }

    #[tokio::test]
    async fn scenario_one_of_two_owners_approved() {
        let reviews = vec![approval("alice", 1)];
        let eval = evaluate("* @alice @bob", &reviews, &required(2), &NoTeams)
            .await
            .unwrap();
        assert_eq!(eval.verdict.matched_count, 1);
        assert!(!eval.passed());
    }

    #[tokio::test]
    async fn scenario_both_owners_approved() {
        let reviews = vec![approval("alice", 1), approval("bob", 2)];
        let eval = evaluate("* @alice @bob", &reviews, &required(2), &NoTeams)
            .await
            .unwrap();
        assert_eq!(eval.verdict.matched_count, 2);
        assert!(eval.passed());
        assert_eq!(eval.matched, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[tokio::test]
    async fn scenario_team_member_approval() {
        let resolver = FnTeamResolver::new(|org, team| {
            assert_eq!((org, team), ("org", "team-a"));
            Ok(vec!["carol".to_string(), "dave".to_string()])
        });
        let reviews = vec![approval("carol", 1)];
        let eval = evaluate("* @org/team-a", &reviews, &required(1), &resolver)
            .await
            .unwrap();
        assert!(eval.passed());
    }

    #[tokio::test]
    async fn scenario_empty_or_comment_only_file() {
        let reviews = vec![approval("alice", 1)];
        for text in ["", "# just a comment\n\n   # another\n"] {
            let eval = evaluate(text, &reviews, &required(1), &NoTeams)
                .await
                .unwrap();
            assert!(eval.owners.is_empty());
            assert!(!eval.passed());
        }
    }

    #[tokio::test]
    async fn scenario_team_failure_does_not_abort() {
        let reviews = vec![approval("eve", 1)];
        let eval = evaluate("* @org/team-a @eve", &reviews, &required(1), &NoTeams)
            .await
            .unwrap();
        assert_eq!(eval.verdict.matched_count, 1);
        assert!(eval.passed());
        assert_eq!(eval.unresolved_teams, vec!["@org/team-a".to_string()]);
    }

    #[tokio::test]
    async fn team_failure_fails_closed_when_configured() {
        let config = required(1).with_team_failure_policy(TeamFailurePolicy::Fail);
        let reviews = vec![approval("eve", 1)];
        let result = evaluate("* @org/team-a @eve", &reviews, &config, &NoTeams).await;
        assert!(matches!(result, Err(GateError::TeamResolution(_))));
    }

    #[tokio::test]
    async fn evaluation_is_deterministic() {
        let reviews = vec![approval("alice", 1), approval("zed", 2)];
        let first = evaluate("* @alice @bob\n", &reviews, &required(1), &NoTeams)
            .await
            .unwrap();
        let second = evaluate("* @alice @bob\n", &reviews, &required(1), &NoTeams)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    /// A mock GitHub client serving one repository.
    struct MockGithubClient {
        files: HashMap<String, String>,
        reviews: Option<Vec<Review>>,
        teams: HashMap<(String, String), Vec<String>>,
        fetch_call_count: AtomicUsize,
    }

    impl MockGithubClient {
        fn new() -> Self {
            Self {
                files: HashMap::new(),
                reviews: Some(Vec::new()),
                teams: HashMap::new(),
                fetch_call_count: AtomicUsize::new(0),
            }
        }

        fn with_file(mut self, path: &str, content: &str) -> Self {
            self.files.insert(path.to_string(), content.to_string());
            self
        }

        fn with_reviews(mut self, reviews: Vec<Review>) -> Self {
            self.reviews = Some(reviews);
            self
        }

        fn with_failing_reviews(mut self) -> Self {
            self.reviews = None;
            self
        }

        fn with_team(mut self, org: &str, team: &str, members: &[&str]) -> Self {
            self.teams.insert(
                (org.to_string(), team.to_string()),
                members.iter().map(|m| m.to_string()).collect(),
            );
            self
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
            self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| GithubClientError::NotFound(path.to_string()))
        }

        async fn list_reviews(
            &self,
            _owner: &str,
            _repo: &str,
            _pull_number: u64,
        ) -> Result<Vec<Review>, GithubClientError> {
            self.reviews
                .clone()
                .ok_or_else(|| GithubClientError::NetworkError("connection reset".into()))
        }

        async fn list_team_members(
            &self,
            org: &str,
            team: &str,
        ) -> Result<Vec<String>, GithubClientError> {
            self.teams
                .get(&(org.to_string(), team.to_string()))
                .cloned()
                .ok_or_else(|| GithubClientError::NotFound(format!("team {}/{}", org, team)))
        }
    }

    fn pr() -> PullRequestRef {
        PullRequestRef::new("octo", "widgets", 7)
    }

    #[tokio::test]
    async fn gate_run_passes_with_team_approvals() {
        let client = MockGithubClient::new()
            .with_file(".github/CODEOWNERS", "* @octo/core @solo\n")
            .with_team("octo", "core", &["ann", "ben"])
            .with_reviews(vec![approval("ann", 1), approval("solo", 2)]);

        let eval = Gate::new(&client, GateConfig::new()).run(&pr()).await.unwrap();
        assert!(eval.passed());
        assert_eq!(eval.matched, vec!["ann".to_string(), "solo".to_string()]);
    }

    #[tokio::test]
    async fn gate_run_reads_configured_path() {
        let client = MockGithubClient::new()
            .with_file("docs/CODEOWNERS", "* @ann\n")
            .with_reviews(vec![approval("ann", 1)]);
        let config = GateConfig::new()
            .with_codeowners_path("docs/CODEOWNERS")
            .with_required_approvals(1);

        let eval = Gate::new(&client, config).run(&pr()).await.unwrap();
        assert!(eval.passed());
    }

    #[tokio::test]
    async fn gate_run_missing_file_is_fatal() {
        let client = MockGithubClient::new();
        let result = Gate::new(&client, GateConfig::new()).run(&pr()).await;

        match result {
            Err(GateError::SourceFileNotFound { path }) => assert_eq!(path, ".github/CODEOWNERS"),
            other => panic!("Expected SourceFileNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn gate_run_review_failure_is_fatal() {
        let client = MockGithubClient::new()
            .with_file(".github/CODEOWNERS", "* @ann\n")
            .with_failing_reviews();
        let result = Gate::new(&client, GateConfig::new()).run(&pr()).await;

        match result {
            Err(GateError::ReviewListRetrieval { pull_request, .. }) => {
                assert_eq!(pull_request, "octo/widgets#7")
            }
            other => panic!("Expected ReviewListRetrieval, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn gate_run_rejects_empty_path_before_network() {
        let client = MockGithubClient::new();
        let config = GateConfig::new().with_codeowners_path("  ");
        let result = Gate::new(&client, config).run(&pr()).await;

        assert!(matches!(result, Err(GateError::Configuration(_))));
        assert_eq!(client.fetch_call_count.load(Ordering::SeqCst), 0);
    }
    /// Records log messages emitted on the current thread.
    struct CaptureLogger;

    thread_local! {
        static CAPTURED: std::cell::RefCell<Vec<String>> = const { std::cell::RefCell::new(Vec::new()) };
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if record.level() == log::Level::Info {
                CAPTURED.with(|lines| lines.borrow_mut().push(record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    /// Installs the capturing logger once and clears this thread's buffer.
    fn start_capture() {
        static INSTALL: std::sync::Once = std::sync::Once::new();
        INSTALL.call_once(|| {
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(log::LevelFilter::Trace);
        });
        CAPTURED.with(|lines| lines.borrow_mut().clear());
    }

    fn captured() -> Vec<String> {
        CAPTURED.with(|lines| lines.borrow().clone())
    }

    #[tokio::test]
    async fn diagnostics_logged_for_passing_verdict() {
        start_capture();
        let reviews = vec![approval("alice", 1), approval("mallory", 2)];
        let eval = evaluate("* @alice @bob", &reviews, &required(1), &NoTeams)
            .await
            .unwrap();
        assert!(eval.passed());

        let lines = captured();
        assert!(lines.contains(&"Code owners: [alice, bob]".to_string()), "{:?}", lines);
        assert!(lines.contains(&"Approved reviewers: [alice, mallory]".to_string()), "{:?}", lines);
        assert!(
            lines.contains(&"Matched code owner approvals: 1 (required 1)".to_string()),
            "{:?}",
            lines
        );
    }

    #[tokio::test]
    async fn diagnostics_logged_for_failing_verdict() {
        start_capture();
        let eval = evaluate("* @alice @bob", &[], &required(2), &NoTeams)
            .await
            .unwrap();
        assert!(!eval.passed());

        let lines = captured();
        assert!(lines.contains(&"Code owners: [alice, bob]".to_string()), "{:?}", lines);
        assert!(lines.contains(&"Approved reviewers: []".to_string()), "{:?}", lines);
        assert!(
            lines.contains(&"Matched code owner approvals: 0 (required 2)".to_string()),
            "{:?}",
            lines
        );
    }
}
