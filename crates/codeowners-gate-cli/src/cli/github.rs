//! GitHub client implementation using octocrab.
//!
//! This module provides the octocrab-based implementation of the GithubClient trait
//! for use in the CLI.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use chrono::{DateTime, Utc};
use codeowners_gate_core::gate::{GithubClient, GithubClientError, Review, ReviewState};
use http::StatusCode;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters escaped within one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Page size used for list endpoints (the GitHub maximum).
const PER_PAGE: usize = 100;

/// A wrapper around `octocrab::Octocrab` that implements `GithubClient`.
///
/// This wrapper is necessary due to Rust's orphan rules, which prevent
/// implementing external traits on external types.
pub struct OctocrabClient(pub octocrab::Octocrab);

impl OctocrabClient {
    /// Creates a new OctocrabClient from an Octocrab instance.
    pub fn new(client: octocrab::Octocrab) -> Self {
        Self(client)
    }

    /// Fetches every page of a list endpoint.
    async fn get_all<T>(&self, route: &str) -> Result<Vec<T>, GithubClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<T> = self
                .0
                .get(route, Some(&params))
                .await
                .map_err(|e| map_error(e, route))?;
            let last = batch.len() < PER_PAGE;
            items.extend(batch);
            if last {
                return Ok(items);
            }
            page += 1;
        }
    }
}

impl std::ops::Deref for OctocrabClient {
    type Target = octocrab::Octocrab;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

#[derive(Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Deserialize)]
struct RawReview {
    user: Option<RawUser>,
    state: ReviewState,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct RawContent {
    content: Option<String>,
    encoding: Option<String>,
}

/// Extracts the HTTP status code from an octocrab error.
fn extract_status_code(error: &octocrab::Error) -> Option<StatusCode> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

/// Returns true if GitHub rejected the request for exceeding its rate limit.
fn is_rate_limited(error: &octocrab::Error) -> bool {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            source.message.to_lowercase().contains("rate limit")
        }
        _ => false,
    }
}

/// Maps an octocrab error for `resource` onto the client error taxonomy.
fn map_error(error: octocrab::Error, resource: &str) -> GithubClientError {
    match extract_status_code(&error) {
        Some(StatusCode::NOT_FOUND) => GithubClientError::NotFound(resource.to_string()),
        Some(StatusCode::TOO_MANY_REQUESTS) => GithubClientError::RateLimitExceeded,
        Some(StatusCode::FORBIDDEN) if is_rate_limited(&error) => {
            GithubClientError::RateLimitExceeded
        }
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            GithubClientError::AuthError(error.to_string())
        }
        Some(_) => GithubClientError::ApiError(error.to_string()),
        None => match error {
            octocrab::Error::Hyper { .. } | octocrab::Error::Service { .. } => {
                GithubClientError::NetworkError(error.to_string())
            }
            other => GithubClientError::Other(other.to_string()),
        },
    }
}

/// Percent-encodes each segment of a repository path, keeping the separators.
fn encode_repo_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decodes a contents-API payload into text.
fn decode_content(path: &str, raw: RawContent) -> Result<String, GithubClientError> {
    match (raw.encoding.as_deref(), raw.content) {
        (Some("base64"), Some(content)) => {
            let bytes = general_purpose::STANDARD
                .decode(content.replace('\n', ""))
                .map_err(|e| GithubClientError::Other(format!("{}: invalid base64: {}", path, e)))?;
            String::from_utf8(bytes)
                .map_err(|e| GithubClientError::Other(format!("{}: not UTF-8: {}", path, e)))
        }
        (None | Some("utf-8"), Some(content)) => Ok(content),
        (encoding, _) => Err(GithubClientError::Other(format!(
            "{}: unsupported content encoding {:?}",
            path, encoding
        ))),
    }
}

#[async_trait]
impl GithubClient for OctocrabClient {
    async fn fetch_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, GithubClientError> {
        let route = format!(
            "/repos/{}/{}/contents/{}",
            owner,
            repo,
            encode_repo_path(path)
        );
        let raw: RawContent = self
            .0
            .get(&route, None::<&()>)
            .await
            .map_err(|e| map_error(e, path))?;
        decode_content(path, raw)
    }

    async fn list_reviews(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<Vec<Review>, GithubClientError> {
        let route = format!("/repos/{}/{}/pulls/{}/reviews", owner, repo, pull_number);
        let raw: Vec<RawReview> = self.get_all(&route).await?;

        // Reviews by deleted accounts have no user and cannot match an owner.
        Ok(raw
            .into_iter()
            .filter_map(|review| {
                review
                    .user
                    .map(|user| Review::new(user.login, review.state, review.submitted_at))
            })
            .collect())
    }

    async fn list_team_members(
        &self,
        org: &str,
        team: &str,
    ) -> Result<Vec<String>, GithubClientError> {
        let route = format!("/orgs/{}/teams/{}/members", org, team);
        let members: Vec<RawUser> = self.get_all(&route).await?;
        Ok(members.into_iter().map(|user| user.login).collect())
    }
}
