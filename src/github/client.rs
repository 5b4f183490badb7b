//! Raw-page producer: fetches the REST detail payload and one GraphQL
//! timeline page for a pull request. Everything returned here is still in
//! raw upstream shape; normalization happens downstream and never depends
//! on this module.

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::rest::RestPullRequest;
use crate::avatar::EmailResolver;

static PR_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"github\.com/([^/]+)/([^/]+)/pull/(\d+)").unwrap());

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("GitHub API request failed: {0}")]
    Api(#[from] octocrab::Error),
    #[error("unexpected response shape: missing {0}")]
    Shape(&'static str),
}

#[derive(Debug, Clone)]
pub struct ParsedPrUrl {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// One fetched GraphQL timeline page plus the viewer context the
/// reconciliation passes need.
#[derive(Debug, Clone)]
pub struct TimelinePage {
    pub events: Vec<Value>,
    pub viewer_login: Option<String>,
    pub viewer_latest_review_commit: Option<String>,
}

const TIMELINE_QUERY: &str = r#"
query Timeline($owner: String!, $name: String!, $number: Int!) {
  viewer { login }
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) {
      viewerLatestReview { commit { oid } }
      timelineItems(first: 250) {
        nodes {
          __typename
          ... on PullRequestCommit {
            commit {
              oid
              message
              committedDate
              url
              author { name email date user { login url avatarUrl } }
            }
          }
          ... on LabeledEvent {
            createdAt
            label { name color }
            actor { login url avatarUrl }
          }
          ... on MilestonedEvent {
            createdAt
            milestoneTitle
            actor { login url avatarUrl }
          }
          ... on AssignedEvent {
            createdAt
            actor { login url avatarUrl }
            assignee { ... on User { login url avatarUrl } }
          }
          ... on HeadRefDeletedEvent {
            createdAt
            headRefName
            actor { login url avatarUrl }
          }
          ... on IssueComment {
            databaseId
            id
            url
            body
            bodyHTML
            createdAt
            author { login url avatarUrl }
            reactionGroups { content viewerHasReacted reactors { totalCount } }
          }
          ... on PullRequestReview {
            databaseId
            id
            body
            bodyHTML
            state
            submittedAt
            author { login url avatarUrl }
            comments(first: 100) {
              nodes {
                databaseId
                id
                url
                body
                bodyHTML
                path
                diffHunk
                position
                originalPosition
                state
                createdAt
                commit { oid }
                originalCommit { oid }
                author { login url avatarUrl }
                replyTo { databaseId }
              }
            }
          }
          ... on MergedEvent {
            id
            createdAt
            mergeRefName
            url
            commit { oid }
            actor { login url avatarUrl }
          }
        }
      }
    }
  }
}
"#;

/// Bare host names from config become https URIs; full URIs pass through
/// (GitHub Enterprise hosts may sit behind either scheme).
fn api_base_uri(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    pub fn new(token: Option<String>, host: &str) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .base_uri(api_base_uri(host))
            .context("Failed to set API base uri")?;
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        let client = builder
            .build()
            .context("Failed to build Octocrab client")?;
        Ok(Self { client })
    }

    fn octocrab(&self) -> Octocrab {
        self.client.clone()
    }

    pub fn parse_pr_url(url: &str) -> Result<ParsedPrUrl> {
        // Bare PR number, with owner/repo supplied out of band.
        if let Ok(number) = url.parse::<u64>() {
            let owner = std::env::var("GITHUB_OWNER").unwrap_or_else(|_| "owner".to_string());
            let repo = std::env::var("GITHUB_REPO").unwrap_or_else(|_| "repo".to_string());
            return Ok(ParsedPrUrl {
                owner,
                repo,
                number,
            });
        }

        let caps = PR_URL_RE
            .captures(url)
            .context("Invalid GitHub PR URL format")?;

        Ok(ParsedPrUrl {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            number: caps[3].parse()?,
        })
    }

    /// REST detail payload; unlike the list endpoints this one carries
    /// `mergeable`.
    pub async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<RestPullRequest, ClientError> {
        let route = format!("/repos/{owner}/{repo}/pulls/{number}");
        let raw = self.octocrab().get(route, None::<&()>).await?;
        Ok(raw)
    }

    /// One GraphQL timeline page as raw event values, in upstream order.
    pub async fn fetch_timeline(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<TimelinePage, ClientError> {
        let payload = serde_json::json!({
            "query": TIMELINE_QUERY,
            "variables": {
                "owner": owner,
                "name": repo,
                "number": number,
            }
        });
        let response: Value = self.octocrab().graphql(&payload).await?;

        let pull_request = response
            .pointer("/data/repository/pullRequest")
            .ok_or(ClientError::Shape("data.repository.pullRequest"))?;

        let events = pull_request
            .pointer("/timelineItems/nodes")
            .and_then(Value::as_array)
            .cloned()
            .ok_or(ClientError::Shape("timelineItems.nodes"))?;

        let viewer_login = response
            .pointer("/data/viewer/login")
            .and_then(Value::as_str)
            .map(str::to_string);

        let viewer_latest_review_commit = pull_request
            .pointer("/viewerLatestReview/commit/oid")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(TimelinePage {
            events,
            viewer_login,
            viewer_latest_review_commit,
        })
    }
}

/// Email backfill source: the user's public profile email. Users who hide
/// their email resolve to `None`, which the backfill pass treats the same
/// as a failed lookup.
#[async_trait]
impl EmailResolver for GitHubClient {
    async fn resolve(&self, login: &str) -> Option<String> {
        let route = format!("/users/{login}");
        let user: Value = self.octocrab().get(route, None::<&()>).await.ok()?;
        user.get("email")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pr_url() {
        let parsed = GitHubClient::parse_pr_url("https://github.com/rust-lang/rust/pull/12345")
            .expect("full URL should parse");
        assert_eq!(parsed.owner, "rust-lang");
        assert_eq!(parsed.repo, "rust");
        assert_eq!(parsed.number, 12345);
    }

    #[test]
    fn test_invalid_pr_url() {
        assert!(GitHubClient::parse_pr_url("not-a-valid-url").is_err());
    }

    #[test]
    fn test_api_base_uri_from_config_host() {
        assert_eq!(api_base_uri("api.github.com"), "https://api.github.com");
        assert_eq!(
            api_base_uri("github.example.com"),
            "https://github.example.com"
        );
        assert_eq!(
            api_base_uri("https://github.example.com/api/v3"),
            "https://github.example.com/api/v3"
        );
        assert_eq!(api_base_uri("http://localhost:8080"), "http://localhost:8080");
    }
}
