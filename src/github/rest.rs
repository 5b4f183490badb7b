//! Raw shapes for the REST v3 boundary (snake_case, paginated endpoints).
//! Everything optional that upstream has ever omitted is `Option` here;
//! defaulting to canonical values happens in `convert`, not in serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestAccount {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub html_url: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    /// `"User"` or `"Organization"`.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestTeam {
    pub name: String,
    pub id: u64,
    #[serde(default)]
    pub html_url: String,
    pub avatar_url: Option<String>,
    pub slug: Option<String>,
}

/// Review comments from `GET /pulls/{n}/comments`. `state` only appears on
/// review-associated payloads; `"PENDING"` marks a draft.
#[derive(Debug, Clone, Deserialize)]
pub struct RestComment {
    pub id: u64,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub body_html: Option<String>,
    pub path: Option<String>,
    #[serde(default)]
    pub diff_hunk: String,
    pub position: Option<u64>,
    pub original_position: Option<u64>,
    #[serde(default)]
    pub commit_id: String,
    pub original_commit_id: Option<String>,
    pub user: Option<RestAccount>,
    pub created_at: DateTime<Utc>,
    pub in_reply_to_id: Option<u64>,
    pub pull_request_review_id: Option<u64>,
    pub state: Option<String>,
}

/// Labels arrive as objects on detail endpoints but have shipped as bare
/// strings in degenerate payloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RestLabel {
    Object { name: String, color: Option<String> },
    Name(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestRepo {
    #[serde(default)]
    pub clone_url: String,
    pub name: String,
    pub owner: Option<RestAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestRef {
    pub label: Option<String>,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    /// Null once the source repository has been deleted.
    pub repo: Option<RestRepo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestMilestone {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestPullRequest {
    pub number: u64,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub title: String,
    pub body: Option<String>,
    #[serde(default)]
    pub state: String,
    pub merged: Option<bool>,
    pub draft: Option<bool>,
    pub user: Option<RestAccount>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Absent on list endpoints, present (possibly null) on detail
    /// endpoints. The outer `Option` is presence, the inner is the value;
    /// only presence sets canonical mergeability at all.
    #[serde(default, deserialize_with = "double_option")]
    pub mergeable: Option<Option<bool>>,
    pub mergeable_state: Option<String>,
    pub head: Option<RestRef>,
    pub base: Option<RestRef>,
    #[serde(default)]
    pub labels: Vec<RestLabel>,
    pub milestone: Option<RestMilestone>,
    #[serde(default)]
    pub requested_reviewers: Vec<RestAccount>,
    #[serde(default)]
    pub requested_teams: Vec<RestTeam>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<bool>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(Some)
}
