//! Raw shapes for the GraphQL v4 boundary: camelCase fields,
//! `databaseId`/`id` dual identifiers, `__typename` discriminators and
//! edge/node wrappers around nested lists.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphAccount {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub url: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphTeam {
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    pub avatar_url: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphCount {
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReactionGroup {
    pub content: String,
    #[serde(default)]
    pub viewer_has_reacted: bool,
    #[serde(default)]
    pub reactors: Option<GraphCount>,
}

/// Generic node wrapper for nested paginated lists.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConnection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for GraphConnection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphOid {
    #[serde(default)]
    pub oid: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphCommitAuthor {
    pub user: Option<GraphAccount>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphCommit {
    #[serde(default)]
    pub oid: String,
    #[serde(default)]
    pub message: String,
    pub author: Option<GraphCommitAuthor>,
    pub committed_date: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

/// `PullRequestCommit` timeline node; the commit itself may also arrive
/// unwrapped as a bare `Commit`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphCommitEvent {
    pub commit: GraphCommit,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLabel {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLabeledEvent {
    pub label: GraphLabel,
    pub actor: Option<GraphAccount>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMilestonedEvent {
    #[serde(default)]
    pub milestone_title: String,
    pub actor: Option<GraphAccount>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphAssignedEvent {
    pub assignee: Option<GraphAccount>,
    pub actor: Option<GraphAccount>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphHeadRefDeletedEvent {
    pub actor: Option<GraphAccount>,
    pub created_at: Option<DateTime<Utc>>,
    pub head_ref_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphIssueComment {
    pub database_id: Option<u64>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "bodyHTML", default)]
    pub body_html: String,
    pub author: Option<GraphAccount>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reaction_groups: Vec<GraphReactionGroup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReplyTo {
    pub database_id: Option<u64>,
}

/// Inline review comment node, nested under a `PullRequestReview`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReviewComment {
    pub database_id: Option<u64>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "bodyHTML", default)]
    pub body_html: String,
    pub path: Option<String>,
    #[serde(default)]
    pub diff_hunk: String,
    pub position: Option<u64>,
    pub original_position: Option<u64>,
    pub commit: Option<GraphOid>,
    pub original_commit: Option<GraphOid>,
    pub author: Option<GraphAccount>,
    pub created_at: Option<DateTime<Utc>>,
    pub state: Option<String>,
    pub reply_to: Option<GraphReplyTo>,
    #[serde(default)]
    pub reaction_groups: Vec<GraphReactionGroup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReview {
    pub database_id: Option<u64>,
    #[serde(default)]
    pub id: String,
    pub author: Option<GraphAccount>,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "bodyHTML", default)]
    pub body_html: String,
    #[serde(default)]
    pub state: String,
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: GraphConnection<GraphReviewComment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMergedEvent {
    pub actor: Option<GraphAccount>,
    pub created_at: Option<DateTime<Utc>>,
    pub merge_ref_name: Option<String>,
    pub commit: Option<GraphCommit>,
    pub url: Option<String>,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReviewThread {
    #[serde(default)]
    pub id: String,
    pub pr_review_database_id: Option<u64>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub viewer_can_resolve: bool,
    #[serde(default)]
    pub viewer_can_unresolve: bool,
    #[serde(default)]
    pub path: String,
    pub start_line: Option<u64>,
    pub line: Option<u64>,
    pub original_start_line: Option<u64>,
    pub original_line: Option<u64>,
    pub diff_side: Option<String>,
    #[serde(default)]
    pub is_outdated: bool,
    pub subject_type: Option<String>,
    #[serde(default)]
    pub comments: GraphConnection<GraphReviewComment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRepo {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_in_organization: bool,
    pub owner: Option<GraphAccount>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRef {
    #[serde(default)]
    pub name: String,
    pub target: Option<GraphOid>,
    pub repository: Option<GraphRepo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPullRequest {
    pub number: u64,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub body: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub is_draft: bool,
    pub author: Option<GraphAccount>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub mergeable: String,
    pub merge_state_status: Option<String>,
    pub viewer_default_merge_method: Option<String>,
    pub head_ref: Option<GraphRef>,
    pub base_ref: Option<GraphRef>,
    #[serde(default)]
    pub labels: GraphConnection<GraphLabel>,
    pub milestone: Option<GraphMilestoneTitle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphMilestoneTitle {
    #[serde(default)]
    pub title: String,
}
