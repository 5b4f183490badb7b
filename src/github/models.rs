use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::DiffHunk;

/// Canonical account record. Upstream author fields are nullable in both
/// APIs; an absent author normalizes to [`Account::ghost`], never to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    pub url: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Account {
    /// Sentinel identity used when upstream author data is absent.
    pub fn ghost() -> Self {
        Self {
            login: String::new(),
            url: String::new(),
            avatar_url: None,
            email: None,
            name: None,
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.login.is_empty() && self.url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub id: String,
    pub url: String,
    pub avatar_url: Option<String>,
    pub slug: Option<String>,
}

/// A review can be requested from either a user or a team. Identity and
/// display label are the shared capability; everything else is
/// variant-specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reviewer {
    User(Account),
    Team(Team),
}

impl Reviewer {
    /// Identity key: login for accounts, name for teams.
    pub fn identity(&self) -> &str {
        match self {
            Reviewer::User(account) => &account.login,
            Reviewer::Team(team) => &team.name,
        }
    }

    pub fn display_label(&self) -> &str {
        match self {
            Reviewer::User(account) => account
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(&account.login),
            Reviewer::Team(team) => &team.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub label: String,
    pub count: u64,
    pub viewer_has_reacted: bool,
}

/// Canonical comment record, shared by issue comments and inline review
/// comments. `diff_hunks` is always re-derived from `diff_hunk` text at
/// construction and never trusted from upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub graph_node_id: String,
    pub url: String,
    pub body: String,
    pub body_html: String,
    pub path: Option<String>,
    pub diff_hunk: String,
    pub diff_hunks: Vec<DiffHunk>,
    pub position: Option<u64>,
    pub original_position: Option<u64>,
    pub commit_id: String,
    pub original_commit_id: Option<String>,
    pub user: Account,
    pub created_at: DateTime<Utc>,
    pub is_draft: bool,
    pub in_reply_to_id: Option<u64>,
    pub reactions: Vec<Reaction>,
    /// Inherited from the owning review thread, not intrinsic to the comment.
    pub is_resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewThread {
    pub id: String,
    pub pr_review_database_id: Option<u64>,
    pub is_resolved: bool,
    pub viewer_can_resolve: bool,
    pub viewer_can_unresolve: bool,
    pub path: String,
    pub start_line: u64,
    pub end_line: u64,
    pub original_start_line: u64,
    pub original_end_line: u64,
    pub diff_side: DiffSide,
    pub is_outdated: bool,
    pub subject_type: ThreadSubjectType,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadSubjectType {
    Line,
    File,
}

/// Review verdict vocabulary as supplied by upstream, plus the synthetic
/// `Requested` used for pending review requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewVerdict {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Requested,
}

impl ReviewVerdict {
    /// Unknown strings degrade to `Commented` rather than failing; the
    /// upstream vocabulary has grown before.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "APPROVED" => ReviewVerdict::Approved,
            "CHANGES_REQUESTED" => ReviewVerdict::ChangesRequested,
            "DISMISSED" => ReviewVerdict::Dismissed,
            "PENDING" => ReviewVerdict::Pending,
            _ => ReviewVerdict::Commented,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub graph_node_id: String,
    pub user: Account,
    pub body: String,
    pub body_html: String,
    pub state: ReviewVerdict,
    pub submitted_at: Option<DateTime<Utc>>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

/// One entry of the derived per-reviewer state view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub reviewer: Reviewer,
    pub state: ReviewVerdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub clone_url: String,
    pub is_in_organization: bool,
    pub owner: String,
    pub name: String,
}

/// A branch ref. A deleted upstream ref surfaces as `Option<Ref>` = `None`
/// at the call sites, never as a hollow record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    pub label: String,
    pub ref_name: String,
    pub sha: String,
    pub repo: RepoInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mergeability {
    Unknown,
    Mergeable,
    Conflict,
    NotMergeable,
    Behind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    Merge,
    Squash,
    Rebase,
}

/// The canonical, source-agnostic timeline event. `NewCommitsSinceReview`
/// has no upstream equivalent; it is inserted only by the commit-regrouping
/// pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    Committed {
        sha: String,
        author: Account,
        message: String,
        authored_date: Option<DateTime<Utc>>,
        url: Option<String>,
    },
    Labeled {
        label: Label,
        actor: Account,
        created_at: Option<DateTime<Utc>>,
    },
    Milestoned {
        title: String,
        actor: Account,
        created_at: Option<DateTime<Utc>>,
    },
    Assigned {
        assignee: Account,
        actor: Account,
        created_at: Option<DateTime<Utc>>,
    },
    HeadRefDeleted {
        actor: Account,
        created_at: Option<DateTime<Utc>>,
        head_ref: Option<String>,
    },
    Commented(Comment),
    Reviewed(Review),
    Merged {
        actor: Account,
        created_at: Option<DateTime<Utc>>,
        merge_ref: Option<String>,
        sha: Option<String>,
        url: Option<String>,
        graph_node_id: String,
    },
    Other {
        typename: String,
    },
    NewCommitsSinceReview {
        id: String,
    },
}

impl TimelineEvent {
    pub fn is_committed(&self) -> bool {
        matches!(self, TimelineEvent::Committed { .. })
    }

    pub fn is_reviewed(&self) -> bool {
        matches!(self, TimelineEvent::Reviewed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

/// Canonical pull-request record assembled from either API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub graph_node_id: String,
    pub title: String,
    pub body: Option<String>,
    pub state: PullRequestState,
    pub author: Account,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_draft: bool,
    /// `None` when the source was a list endpoint that omits `mergeable`.
    pub mergeability: Option<Mergeability>,
    pub merge_method: Option<MergeMethod>,
    pub head: Option<Ref>,
    pub base: Option<Ref>,
    pub labels: Vec<Label>,
    pub milestone: Option<String>,
    pub requested_reviewers: Vec<Reviewer>,
}
