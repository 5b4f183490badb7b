//! Conversions from raw REST/GraphQL shapes into the canonical model.
//! These are pure, infallible transforms: missing authors become the ghost
//! sentinel, unknown enum strings degrade to conservative values and diff
//! hunks are always re-derived from the raw hunk text. Deterministic: a
//! missing timestamp falls back to the epoch, never the wall clock.

use chrono::DateTime;

use super::graphql::*;
use super::models::*;
use super::rest::*;
use crate::diff::parse_diff_hunks;

/// Author rule shared by every normalizer: copy the fields when an author is
/// present, emit the ghost sentinel when it is not. Nothing downstream of
/// this boundary ever sees a null author.
pub fn account_from_rest(raw: Option<&RestAccount>) -> Account {
    match raw {
        Some(user) => Account {
            login: user.login.clone(),
            url: user.html_url.clone(),
            avatar_url: user.avatar_url.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        },
        None => Account::ghost(),
    }
}

pub fn account_from_graph(raw: Option<&GraphAccount>) -> Account {
    match raw {
        Some(author) => Account {
            login: author.login.clone(),
            url: author.url.clone(),
            avatar_url: author.avatar_url.clone(),
            email: author.email.clone(),
            name: author.name.clone(),
        },
        None => Account::ghost(),
    }
}

pub fn team_from_rest(raw: &RestTeam) -> Team {
    Team {
        name: raw.name.clone(),
        id: raw.id.to_string(),
        url: raw.html_url.clone(),
        avatar_url: raw.avatar_url.clone(),
        slug: raw.slug.clone(),
    }
}

pub fn team_from_graph(raw: &GraphTeam) -> Team {
    Team {
        name: raw.name.clone(),
        id: raw.id.clone(),
        url: raw.url.clone(),
        avatar_url: raw.avatar_url.clone(),
        slug: raw.slug.clone(),
    }
}

fn reactions_from_graph(groups: &[GraphReactionGroup]) -> Vec<Reaction> {
    groups
        .iter()
        .map(|group| Reaction {
            label: group.content.clone(),
            count: group.reactors.as_ref().map(|r| r.total_count).unwrap_or(0),
            viewer_has_reacted: group.viewer_has_reacted,
        })
        .collect()
}

/// Normalize one raw REST review comment. Draft detection and reply linking
/// follow the same rules as the GraphQL path: draft iff the raw
/// review-association state is exactly `"PENDING"`, reply id only when the
/// payload carries one.
pub fn comment_from_rest(raw: &RestComment) -> Comment {
    Comment {
        id: raw.id,
        graph_node_id: raw.node_id.clone(),
        url: raw.html_url.clone(),
        body: raw.body.clone(),
        body_html: raw.body_html.clone().unwrap_or_default(),
        path: raw.path.clone(),
        diff_hunks: parse_diff_hunks(&raw.diff_hunk),
        diff_hunk: raw.diff_hunk.clone(),
        position: raw.position,
        original_position: raw.original_position,
        commit_id: raw.commit_id.clone(),
        original_commit_id: raw.original_commit_id.clone(),
        user: account_from_rest(raw.user.as_ref()),
        created_at: raw.created_at,
        is_draft: raw.state.as_deref() == Some("PENDING"),
        in_reply_to_id: raw.in_reply_to_id,
        reactions: Vec::new(),
        is_resolved: false,
    }
}

/// Normalize one raw GraphQL review comment. `is_resolved` belongs to the
/// owning thread, so the caller passes it in.
pub fn comment_from_graph(raw: &GraphReviewComment, is_resolved: bool) -> Comment {
    Comment {
        id: raw.database_id.unwrap_or(0),
        graph_node_id: raw.id.clone(),
        url: raw.url.clone(),
        body: raw.body.clone(),
        body_html: raw.body_html.clone(),
        path: raw.path.clone(),
        diff_hunks: parse_diff_hunks(&raw.diff_hunk),
        diff_hunk: raw.diff_hunk.clone(),
        position: raw.position,
        original_position: raw.original_position,
        commit_id: raw.commit.as_ref().map(|c| c.oid.clone()).unwrap_or_default(),
        original_commit_id: raw.original_commit.as_ref().map(|c| c.oid.clone()),
        user: account_from_graph(raw.author.as_ref()),
        created_at: raw.created_at.unwrap_or(DateTime::UNIX_EPOCH),
        is_draft: raw.state.as_deref() == Some("PENDING"),
        in_reply_to_id: raw.reply_to.as_ref().and_then(|r| r.database_id),
        reactions: reactions_from_graph(&raw.reaction_groups),
        is_resolved,
    }
}

/// An issue comment has no file anchor; it still flows through the same
/// canonical record.
pub fn comment_from_issue_comment(raw: &GraphIssueComment) -> Comment {
    Comment {
        id: raw.database_id.unwrap_or(0),
        graph_node_id: raw.id.clone(),
        url: raw.url.clone(),
        body: raw.body.clone(),
        body_html: raw.body_html.clone(),
        path: None,
        diff_hunks: Vec::new(),
        diff_hunk: String::new(),
        position: None,
        original_position: None,
        commit_id: String::new(),
        original_commit_id: None,
        user: account_from_graph(raw.author.as_ref()),
        created_at: raw.created_at.unwrap_or(DateTime::UNIX_EPOCH),
        is_draft: false,
        in_reply_to_id: None,
        reactions: reactions_from_graph(&raw.reaction_groups),
        is_resolved: false,
    }
}

pub fn review_from_graph(raw: &GraphReview) -> Review {
    Review {
        id: raw.database_id.unwrap_or(0),
        graph_node_id: raw.id.clone(),
        user: account_from_graph(raw.author.as_ref()),
        body: raw.body.clone(),
        body_html: raw.body_html.clone(),
        state: ReviewVerdict::parse(&raw.state),
        submitted_at: raw.submitted_at,
        comments: raw
            .comments
            .nodes
            .iter()
            .map(|c| comment_from_graph(c, false))
            .collect(),
    }
}

/// Thread normalization. Missing start lines fall back to the end line
/// (single-line thread); every member comment inherits the thread's
/// resolution state.
pub fn thread_from_graph(raw: &GraphReviewThread) -> ReviewThread {
    let end_line = raw.line.unwrap_or(0);
    let original_end_line = raw.original_line.unwrap_or(0);
    ReviewThread {
        id: raw.id.clone(),
        pr_review_database_id: raw.pr_review_database_id,
        is_resolved: raw.is_resolved,
        viewer_can_resolve: raw.viewer_can_resolve,
        viewer_can_unresolve: raw.viewer_can_unresolve,
        path: raw.path.clone(),
        start_line: raw.start_line.unwrap_or(end_line),
        end_line,
        original_start_line: raw.original_start_line.unwrap_or(original_end_line),
        original_end_line,
        diff_side: match raw.diff_side.as_deref() {
            Some("LEFT") => DiffSide::Left,
            _ => DiffSide::Right,
        },
        is_outdated: raw.is_outdated,
        subject_type: match raw.subject_type.as_deref() {
            Some("FILE") => ThreadSubjectType::File,
            _ => ThreadSubjectType::Line,
        },
        comments: raw
            .comments
            .nodes
            .iter()
            .map(|c| comment_from_graph(c, raw.is_resolved))
            .collect(),
    }
}

/// Ref normalization: a deleted upstream ref (or one whose repository is
/// gone) yields `None`, never a hollow record.
pub fn ref_from_rest(raw: Option<&RestRef>) -> Option<Ref> {
    let raw = raw?;
    let repo = raw.repo.as_ref()?;
    Some(Ref {
        label: raw.label.clone().unwrap_or_default(),
        ref_name: raw.ref_name.clone(),
        sha: raw.sha.clone(),
        repo: RepoInfo {
            clone_url: repo.clone_url.clone(),
            is_in_organization: repo
                .owner
                .as_ref()
                .and_then(|o| o.account_type.as_deref())
                .map(|t| t == "Organization")
                .unwrap_or(false),
            owner: repo
                .owner
                .as_ref()
                .map(|o| o.login.clone())
                .unwrap_or_default(),
            name: repo.name.clone(),
        },
    })
}

pub fn ref_from_graph(raw: Option<&GraphRef>) -> Option<Ref> {
    let raw = raw?;
    let repo = raw.repository.as_ref()?;
    let sha = raw.target.as_ref().map(|t| t.oid.clone()).unwrap_or_default();
    Some(Ref {
        label: format!(
            "{}:{}",
            repo.owner.as_ref().map(|o| o.login.as_str()).unwrap_or(""),
            raw.name
        ),
        ref_name: raw.name.clone(),
        sha,
        repo: RepoInfo {
            clone_url: format!("{}.git", repo.url),
            is_in_organization: repo.is_in_organization,
            owner: repo
                .owner
                .as_ref()
                .map(|o| o.login.clone())
                .unwrap_or_default(),
            name: repo.name.clone(),
        },
    })
}

/// Mergeability table: base mapping from the mergeable enum, then the
/// merge-state-status override. Conflict always wins over BLOCKED/BEHIND.
pub fn parse_mergeability(mergeable: &str, merge_state_status: Option<&str>) -> Mergeability {
    let base = match mergeable {
        "MERGEABLE" => Mergeability::Mergeable,
        "CONFLICTING" => Mergeability::Conflict,
        _ => Mergeability::Unknown,
    };
    if base == Mergeability::Conflict {
        return base;
    }
    match merge_state_status {
        Some("BLOCKED") => Mergeability::NotMergeable,
        Some("BEHIND") => Mergeability::Behind,
        _ => base,
    }
}

pub fn parse_merge_method(raw: &str) -> Option<MergeMethod> {
    match raw {
        "MERGE" => Some(MergeMethod::Merge),
        "SQUASH" => Some(MergeMethod::Squash),
        "REBASE" => Some(MergeMethod::Rebase),
        _ => None,
    }
}

fn label_from_rest(raw: &RestLabel) -> Label {
    match raw {
        RestLabel::Object { name, color } => Label {
            name: name.clone(),
            color: color.clone().unwrap_or_default(),
        },
        RestLabel::Name(name) => Label {
            name: name.clone(),
            color: String::new(),
        },
    }
}

/// Assemble the canonical record from a REST payload. List endpoints omit
/// `mergeable` entirely; only its presence sets canonical mergeability.
pub fn pull_request_from_rest(raw: &RestPullRequest) -> PullRequest {
    let state = if raw.merged == Some(true) {
        PullRequestState::Merged
    } else if raw.state == "closed" {
        PullRequestState::Closed
    } else {
        PullRequestState::Open
    };

    let mergeability = raw.mergeable.map(|value| {
        let mergeable = match value {
            Some(true) => "MERGEABLE",
            Some(false) => "CONFLICTING",
            None => "UNKNOWN",
        };
        let status = raw.mergeable_state.as_deref().map(str::to_uppercase);
        parse_mergeability(mergeable, status.as_deref())
    });

    let mut requested_reviewers: Vec<Reviewer> = raw
        .requested_reviewers
        .iter()
        .map(|u| Reviewer::User(account_from_rest(Some(u))))
        .collect();
    requested_reviewers.extend(
        raw.requested_teams
            .iter()
            .map(|t| Reviewer::Team(team_from_rest(t))),
    );

    PullRequest {
        number: raw.number,
        graph_node_id: raw.node_id.clone(),
        title: raw.title.clone(),
        body: raw.body.clone(),
        state,
        author: account_from_rest(raw.user.as_ref()),
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        is_draft: raw.draft.unwrap_or(false),
        mergeability,
        merge_method: None,
        head: ref_from_rest(raw.head.as_ref()),
        base: ref_from_rest(raw.base.as_ref()),
        labels: raw.labels.iter().map(label_from_rest).collect(),
        milestone: raw.milestone.as_ref().map(|m| m.title.clone()),
        requested_reviewers,
    }
}

pub fn pull_request_from_graph(raw: &GraphPullRequest) -> PullRequest {
    let state = match raw.state.as_str() {
        "MERGED" => PullRequestState::Merged,
        "CLOSED" => PullRequestState::Closed,
        _ => PullRequestState::Open,
    };

    PullRequest {
        number: raw.number,
        graph_node_id: raw.id.clone(),
        title: raw.title.clone(),
        body: raw.body.clone(),
        state,
        author: account_from_graph(raw.author.as_ref()),
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        is_draft: raw.is_draft,
        mergeability: Some(parse_mergeability(
            &raw.mergeable,
            raw.merge_state_status.as_deref(),
        )),
        merge_method: raw
            .viewer_default_merge_method
            .as_deref()
            .and_then(parse_merge_method),
        head: ref_from_graph(raw.head_ref.as_ref()),
        base: ref_from_graph(raw.base_ref.as_ref()),
        labels: raw
            .labels
            .nodes
            .iter()
            .map(|l| Label {
                name: l.name.clone(),
                color: l.color.clone(),
            })
            .collect(),
        milestone: raw.milestone.as_ref().map(|m| m.title.clone()),
        requested_reviewers: Vec::new(),
    }
}
