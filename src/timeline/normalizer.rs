//! Timeline normalization: classify each raw GraphQL event by its
//! `__typename` and extract the kind-specific fields into the canonical
//! [`TimelineEvent`]. Order in equals order out; upstream is assumed
//! chronological and no reordering happens here.

use serde_json::Value;
use tracing::debug;

use crate::github::convert::{
    account_from_graph, comment_from_issue_comment, review_from_graph,
};
use crate::github::graphql::{
    GraphAssignedEvent, GraphCommit, GraphCommitEvent, GraphHeadRefDeletedEvent,
    GraphIssueComment, GraphLabeledEvent, GraphMergedEvent, GraphMilestonedEvent, GraphReview,
};
use crate::github::models::{Account, Label, TimelineEvent};

/// Canonical event kinds. Classification is total: every discriminator
/// string maps somewhere, unknown ones to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Committed,
    Labeled,
    Milestoned,
    Assigned,
    HeadRefDeleted,
    Commented,
    Reviewed,
    Merged,
    Other,
}

impl EventKind {
    /// Map a raw `__typename` to a kind. The commit payload arrives either
    /// wrapped (`PullRequestCommit`) or bare (`Commit`) depending on the
    /// query, so both classify as `Committed`. Forward compatibility over
    /// strict validation: this never fails.
    pub fn classify(typename: &str) -> Self {
        match typename {
            "Commit" | "PullRequestCommit" => EventKind::Committed,
            "LabeledEvent" => EventKind::Labeled,
            "MilestonedEvent" => EventKind::Milestoned,
            "AssignedEvent" => EventKind::Assigned,
            "HeadRefDeletedEvent" => EventKind::HeadRefDeleted,
            "IssueComment" => EventKind::Commented,
            "PullRequestReview" => EventKind::Reviewed,
            "MergedEvent" => EventKind::Merged,
            _ => EventKind::Other,
        }
    }
}

/// Normalize an ordered raw event sequence. Events whose payload fails
/// kind-specific extraction degrade to `Other` instead of aborting the
/// sync cycle.
pub fn normalize_timeline(raw_events: &[Value]) -> Vec<TimelineEvent> {
    raw_events.iter().map(normalize_event).collect()
}

fn normalize_event(raw: &Value) -> TimelineEvent {
    let typename = raw
        .get("__typename")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let extracted = match EventKind::classify(typename) {
        EventKind::Committed => extract_committed(raw),
        EventKind::Labeled => extract_labeled(raw),
        EventKind::Milestoned => extract_milestoned(raw),
        EventKind::Assigned => extract_assigned(raw),
        EventKind::HeadRefDeleted => extract_head_ref_deleted(raw),
        EventKind::Commented => extract_commented(raw),
        EventKind::Reviewed => extract_reviewed(raw),
        EventKind::Merged => extract_merged(raw),
        EventKind::Other => None,
    };

    extracted.unwrap_or_else(|| {
        if EventKind::classify(typename) != EventKind::Other {
            debug!(typename, "timeline event payload did not match its kind");
        }
        TimelineEvent::Other {
            typename: typename.to_string(),
        }
    })
}

fn extract_committed(raw: &Value) -> Option<TimelineEvent> {
    // Bare `Commit` nodes carry the fields at the top level.
    let commit: GraphCommit = if raw.get("commit").is_some() {
        let event: GraphCommitEvent = serde_json::from_value(raw.clone()).ok()?;
        event.commit
    } else {
        serde_json::from_value(raw.clone()).ok()?
    };

    let author = commit
        .author
        .as_ref()
        .map(|a| {
            let mut account = account_from_graph(a.user.as_ref());
            if account.is_ghost() {
                // Commits authored outside GitHub still carry git metadata.
                account.name = a.name.clone();
                account.email = a.email.clone();
            } else if account.email.is_none() {
                account.email = a.email.clone();
            }
            account
        })
        .unwrap_or_else(Account::ghost);

    let authored_date = commit
        .author
        .as_ref()
        .and_then(|a| a.date)
        .or(commit.committed_date);

    Some(TimelineEvent::Committed {
        sha: commit.oid,
        author,
        message: commit.message,
        authored_date,
        url: commit.url,
    })
}

fn extract_labeled(raw: &Value) -> Option<TimelineEvent> {
    let event: GraphLabeledEvent = serde_json::from_value(raw.clone()).ok()?;
    Some(TimelineEvent::Labeled {
        label: Label {
            name: event.label.name,
            color: event.label.color,
        },
        actor: account_from_graph(event.actor.as_ref()),
        created_at: event.created_at,
    })
}

fn extract_milestoned(raw: &Value) -> Option<TimelineEvent> {
    let event: GraphMilestonedEvent = serde_json::from_value(raw.clone()).ok()?;
    Some(TimelineEvent::Milestoned {
        title: event.milestone_title,
        actor: account_from_graph(event.actor.as_ref()),
        created_at: event.created_at,
    })
}

fn extract_assigned(raw: &Value) -> Option<TimelineEvent> {
    let event: GraphAssignedEvent = serde_json::from_value(raw.clone()).ok()?;
    Some(TimelineEvent::Assigned {
        assignee: account_from_graph(event.assignee.as_ref()),
        actor: account_from_graph(event.actor.as_ref()),
        created_at: event.created_at,
    })
}

fn extract_head_ref_deleted(raw: &Value) -> Option<TimelineEvent> {
    let event: GraphHeadRefDeletedEvent = serde_json::from_value(raw.clone()).ok()?;
    Some(TimelineEvent::HeadRefDeleted {
        actor: account_from_graph(event.actor.as_ref()),
        created_at: event.created_at,
        head_ref: event.head_ref_name,
    })
}

fn extract_commented(raw: &Value) -> Option<TimelineEvent> {
    let comment: GraphIssueComment = serde_json::from_value(raw.clone()).ok()?;
    Some(TimelineEvent::Commented(comment_from_issue_comment(
        &comment,
    )))
}

fn extract_reviewed(raw: &Value) -> Option<TimelineEvent> {
    let review: GraphReview = serde_json::from_value(raw.clone()).ok()?;
    Some(TimelineEvent::Reviewed(review_from_graph(&review)))
}

fn extract_merged(raw: &Value) -> Option<TimelineEvent> {
    let event: GraphMergedEvent = serde_json::from_value(raw.clone()).ok()?;
    Some(TimelineEvent::Merged {
        actor: account_from_graph(event.actor.as_ref()),
        created_at: event.created_at,
        merge_ref: event.merge_ref_name,
        sha: event.commit.as_ref().map(|c| c.oid.clone()),
        url: event.url,
        graph_node_id: event.id,
    })
}

/// Visit every account embedded in an event, mutably. Used by avatar
/// resolution to swap `avatar_url` in place.
pub fn for_each_account_mut<F>(event: &mut TimelineEvent, mut visit: F)
where
    F: FnMut(&mut Account),
{
    match event {
        TimelineEvent::Committed { author, .. } => visit(author),
        TimelineEvent::Labeled { actor, .. } => visit(actor),
        TimelineEvent::Milestoned { actor, .. } => visit(actor),
        TimelineEvent::Assigned {
            assignee, actor, ..
        } => {
            visit(assignee);
            visit(actor);
        }
        TimelineEvent::HeadRefDeleted { actor, .. } => visit(actor),
        TimelineEvent::Commented(comment) => visit(&mut comment.user),
        TimelineEvent::Reviewed(review) => {
            visit(&mut review.user);
            for comment in &mut review.comments {
                visit(&mut comment.user);
            }
        }
        TimelineEvent::Merged { actor, .. } => visit(actor),
        TimelineEvent::Other { .. } | TimelineEvent::NewCommitsSinceReview { .. } => {}
    }
}
