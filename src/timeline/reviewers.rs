//! Per-reviewer current state, derived from the canonical timeline plus the
//! live requested-reviewers list.

use std::collections::HashSet;

use crate::github::models::{
    Account, Reviewer, ReviewState, ReviewVerdict, TimelineEvent,
};

/// Reconcile reviewer states.
///
/// The timeline is scanned newest-first so the first non-pending review seen
/// per identity is that reviewer's most recent verdict. A live review
/// request always supersedes a stale verdict: requested reviewers who
/// already appear are overwritten to `Requested`, the rest are appended.
/// The PR author never appears, even if they reviewed their own item.
/// Identities are compared case-insensitively; display keeps the source
/// casing.
pub fn reviewer_states(
    requested: &[Reviewer],
    timeline: &[TimelineEvent],
    author: &Account,
) -> Vec<ReviewState> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(author.login.to_lowercase());

    let mut states: Vec<ReviewState> = Vec::new();

    for event in timeline.iter().rev() {
        let TimelineEvent::Reviewed(review) = event else {
            continue;
        };
        if review.state == ReviewVerdict::Pending {
            continue;
        }
        if seen.insert(review.user.login.to_lowercase()) {
            states.push(ReviewState {
                reviewer: Reviewer::User(review.user.clone()),
                state: review.state,
            });
        }
    }

    for reviewer in requested {
        if let Some(existing) = states
            .iter_mut()
            .find(|s| s.reviewer.identity().to_lowercase() == reviewer.identity().to_lowercase())
        {
            existing.state = ReviewVerdict::Requested;
        } else {
            states.push(ReviewState {
                reviewer: reviewer.clone(),
                state: ReviewVerdict::Requested,
            });
        }
    }

    // Completed verdicts first, pending requests last; alphabetical within
    // each partition.
    states.sort_by(|a, b| {
        let a_requested = a.state == ReviewVerdict::Requested;
        let b_requested = b.state == ReviewVerdict::Requested;
        a_requested.cmp(&b_requested).then_with(|| {
            a.reviewer
                .display_label()
                .to_lowercase()
                .cmp(&b.reviewer.display_label().to_lowercase())
        })
    });

    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::models::{Review, Team};

    fn account(login: &str) -> Account {
        Account {
            login: login.to_string(),
            url: format!("https://github.com/{login}"),
            avatar_url: None,
            email: None,
            name: None,
        }
    }

    fn reviewed(login: &str, state: ReviewVerdict) -> TimelineEvent {
        TimelineEvent::Reviewed(Review {
            id: 0,
            graph_node_id: String::new(),
            user: account(login),
            body: String::new(),
            body_html: String::new(),
            state,
            submitted_at: None,
            comments: Vec::new(),
        })
    }

    #[test]
    fn test_request_overrides_stale_review_state() {
        // Chronological: B approved, A requested changes, B commented.
        let timeline = vec![
            reviewed("B", ReviewVerdict::Approved),
            reviewed("A", ReviewVerdict::ChangesRequested),
            reviewed("B", ReviewVerdict::Commented),
        ];
        let requested = vec![
            Reviewer::User(account("A")),
            Reviewer::User(account("B")),
        ];

        let states = reviewer_states(&requested, &timeline, &account("C"));

        assert_eq!(states.len(), 2);
        assert_eq!(states[0].reviewer.identity(), "A");
        assert_eq!(states[0].state, ReviewVerdict::Requested);
        assert_eq!(states[1].reviewer.identity(), "B");
        assert_eq!(states[1].state, ReviewVerdict::Requested);
    }

    #[test]
    fn test_most_recent_non_pending_state_wins() {
        let timeline = vec![
            reviewed("A", ReviewVerdict::Approved),
            reviewed("A", ReviewVerdict::ChangesRequested),
            reviewed("A", ReviewVerdict::Pending),
        ];

        let states = reviewer_states(&[], &timeline, &account("author"));

        assert_eq!(states.len(), 1);
        assert_eq!(states[0].state, ReviewVerdict::ChangesRequested);
    }

    #[test]
    fn test_author_never_appears() {
        let timeline = vec![reviewed("self", ReviewVerdict::Approved)];
        let states = reviewer_states(&[], &timeline, &account("self"));
        assert!(states.is_empty());
    }

    #[test]
    fn test_identity_comparison_ignores_case() {
        // A review by "alice" and a request for "Alice" are the same person:
        // one entry, overridden to Requested.
        let timeline = vec![reviewed("alice", ReviewVerdict::Approved)];
        let requested = vec![Reviewer::User(account("Alice"))];

        let states = reviewer_states(&requested, &timeline, &account("author"));

        assert_eq!(states.len(), 1);
        assert_eq!(states[0].state, ReviewVerdict::Requested);
    }

    #[test]
    fn test_author_excluded_regardless_of_login_case() {
        let timeline = vec![reviewed("self", ReviewVerdict::Approved)];
        let states = reviewer_states(&[], &timeline, &account("Self"));
        assert!(states.is_empty());
    }

    #[test]
    fn test_sort_partitions_and_orders_by_label() {
        let timeline = vec![
            reviewed("zoe", ReviewVerdict::Approved),
            reviewed("adam", ReviewVerdict::Commented),
        ];
        let requested = vec![
            Reviewer::Team(Team {
                name: "Backend".to_string(),
                id: "T_1".to_string(),
                url: String::new(),
                avatar_url: None,
                slug: None,
            }),
            Reviewer::User(account("amy")),
        ];

        let states = reviewer_states(&requested, &timeline, &account("author"));

        let order: Vec<&str> = states.iter().map(|s| s.reviewer.identity()).collect();
        // Completed reviews first (adam, zoe), then requests (amy, Backend),
        // each partition case-insensitively alphabetical.
        assert_eq!(order, vec!["adam", "zoe", "amy", "Backend"]);
    }

    #[test]
    fn test_empty_inputs_yield_empty_output() {
        assert!(reviewer_states(&[], &[], &account("author")).is_empty());
    }
}
