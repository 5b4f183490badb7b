//! Commit regrouping: bracket the commits pushed between a user's latest
//! review and the commit that review actually landed on under a synthetic
//! `NewCommitsSinceReview` marker, so a renderer can collapse them.

use crate::github::models::{Ref, TimelineEvent};

/// Relocate commits relative to the current user's most recent review.
///
/// Returns a new timeline; the input is never mutated. The pass is a no-op
/// unless a review-commit sha was captured, it differs from the live head
/// sha and the head ref still exists. The scan runs newest to oldest,
/// skipping index 0:
///
/// - a `Reviewed` event by `current_user` (logins compared
///   case-insensitively) records the insertion point,
/// - every commit older than that review is displaced into a scratch buffer,
/// - finding the commit the review landed on prepends the marker and splices
///   the buffer back in immediately after the review.
///
/// If the captured sha is never found the input is returned unchanged; the
/// scratch buffer is simply dropped, so a mid-scan abort can never leave a
/// half-rewritten timeline.
pub fn insert_new_commits_since_review(
    timeline: &[TimelineEvent],
    latest_review_commit: Option<&str>,
    current_user: &str,
    head: Option<&Ref>,
) -> Vec<TimelineEvent> {
    let Some(captured_sha) = latest_review_commit else {
        return timeline.to_vec();
    };
    let Some(head) = head else {
        return timeline.to_vec();
    };
    if head.sha == captured_sha {
        return timeline.to_vec();
    }

    let mut events = timeline.to_vec();
    let mut insertion_idx = 0usize;
    let mut committed_during_review = false;
    let mut displaced: Vec<TimelineEvent> = Vec::new();

    let mut i = events.len();
    while i > 1 {
        i -= 1;
        match &events[i] {
            TimelineEvent::Committed { sha, .. } if sha.as_str() == captured_sha => {
                displaced.insert(
                    0,
                    TimelineEvent::NewCommitsSinceReview {
                        id: captured_sha.to_string(),
                    },
                );
                let tail = events.split_off(insertion_idx + 1);
                events.extend(displaced);
                events.extend(tail);
                return events;
            }
            TimelineEvent::Committed { .. } if committed_during_review => {
                let commit = events.remove(i);
                displaced.insert(0, commit);
                // The recorded review sits above i; its index shifts down.
                insertion_idx -= 1;
            }
            TimelineEvent::Reviewed(review)
                if !committed_during_review
                    && review.user.login.to_lowercase() == current_user.to_lowercase() =>
            {
                insertion_idx = i;
                committed_during_review = true;
            }
            _ => {}
        }
    }

    // Captured sha not found in the scanned range: discard the scratch copy.
    timeline.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::models::{Account, RepoInfo, Review, ReviewVerdict};

    fn commit(sha: &str) -> TimelineEvent {
        TimelineEvent::Committed {
            sha: sha.to_string(),
            author: Account::ghost(),
            message: format!("commit {sha}"),
            authored_date: None,
            url: None,
        }
    }

    fn reviewed(login: &str) -> TimelineEvent {
        TimelineEvent::Reviewed(Review {
            id: 0,
            graph_node_id: String::new(),
            user: Account {
                login: login.to_string(),
                url: String::new(),
                avatar_url: None,
                email: None,
                name: None,
            },
            body: String::new(),
            body_html: String::new(),
            state: ReviewVerdict::Approved,
            submitted_at: None,
            comments: Vec::new(),
        })
    }

    fn head_ref(sha: &str) -> Ref {
        Ref {
            label: "o:feature".to_string(),
            ref_name: "feature".to_string(),
            sha: sha.to_string(),
            repo: RepoInfo {
                clone_url: String::new(),
                is_in_organization: false,
                owner: "o".to_string(),
                name: "r".to_string(),
            },
        }
    }

    fn shas(timeline: &[TimelineEvent]) -> Vec<String> {
        timeline
            .iter()
            .map(|e| match e {
                TimelineEvent::Committed { sha, .. } => format!("c:{sha}"),
                TimelineEvent::Reviewed(r) => format!("r:{}", r.user.login),
                TimelineEvent::NewCommitsSinceReview { id } => format!("m:{id}"),
                other => format!("{other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_marker_inserted_after_review() {
        let timeline = vec![reviewed("u"), commit("X"), commit("Y")];
        let head = head_ref("Z");

        let result = insert_new_commits_since_review(&timeline, Some("X"), "u", Some(&head));

        assert_eq!(shas(&result), vec!["r:u", "m:X", "c:X", "c:Y"]);
        // Input untouched.
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn test_commits_between_review_and_reviewed_commit_are_relocated() {
        // Chronological: c0, X (reviewed-at), c1 pushed during review,
        // review by u, then c2 after.
        let timeline = vec![
            commit("c0"),
            commit("X"),
            commit("c1"),
            reviewed("u"),
            commit("c2"),
        ];
        let head = head_ref("c2");

        let result = insert_new_commits_since_review(&timeline, Some("X"), "u", Some(&head));

        assert_eq!(
            shas(&result),
            vec!["c:c0", "c:X", "r:u", "m:X", "c:c1", "c:c2"]
        );
    }

    #[test]
    fn test_noop_without_captured_sha() {
        let timeline = vec![reviewed("u"), commit("X")];
        let head = head_ref("Y");
        let result = insert_new_commits_since_review(&timeline, None, "u", Some(&head));
        assert_eq!(result, timeline);
    }

    #[test]
    fn test_noop_when_head_matches_captured_sha() {
        let timeline = vec![reviewed("u"), commit("X")];
        let head = head_ref("X");
        let result = insert_new_commits_since_review(&timeline, Some("X"), "u", Some(&head));
        assert_eq!(result, timeline);
    }

    #[test]
    fn test_noop_when_head_ref_deleted() {
        let timeline = vec![reviewed("u"), commit("X")];
        let result = insert_new_commits_since_review(&timeline, Some("X"), "u", None);
        assert_eq!(result, timeline);
    }

    #[test]
    fn test_unfound_sha_returns_input_unchanged() {
        // Captured sha absent from the range: buffered commits must be
        // restored, not lost.
        let timeline = vec![
            commit("c0"),
            reviewed("u"),
            commit("c1"),
            commit("c2"),
        ];
        let head = head_ref("zzz");

        let result =
            insert_new_commits_since_review(&timeline, Some("missing"), "u", Some(&head));

        assert_eq!(result, timeline);
    }

    #[test]
    fn test_current_user_match_ignores_login_case() {
        // Same relocation scenario, but the review login casing differs from
        // the configured current user.
        let timeline = vec![
            commit("c0"),
            commit("X"),
            commit("c1"),
            reviewed("U"),
            commit("c2"),
        ];
        let head = head_ref("c2");

        let result = insert_new_commits_since_review(&timeline, Some("X"), "u", Some(&head));

        assert_eq!(
            shas(&result),
            vec!["c:c0", "c:X", "r:U", "m:X", "c:c1", "c:c2"]
        );
    }

    #[test]
    fn test_other_users_reviews_are_ignored() {
        let timeline = vec![
            commit("c0"),
            commit("X"),
            reviewed("someone-else"),
            reviewed("u"),
            commit("c1"),
        ];
        let head = head_ref("c1");

        let result = insert_new_commits_since_review(&timeline, Some("X"), "u", Some(&head));

        // Insertion point is u's review, not the other reviewer's.
        assert_eq!(
            shas(&result),
            vec!["c:c0", "c:X", "r:someone-else", "r:u", "m:X", "c:c1"]
        );
    }
}
