//! prweave: normalization and reconciliation engine for GitHub pull-request
//! timelines. Raw REST and GraphQL payloads go in; one canonical, ordered,
//! annotated event sequence and its derived views come out.

pub mod auth;
pub mod avatar;
pub mod diff;
pub mod github;
pub mod links;
pub mod settings;
pub mod timeline;

pub use github::models::{
    Account, Comment, Mergeability, MergeMethod, PullRequest, Ref, Review, Reviewer, ReviewState,
    ReviewThread, ReviewVerdict, Team, TimelineEvent,
};
pub use timeline::{insert_new_commits_since_review, normalize_timeline, reviewer_states};
