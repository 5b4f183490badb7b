pub mod normalizer;
pub mod regroup;
pub mod reviewers;


pub use normalizer::{normalize_timeline, EventKind};
pub use regroup::insert_new_commits_since_review;
pub use reviewers::reviewer_states;
