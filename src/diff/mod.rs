pub mod parser;

pub use parser::{parse_diff_hunks, DiffHunk, DiffHunks, DiffLine, LineKind};
