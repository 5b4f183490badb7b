use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HUNK_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@@\s+-(\d+),?(\d*)\s+\+(\d+),?(\d*)\s+@@").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: LineKind,
    pub content: String,
    pub old_line_no: Option<u64>,
    pub new_line_no: Option<u64>,
}

/// One contiguous span of a unified-diff hunk, as embedded in inline review
/// comments. Parsing is purely syntactic; hunk arithmetic is not validated
/// against any real file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u64,
    pub old_len: u64,
    pub new_start: u64,
    pub new_len: u64,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// Re-serialize the `@@` header for this hunk's ranges.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )
    }
}

/// Lazy iterator over the hunks of a raw diff-hunk text. Restartable: call
/// [`DiffHunks::new`] again (or clone before iterating) to scan from the top.
/// Empty input yields no hunks; lines before the first `@@` header are
/// skipped rather than treated as an error.
#[derive(Debug, Clone)]
pub struct DiffHunks<'a> {
    lines: std::iter::Peekable<std::str::Lines<'a>>,
}

impl<'a> DiffHunks<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
        }
    }
}

impl<'a> Iterator for DiffHunks<'a> {
    type Item = DiffHunk;

    fn next(&mut self) -> Option<DiffHunk> {
        // Seek the next hunk header, tolerating any leading junk.
        let caps = loop {
            let line = self.lines.next()?;
            if let Some(caps) = HUNK_HEADER_RE.captures(line) {
                break caps;
            }
        };

        let old_start: u64 = caps[1].parse().unwrap_or(0);
        let old_len: u64 = caps[2].parse().unwrap_or(1);
        let new_start: u64 = caps[3].parse().unwrap_or(0);
        let new_len: u64 = caps[4].parse().unwrap_or(1);

        let mut old_line_no = old_start.saturating_sub(1);
        let mut new_line_no = new_start.saturating_sub(1);
        let mut lines = Vec::new();

        while let Some(&line) = self.lines.peek() {
            if HUNK_HEADER_RE.is_match(line) {
                break;
            }
            self.lines.next();

            let diff_line = if let Some(content) = line.strip_prefix('+') {
                new_line_no += 1;
                DiffLine {
                    kind: LineKind::Added,
                    content: content.to_string(),
                    old_line_no: None,
                    new_line_no: Some(new_line_no),
                }
            } else if let Some(content) = line.strip_prefix('-') {
                old_line_no += 1;
                DiffLine {
                    kind: LineKind::Removed,
                    content: content.to_string(),
                    old_line_no: Some(old_line_no),
                    new_line_no: None,
                }
            } else {
                // Context, with or without the leading space.
                old_line_no += 1;
                new_line_no += 1;
                DiffLine {
                    kind: LineKind::Context,
                    content: line.strip_prefix(' ').unwrap_or(line).to_string(),
                    old_line_no: Some(old_line_no),
                    new_line_no: Some(new_line_no),
                }
            };
            lines.push(diff_line);
        }

        Some(DiffHunk {
            old_start,
            old_len,
            new_start,
            new_len,
            lines,
        })
    }
}

/// Eagerly parse every hunk of `text`. This is what comment construction
/// uses to derive `diff_hunks`.
pub fn parse_diff_hunks(text: &str) -> Vec<DiffHunk> {
    DiffHunks::new(text).collect()
}
