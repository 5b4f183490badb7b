//! Inline issue-reference recognition: `owner/repo#123`, `GH-123`, `#123`
//! and full github.com URL forms with an optional comment anchor. The two
//! expressions produce differently sized capture sets (7 vs 16 elements
//! counting the whole match), and extraction dispatches on that count,
//! preferring URL-form captures when both shapes are present.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub static ISSUE_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(([A-Za-z0-9_.\-]*)/([A-Za-z0-9_.\-]*))?(#|GH-)([1-9][0-9]*)($|[\s:;\-(=])")
        .unwrap()
});

pub static ISSUE_OR_URL_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(https?://github\.com/(([^\s]+)/([^\s]+))/([^\s]+/)?(issues|pull)/([0-9]+)(#issuecomment-([0-9]+))?)|(([A-Za-z0-9_.\-]*)/([A-Za-z0-9_.\-]*))?(#|GH-)([1-9][0-9]*)($|[\s:;\-(=])",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReference {
    pub owner: Option<String>,
    pub name: Option<String>,
    pub issue_number: u64,
    pub comment_number: Option<u64>,
}

fn group(caps: &Captures, idx: usize) -> Option<String> {
    caps.get(idx)
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract a reference from a match of either expression. Dispatch is by
/// fixed capture-group count: 7 elements means the short expression, 16 the
/// combined one.
pub fn parse_issue_expression(caps: &Captures) -> Option<IssueReference> {
    match caps.len() {
        7 => Some(IssueReference {
            owner: group(caps, 2),
            name: group(caps, 3),
            issue_number: caps.get(5)?.as_str().parse().ok()?,
            comment_number: None,
        }),
        16 => {
            if caps.get(3).is_some() {
                // URL form wins when both alternates could apply.
                Some(IssueReference {
                    owner: group(caps, 3),
                    name: group(caps, 4),
                    issue_number: caps.get(7)?.as_str().parse().ok()?,
                    comment_number: group(caps, 9).and_then(|n| n.parse().ok()),
                })
            } else {
                Some(IssueReference {
                    owner: group(caps, 11),
                    name: group(caps, 12),
                    issue_number: caps.get(14)?.as_str().parse().ok()?,
                    comment_number: None,
                })
            }
        }
        _ => None,
    }
}

/// All references found in a body text, in order of appearance.
pub fn find_issue_references(text: &str) -> Vec<IssueReference> {
    ISSUE_OR_URL_EXPRESSION
        .captures_iter(text)
        .filter_map(|caps| parse_issue_expression(&caps))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_bare_number() {
        let refs = find_issue_references("fixes #123 ");
        assert_eq!(
            refs,
            vec![IssueReference {
                owner: None,
                name: None,
                issue_number: 123,
                comment_number: None,
            }]
        );
    }

    #[test]
    fn test_short_form_with_repo() {
        let refs = find_issue_references("see rust-lang/rust#99999 for details");
        assert_eq!(refs[0].owner.as_deref(), Some("rust-lang"));
        assert_eq!(refs[0].name.as_deref(), Some("rust"));
        assert_eq!(refs[0].issue_number, 99999);
    }

    #[test]
    fn test_gh_prefix_form() {
        let refs = find_issue_references("tracked as GH-42 ");
        assert_eq!(refs[0].issue_number, 42);
        assert_eq!(refs[0].owner, None);
    }

    #[test]
    fn test_url_form_with_comment_anchor() {
        let refs = find_issue_references(
            "https://github.com/octo/demo/issues/7#issuecomment-3141592 broke this",
        );
        assert_eq!(refs[0].owner.as_deref(), Some("octo"));
        assert_eq!(refs[0].name.as_deref(), Some("demo"));
        assert_eq!(refs[0].issue_number, 7);
        assert_eq!(refs[0].comment_number, Some(3141592));
    }

    #[test]
    fn test_pull_url_form() {
        let refs = find_issue_references("merged in https://github.com/octo/demo/pull/88");
        assert_eq!(refs[0].issue_number, 88);
        assert_eq!(refs[0].comment_number, None);
    }

    #[test]
    fn test_capture_count_dispatch() {
        let caps = ISSUE_EXPRESSION.captures("a/b#12 ").unwrap();
        assert_eq!(caps.len(), 7);
        let parsed = parse_issue_expression(&caps).unwrap();
        assert_eq!(parsed.owner.as_deref(), Some("a"));
        assert_eq!(parsed.issue_number, 12);

        let caps = ISSUE_OR_URL_EXPRESSION.captures("a/b#12 ").unwrap();
        assert_eq!(caps.len(), 16);
        let parsed = parse_issue_expression(&caps).unwrap();
        assert_eq!(parsed.owner.as_deref(), Some("a"));
        assert_eq!(parsed.issue_number, 12);
    }

    #[test]
    fn test_zero_is_not_an_issue_number() {
        assert!(find_issue_references("#0 ").is_empty());
    }
}
