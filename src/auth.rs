use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// One `machine ... login ... password ...` entry from .authinfo/.netrc.
#[derive(Debug, Clone, Default)]
struct AuthInfo {
    machine: String,
    login: String,
    password: String,
}

/// Token discovery with priority ordering: CLI flag, then
/// ~/.authinfo / ~/.netrc, then the GITHUB_TOKEN environment variable.
pub fn get_github_token(cli_token: Option<String>) -> Result<Option<String>> {
    if let Some(token) = cli_token {
        return Ok(Some(token));
    }

    if let Ok(Some(token)) = read_authinfo_token() {
        return Ok(Some(token));
    }

    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        return Ok(Some(token));
    }

    Ok(None)
}

/// Looks for an entry of the form:
/// `machine api.github.com login USERNAME^prweave password TOKEN`
fn read_authinfo_token() -> Result<Option<String>> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let paths = [
        PathBuf::from(&home).join(".authinfo"),
        PathBuf::from(&home).join(".netrc"),
    ];

    for path in paths {
        if !path.exists() {
            continue;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
            if mode != 0o600 && mode != 0o400 {
                eprintln!(
                    "Warning: {} has permissions {:o} (should be 600 or 400)",
                    path.display(),
                    mode
                );
            }
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if let Some(entry) = find_matching_entry(&contents) {
            return Ok(Some(entry.password));
        }
    }

    Ok(None)
}

fn find_matching_entry(contents: &str) -> Option<AuthInfo> {
    parse_authinfo(contents)
        .into_iter()
        .find(|entry| entry.machine == "api.github.com" && entry.login.ends_with("^prweave"))
}

/// Parses every entry of a .authinfo/.netrc file. The format is a flat
/// token stream; `machine` starts a new entry.
fn parse_authinfo(contents: &str) -> Vec<AuthInfo> {
    let mut entries = Vec::new();
    let mut current: Option<AuthInfo> = None;
    let mut tokens = contents.split_whitespace();

    while let Some(keyword) = tokens.next() {
        match keyword {
            "machine" => {
                if let Some(entry) = current.take() {
                    entries.push(entry);
                }
                current = Some(AuthInfo {
                    machine: tokens.next().unwrap_or_default().to_string(),
                    ..AuthInfo::default()
                });
            }
            "login" => {
                if let Some(entry) = current.as_mut() {
                    entry.login = tokens.next().unwrap_or_default().to_string();
                }
            }
            "password" => {
                if let Some(entry) = current.as_mut() {
                    entry.password = tokens.next().unwrap_or_default().to_string();
                }
            }
            _ => {}
        }
    }
    if let Some(entry) = current {
        entries.push(entry);
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authinfo_basic() {
        let content = "machine api.github.com login myuser^prweave password ghp_token123";
        let entry = find_matching_entry(content).unwrap();
        assert_eq!(entry.machine, "api.github.com");
        assert_eq!(entry.login, "myuser^prweave");
        assert_eq!(entry.password, "ghp_token123");
    }

    #[test]
    fn test_parse_authinfo_multiple_entries() {
        let content = r#"
            machine example.com login user1 password pass1
            machine api.github.com login myuser^prweave password ghp_token123
            machine other.com login user2 password pass2
        "#;
        let entry = find_matching_entry(content).unwrap();
        assert_eq!(entry.password, "ghp_token123");
    }

    #[test]
    fn test_parse_authinfo_no_prweave_suffix() {
        let content = "machine api.github.com login myuser password ghp_token123";
        assert!(find_matching_entry(content).is_none());
    }

    #[test]
    fn test_parse_authinfo_wrong_machine() {
        let content = "machine github.com login myuser^prweave password ghp_token123";
        assert!(find_matching_entry(content).is_none());
    }

    #[test]
    fn test_parse_authinfo_multiline() {
        let content = "machine api.github.com\nlogin myuser^prweave\npassword ghp_token123\n";
        let entry = find_matching_entry(content).unwrap();
        assert_eq!(entry.login, "myuser^prweave");
    }
}
