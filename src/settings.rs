use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_github_host")]
    pub github_host: String,
    /// Login to treat as the current user for the commit-regrouping pass.
    /// When unset, the authenticated viewer reported by the API is used.
    #[serde(default)]
    pub current_login: Option<String>,
    #[serde(default = "default_true")]
    pub resolve_avatars: bool,
    /// Backfill missing commit-author emails from user profiles.
    #[serde(default = "default_true")]
    pub backfill_emails: bool,
}

fn default_github_host() -> String {
    "api.github.com".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_host: default_github_host(),
            current_login: None,
            resolve_avatars: true,
            backfill_emails: true,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let settings = Self::default();
            settings.save()?;
            return Ok(settings);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read settings file")?;
        let settings: Self = toml::from_str(&content).context("Failed to parse settings file")?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(&config_path, content).context("Failed to write settings file")?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".config")
        } else {
            PathBuf::from(".")
        };

        Ok(config_dir.join("prweave").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.github_host, "api.github.com");
        assert_eq!(settings.current_login, None);
        assert!(settings.resolve_avatars);
        assert!(settings.backfill_emails);
    }

    #[test]
    fn test_round_trip() {
        let settings = Settings {
            github_host: "github.example.com".to_string(),
            current_login: Some("octocat".to_string()),
            resolve_avatars: false,
            backfill_emails: false,
        };
        let serialized = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.github_host, "github.example.com");
        assert_eq!(parsed.current_login.as_deref(), Some("octocat"));
        assert!(!parsed.resolve_avatars);
    }

    #[test]
    fn test_save_and_load_under_custom_config_home() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", dir.path());

        let settings = Settings {
            current_login: Some("octocat".to_string()),
            ..Settings::default()
        };
        settings.save().unwrap();

        let loaded = Settings::load().unwrap();
        assert_eq!(loaded.current_login.as_deref(), Some("octocat"));

        std::env::remove_var("XDG_CONFIG_HOME");
    }
}
