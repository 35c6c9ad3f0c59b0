use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which repositories get a status refresh (and therefore a network fetch) automatically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    #[default]
    All,
    OnDemand,
    Favorites,
}

impl FetchMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            FetchMode::All => "All repos",
            FetchMode::OnDemand => "On-demand",
            FetchMode::Favorites => "Favorites only",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FetchMode::All => "Fetch every repository after each scan",
            FetchMode::OnDemand => "Only fetch the selected repository on refresh",
            FetchMode::Favorites => "Fetch favorites (plus the selection) on refresh",
        }
    }

    pub fn all() -> &'static [FetchMode] {
        &[FetchMode::All, FetchMode::OnDemand, FetchMode::Favorites]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Root directory whose immediate children are scanned for repositories.
    #[serde(default)]
    pub git_dir: String,
    #[serde(default)]
    pub fetch_mode: FetchMode,
    #[serde(default = "default_true")]
    pub show_pull_results: bool,
    /// Upper bound on commits listed per repository after a pull. Unset means all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_commits_per_repo: Option<usize>,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_tick_rate() -> u64 {
    250
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            git_dir: String::new(),
            fetch_mode: FetchMode::default(),
            show_pull_results: default_true(),
            max_commits_per_repo: None,
            log_level: LogLevel::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        Self::ensure_config_dir()?;
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".githerd");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("githerd.log"))
    }

    pub fn ensure_config_dir() -> Result<PathBuf> {
        let dir = Self::config_dir()?;
        if !dir.exists() {
            std::fs::create_dir_all(&dir).context("Failed to create config directory")?;
        }
        Ok(dir)
    }

    /// Root directory to scan: command line, then `GITHERD_GIT_DIR`, then config, then `~/git`.
    pub fn resolve_git_dir(&self, cli_arg: Option<&str>) -> String {
        let env_dir = std::env::var("GITHERD_GIT_DIR").ok();
        let chosen = cli_arg
            .map(String::from)
            .or(env_dir)
            .filter(|d| !d.trim().is_empty())
            .or_else(|| Some(self.git_dir.clone()).filter(|d| !d.trim().is_empty()));

        match chosen {
            Some(dir) => expand_home(&dir),
            None => dirs::home_dir()
                .map(|h| h.join("git").to_string_lossy().to_string())
                .unwrap_or_else(|| "git".to_string()),
        }
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.show_pull_results);
        assert_eq!(config.max_commits_per_repo, None);
        assert_eq!(config.ui.tick_rate_ms, 250);
    }

    #[test]
    fn test_parse_fields() {
        let config: Config = toml::from_str(
            r#"
git_dir = "/src"
fetch_mode = "on-demand"
show_pull_results = false
max_commits_per_repo = 10
log_level = "debug"

[ui]
tick_rate_ms = 100
"#,
        )
        .unwrap();
        assert_eq!(config.git_dir, "/src");
        assert_eq!(config.fetch_mode, FetchMode::OnDemand);
        assert!(!config.show_pull_results);
        assert_eq!(config.max_commits_per_repo, Some(10));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let config = Config {
            git_dir: "/work".to_string(),
            fetch_mode: FetchMode::Favorites,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "fetch_mode = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_cli_dir_wins() {
        let config = Config {
            git_dir: "/from/config".to_string(),
            ..Config::default()
        };
        assert_eq!(config.resolve_git_dir(Some("/from/cli")), "/from/cli");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), "/abs/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home("~/git"),
                home.join("git").to_string_lossy().to_string()
            );
        }
    }
}
