use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL; every endpoint path is joined onto it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File holding the token, role and expiry between runs
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./data/session.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;

        check_base_url(&config.api.base_url)?;
        if config.api.timeout_seconds == 0 {
            anyhow::bail!("api.timeout_seconds must be greater than zero");
        }

        Ok(config)
    }

    /// Replace the base URL (from `--api-url`), with the same check `parse` applies.
    pub fn override_base_url(&mut self, base_url: &str) -> Result<()> {
        check_base_url(base_url)?;
        self.api.base_url = base_url.to_string();
        Ok(())
    }

    pub fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn check_base_url(base_url: &str) -> Result<()> {
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        anyhow::bail!(
            "api.base_url must start with http:// or https:// (got '{}')",
            base_url
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.session.path, PathBuf::from("./data/session.json"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://library.example.edu/api"

            [session]
            path = "/tmp/bookdesk/session.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://library.example.edu/api");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.session.path, PathBuf::from("/tmp/bookdesk/session.json"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::parse("[api]\nbase_url = \"localhost:5000\"").is_err());
        assert!(Config::parse("[api]\ntimeout_seconds = 0").is_err());
        assert!(Config::parse("[api\n").is_err());
    }

    #[test]
    fn test_base_url_override_is_checked() {
        let mut config = Config::default();
        let err = config.override_base_url("ftp://books.local/api").unwrap_err();
        assert!(err.to_string().contains("must start with http:// or https://"));
        assert_eq!(config.api.base_url, "http://localhost:5000/api");

        config.override_base_url("https://books.local/api").unwrap();
        assert_eq!(config.api.base_url, "https://books.local/api");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("bookdesk.toml")).unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
    }
}
