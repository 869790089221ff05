//! Configuration file parser for ~/.config/cognos/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as a warning, since they are
//! usually typos.
use crate::api::DEFAULT_BASE_PATH;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides the API base URL from the config file.
pub const API_URL_ENV: &str = "COGNOS_API_URL";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API base URL or path. `COGNOS_API_URL` takes precedence.
    pub api_url: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Delay between a successful fetch-news and the follow-up article reload.
    pub refresh_reload_delay_ms: u64,

    /// Minimum relevance score passed to the article listing (0.0..=1.0).
    pub min_score: Option<f64>,

    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: 30,
            refresh_reload_delay_ms: 1000,
            min_score: None,
            log_level: "info".to_string(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "api_url",
        "request_timeout_secs",
        "refresh_reload_delay_ms",
        "min_score",
        "log_level",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Out-of-range values → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        tracing::info!(
            api_url = ?config.api_url,
            reload_delay_ms = config.refresh_reload_delay_ms,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(score) = self.min_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(ConfigError::Invalid(format!(
                    "min_score must be between 0.0 and 1.0, got {}",
                    score
                )));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective API location: `env_override`, then the file, then `/api`.
    ///
    /// Blank values are skipped.
    pub fn api_url_with(&self, env_override: Option<String>) -> String {
        env_override
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_url.clone().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string())
    }

    /// Effective API location, consulting `COGNOS_API_URL`.
    pub fn api_url(&self) -> String {
        self.api_url_with(std::env::var(API_URL_ENV).ok())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_reload_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_reload_delay_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_url.is_none());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.refresh_reload_delay_ms, 1000);
        assert!(config.min_score.is_none());
        assert_eq!(config.log_level, "info");
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/cognos_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.refresh_reload_delay_ms, 1000);
    }

    #[test]
    fn test_whitespace_only_returns_default() {
        let config = Config::parse("   \n  \n").unwrap();
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_full_config_from_file() {
        let dir = std::env::temp_dir().join("cognos_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
api_url = "http://news.local:9000/api"
request_timeout_secs = 5
refresh_reload_delay_ms = 250
min_score = 0.35
log_level = "debug"

[keybindings]
refresh_news = "F5"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://news.local:9000/api"));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.refresh_reload_delay(), Duration::from_millis(250));
        assert_eq!(config.min_score, Some(0.35));
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.keybindings.get("refresh_news").map(String::as_str),
            Some("F5")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("log_level = \"warn\"\ntotally_fake_key = 1\n").unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_min_score_out_of_range_rejected() {
        let err = Config::parse("min_score = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Config::parse("request_timeout_secs = 0\n").is_err());
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("cognos_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_api_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.api_url_with(None), "/api");

        config.api_url = Some("http://file.example/api".to_string());
        assert_eq!(config.api_url_with(None), "http://file.example/api");

        assert_eq!(
            config.api_url_with(Some("http://env.example/api".to_string())),
            "http://env.example/api"
        );

        // Blank env value does not mask the file value
        assert_eq!(
            config.api_url_with(Some("  ".to_string())),
            "http://file.example/api"
        );
    }
}
