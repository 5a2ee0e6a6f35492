//! Configuration management for rankscout.
//!
//! Configuration is read from `~/.config/rankscout/config.toml` (or the path
//! given with `--config`). If the file doesn't exist, a default configuration
//! with comments is created.

use crate::delivery::DeliveryConfig;
use crate::domain::CategoryLimits;
use crate::orchestrator::PipelineConfig;
use crate::render::RenderConfig;
use crate::source::FeedConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding `delivery.secret_key`.
pub const SECRET_KEY_ENV: &str = "RANKSCOUT_SECRET_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub delivery: DeliveryConfig,
    pub limits: CategoryLimits,
    pub feed: FeedConfig,
    pub render: RenderConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        let config = if config_path.exists() {
            Self::read(&config_path)?
        } else {
            Self::create_default_config(&config_path)?;
            Self::default()
        };

        Ok(config.with_secret_override(std::env::var(SECRET_KEY_ENV).ok()))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Replace the delivery secret when a non-empty override is given.
    pub fn with_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.trim().is_empty()) {
            self.delivery.secret_key = secret;
        }
        self
    }

    /// Get the default config file path: `~/.config/rankscout/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("rankscout").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# rankscout configuration
#
# Every key is optional; missing keys fall back to the values shown here.

[delivery]
# Ingestion endpoint receiving one POST per platform
endpoint = "http://localhost:3000/api/ranking"

# Shared secret sent as "secretKey". Prefer setting RANKSCOUT_SECRET_KEY.
secret_key = ""

# Request timeout in seconds
timeout_secs = 30

[limits]
# Cap for the aggregate "all apps" category
all = 50

# Cap for every other category
category = 25

# Extra entries requested from the feed to cover malformed ones
overfetch_margin = 20

[feed]
# {limit} is the requested entry count, {genre} expands to "/genre=<code>" or ""
url_template = "https://itunes.apple.com/kr/rss/topfreeapplications/limit={limit}{genre}/json"
user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
timeout_secs = 20

[render]
# Run browser in headless mode (no visible window)
headless = true

# Upper bound for rendering one category page, in seconds
timeout_secs = 90

# Storefront host
base_url = "https://play.google.com"

# Pacing (milliseconds)
initial_settle_ms = 3000
zoom_settle_ms = 1000
scroll_settle_min_ms = 1500
scroll_settle_max_ms = 2500

# Display scale applied before scrolling, in percent
zoom_percent = 50

# Scroll-to-bottom rounds per page
scroll_rounds = 8

# Item anchors are links whose href contains this
anchor_pattern = "/store/apps/details?id="

# Title selectors tried inside the enclosing container (most specific first)
title_selectors = [".Epkrse", ".IbE0S", ".ubGTjb"]

# Image attributes holding the icon URL, in priority order
icon_attributes = ["src", "data-src"]

# Enclosing divs searched for fallback fields, innermost first (1 = the item's own tile)
container_depth = 1

window_width = 1920
window_height = 1080
user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"

[pipeline]
# Categories fetched at once per platform (1 = one after another)
category_concurrency = 1
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_content_matches_defaults() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[limits]
category = 10

[render]
scroll_rounds = 2
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        // Custom values
        assert_eq!(config.limits.category, 10);
        assert_eq!(config.render.scroll_rounds, 2);
        // Default values
        assert_eq!(config.limits.all, 50);
        assert_eq!(config.render.zoom_percent, 50);
        assert_eq!(config.delivery, DeliveryConfig::default());
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();

        assert!(path.exists());
        assert_eq!(config.limits, CategoryLimits::default());
    }

    #[test]
    fn test_load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[delivery]\nendpoint = \"https://ingest.example.com/api/ranking\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.delivery.endpoint, "https://ingest.example.com/api/ranking");
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[limits\nall = ").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_secret_override() {
        let config = Config::default().with_secret_override(Some("s3cret".into()));
        assert_eq!(config.delivery.secret_key, "s3cret");

        let config = config.with_secret_override(Some("  ".into()));
        assert_eq!(config.delivery.secret_key, "s3cret");

        let config = config.with_secret_override(None);
        assert_eq!(config.delivery.secret_key, "s3cret");
    }
}
