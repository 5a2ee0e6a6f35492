use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the rendered storefront source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Upper bound for rendering one category page in seconds (default: 90)
    pub timeout_secs: u64,

    /// Storefront host; category paths and item links are resolved against it
    pub base_url: String,

    /// Initial settle delay after navigation in milliseconds (default: 3000)
    pub initial_settle_ms: u64,

    /// Display scale applied to the page body, in percent (default: 50)
    pub zoom_percent: u32,

    /// Settle delay after applying the zoom in milliseconds (default: 1000)
    pub zoom_settle_ms: u64,

    /// Number of scroll-to-bottom rounds (default: 8)
    pub scroll_rounds: u32,

    /// Randomized settle delay after each scroll, lower bound in milliseconds
    pub scroll_settle_min_ms: u64,

    /// Randomized settle delay after each scroll, upper bound in milliseconds
    pub scroll_settle_max_ms: u64,

    /// Substring an anchor's href must contain to be an item link
    pub anchor_pattern: String,

    /// Title selectors tried inside the enclosing container, most specific first
    pub title_selectors: Vec<String>,

    /// Image attributes holding the icon URL, in priority order
    pub icon_attributes: Vec<String>,

    /// How many enclosing `div`s to search for fallback fields, innermost first (default: 1)
    pub container_depth: usize,

    /// Browser window size
    pub window_width: u32,
    pub window_height: u32,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 90,
            base_url: "https://play.google.com".to_string(),
            initial_settle_ms: 3000,
            zoom_percent: 50,
            zoom_settle_ms: 1000,
            scroll_rounds: 8,
            scroll_settle_min_ms: 1500,
            scroll_settle_max_ms: 2500,
            anchor_pattern: "/store/apps/details?id=".to_string(),
            title_selectors: vec![
                ".Epkrse".to_string(),
                ".IbE0S".to_string(),
                ".ubGTjb".to_string(),
            ],
            icon_attributes: vec!["src".to_string(), "data-src".to_string()],
            container_depth: 1,
            window_width: 1920,
            window_height: 1080,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl RenderConfig {
    /// Get the render timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_ms)
    }

    pub fn zoom_settle(&self) -> Duration {
        Duration::from_millis(self.zoom_settle_ms)
    }
}
