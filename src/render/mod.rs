//! Rendered storefront source.
//!
//! The storefront listing pages only show their full item grid after
//! JavaScript runs and the page is scrolled, so this source drives a
//! headless browser and scrapes the resulting DOM.
//!
//! # Architecture
//!
//! ```text
//! Category → PageRenderer (zoom + scroll) → HTML → ExtractionRules → RawEntry
//! ```
//!
//! All markup assumptions (anchor pattern, selector fallbacks, icon
//! attributes) live in [`ExtractionRules`], so captured HTML can be checked
//! without a browser.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rankscout::render::{ChromeRenderer, RenderConfig, RenderedPageAdapter};
//!
//! let config = RenderConfig::default();
//! let renderer = Arc::new(ChromeRenderer::new(config.clone()));
//! let adapter = RenderedPageAdapter::new(&config, limits, renderer)?;
//!
//! let raw = adapter.fetch(Category::Games).await?;
//! adapter.shutdown().await;
//! ```

mod chrome;
mod config;
mod extractor;

pub use chrome::ChromeRenderer;
pub use config::RenderConfig;
pub use extractor::{ExtractionRules, TitleStrategy};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

use crate::app::FetchError;
use crate::config::ConfigError;
use crate::domain::{Category, CategoryLimits, Platform, RawEntry};
use crate::source::SourceAdapter;

/// Scrolls to the bottom of the currently loaded content.
pub const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Pacing and interaction steps for one listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub initial_settle: Duration,
    pub zoom_percent: u32,
    pub zoom_settle: Duration,
    pub scroll_rounds: u32,
    pub scroll_settle_min: Duration,
    pub scroll_settle_max: Duration,
}

impl RenderPlan {
    pub fn from_config(config: &RenderConfig) -> Self {
        let min = Duration::from_millis(config.scroll_settle_min_ms);
        let max = Duration::from_millis(config.scroll_settle_max_ms).max(min);
        Self {
            initial_settle: config.initial_settle(),
            zoom_percent: config.zoom_percent,
            zoom_settle: config.zoom_settle(),
            scroll_rounds: config.scroll_rounds,
            scroll_settle_min: min,
            scroll_settle_max: max,
        }
    }

    /// Shrinks the display scale so one viewport shows more of the grid.
    /// The window size is left alone.
    pub fn zoom_script(&self) -> String {
        format!("document.body.style.zoom = '{}%';", self.zoom_percent)
    }

    /// Randomized delay after a scroll, within the configured bounds.
    pub fn scroll_settle(&self) -> Duration {
        rand::rng().random_range(self.scroll_settle_min..=self.scroll_settle_max)
    }
}

/// Produces the rendered HTML of a page.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, plan: &RenderPlan) -> Result<String, FetchError>;

    /// Tear down the rendering session.
    async fn close(&self) {}
}

/// Storefront source backed by a [`PageRenderer`].
pub struct RenderedPageAdapter {
    rules: ExtractionRules,
    plan: RenderPlan,
    limits: CategoryLimits,
    renderer: Arc<dyn PageRenderer>,
}

impl RenderedPageAdapter {
    pub fn new(
        config: &RenderConfig,
        limits: CategoryLimits,
        renderer: Arc<dyn PageRenderer>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            rules: ExtractionRules::new(config)?,
            plan: RenderPlan::from_config(config),
            limits,
            renderer,
        })
    }

    pub fn category_url(&self, category: Category) -> Result<String, FetchError> {
        self.rules
            .base_url()
            .join(category.storefront_path())
            .map(String::from)
            .map_err(|e| FetchError::Render(format!("Bad category URL: {}", e)))
    }
}

#[async_trait]
impl SourceAdapter for RenderedPageAdapter {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    async fn fetch(&self, category: Category) -> Result<Vec<RawEntry>, FetchError> {
        let url = self.category_url(category)?;
        let html = self.renderer.render(&url, &self.plan).await?;
        let entries = self
            .rules
            .extract_entries(&html, category, self.limits.limit_for(category));

        info!("[{}] {}: {} entries from page", Platform::Google, category, entries.len());
        Ok(entries)
    }

    async fn shutdown(&self) {
        self.renderer.close().await;
    }
}
