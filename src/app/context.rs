use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::delivery::DeliveryClient;
use crate::domain::Platform;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::normalizer::Normalizer;
use crate::orchestrator::Orchestrator;
use crate::render::{ChromeRenderer, RenderedPageAdapter};
use crate::source::{FeedAdapter, SourceAdapter};

/// Wires configuration into adapters, normalizer and delivery client.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub normalizer: Normalizer,
    pub delivery: DeliveryClient,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(
            &config.feed.user_agent,
            config.feed.timeout(),
        )?);
        let delivery = DeliveryClient::new(&config.delivery)?;

        Ok(Self {
            config,
            fetcher,
            normalizer: Normalizer::new(),
            delivery,
        })
    }

    /// Build the source adapter for a platform.
    ///
    /// The browser behind the storefront adapter is only launched on its
    /// first fetch.
    pub fn adapter(&self, platform: Platform) -> Result<Arc<dyn SourceAdapter>> {
        let adapter: Arc<dyn SourceAdapter> = match platform {
            Platform::Apple => Arc::new(FeedAdapter::new(
                self.config.feed.clone(),
                self.config.limits,
                self.fetcher.clone(),
            )),
            Platform::Google => Arc::new(RenderedPageAdapter::new(
                &self.config.render,
                self.config.limits,
                Arc::new(ChromeRenderer::new(self.config.render.clone())),
            )?),
        };
        Ok(adapter)
    }

    pub fn adapters(&self, platforms: &[Platform]) -> Result<Vec<Arc<dyn SourceAdapter>>> {
        platforms.iter().map(|p| self.adapter(*p)).collect()
    }

    pub fn orchestrator(&self, dry_run: bool) -> Orchestrator {
        let delivery = (!dry_run).then(|| self.delivery.clone());
        Orchestrator::new(
            self.normalizer.clone(),
            delivery,
            self.config.limits,
            &self.config.pipeline,
        )
    }
}
