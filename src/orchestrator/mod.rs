//! Per-platform pipeline: fetch every category, normalize, deliver.
//!
//! Failures are contained at the narrowest scope: a bad item is dropped by
//! the adapter or normalizer, a failed category is recorded and skipped, a
//! broken browser session ends only its own platform, and a failed delivery
//! is reported without touching the other platform.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::delivery::{DeliveryClient, DeliveryOutcome};
use crate::domain::{Category, CategoryLimits, Entry, Platform};
use crate::normalizer::Normalizer;
use crate::source::SourceAdapter;

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Categories fetched at once per platform (default: 1)
    pub category_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            category_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryStatus {
    Collected { count: usize },
    Failed { reason: String },
    /// Skipped because the platform was aborted first
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: Category,
    pub status: CategoryStatus,
}

/// Normalized entries of one platform, before delivery.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// All categories concatenated, each ranked from 1
    pub entries: Vec<Entry>,
    pub categories: Vec<CategoryReport>,
    /// Set when a session failure ended the platform early
    pub aborted: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlatformReport {
    pub platform: Platform,
    pub categories: Vec<CategoryReport>,
    pub aborted: Option<String>,
    pub delivery: DeliveryOutcome,
}

impl PlatformReport {
    pub fn total(&self) -> usize {
        self.categories
            .iter()
            .map(|c| match c.status {
                CategoryStatus::Collected { count } => count,
                _ => 0,
            })
            .sum()
    }

    fn crashed(platform: Platform, reason: String) -> Self {
        Self {
            platform,
            categories: Vec::new(),
            aborted: Some(reason),
            delivery: DeliveryOutcome::Skipped,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub platforms: Vec<PlatformReport>,
}

#[derive(Clone)]
pub struct Orchestrator {
    normalizer: Normalizer,
    /// `None` runs the pipeline without delivering
    delivery: Option<DeliveryClient>,
    limits: CategoryLimits,
    categories: Vec<Category>,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(
        normalizer: Normalizer,
        delivery: Option<DeliveryClient>,
        limits: CategoryLimits,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            normalizer,
            delivery,
            limits,
            categories: Category::ALL.to_vec(),
            concurrency: config.category_concurrency.max(1),
        }
    }

    /// Restrict the run to a subset of categories, kept in the given order.
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Fetch and normalize every category of one platform.
    ///
    /// Always calls [`SourceAdapter::shutdown`] before returning.
    pub async fn collect(&self, adapter: &dyn SourceAdapter) -> Collection {
        let platform = adapter.platform();
        let mut collection = Collection::default();

        let mut results = futures::stream::iter(self.categories.iter().copied())
            .map(|category| async move { (category, adapter.fetch(category).await) })
            .buffered(self.concurrency);

        while let Some((category, result)) = results.next().await {
            match result {
                Ok(raw) => {
                    let limit = self.limits.limit_for(category);
                    let entries = self.normalizer.process(platform, raw, limit);
                    info!("[{}] {}: {} entries collected", platform, category, entries.len());
                    collection.categories.push(CategoryReport {
                        category,
                        status: CategoryStatus::Collected {
                            count: entries.len(),
                        },
                    });
                    collection.entries.extend(entries);
                }
                Err(e) if e.is_session_failure() => {
                    error!("[{}] {}: aborting platform: {}", platform, category, e);
                    collection.categories.push(CategoryReport {
                        category,
                        status: CategoryStatus::Failed {
                            reason: e.to_string(),
                        },
                    });
                    collection.aborted = Some(e.to_string());
                    break;
                }
                Err(e) => {
                    warn!("[{}] {}: skipped: {}", platform, category, e);
                    collection.categories.push(CategoryReport {
                        category,
                        status: CategoryStatus::Failed {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }
        drop(results);

        for category in self.categories.iter().skip(collection.categories.len()) {
            collection.categories.push(CategoryReport {
                category: *category,
                status: CategoryStatus::NotAttempted,
            });
        }

        adapter.shutdown().await;
        collection
    }

    /// Collect one platform and deliver whatever was collected.
    pub async fn run_platform(&self, adapter: &dyn SourceAdapter) -> PlatformReport {
        let platform = adapter.platform();
        let collection = self.collect(adapter).await;

        let delivery = match &self.delivery {
            Some(client) => client.submit(platform, &collection.entries).await,
            None => DeliveryOutcome::DryRun {
                count: collection.entries.len(),
            },
        };

        PlatformReport {
            platform,
            categories: collection.categories,
            aborted: collection.aborted,
            delivery,
        }
    }

    /// Run every platform as an independent task.
    pub async fn run(&self, adapters: Vec<Arc<dyn SourceAdapter>>) -> RunSummary {
        let started_at = Utc::now();

        let mut handles = Vec::new();
        for adapter in adapters {
            let platform = adapter.platform();
            let orchestrator = self.clone();
            let handle =
                tokio::spawn(async move { orchestrator.run_platform(adapter.as_ref()).await });
            handles.push((platform, handle));
        }

        let mut platforms = Vec::new();
        for (platform, handle) in handles {
            match handle.await {
                Ok(report) => platforms.push(report),
                Err(e) => {
                    error!("[{}] Task join error: {}", platform, e);
                    platforms.push(PlatformReport::crashed(platform, e.to_string()));
                }
            }
        }

        RunSummary {
            started_at,
            finished_at: Utc::now(),
            platforms,
        }
    }
}
