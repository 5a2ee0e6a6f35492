//! Submission of ranked entries to the ingestion endpoint.
//!
//! One POST per platform carries every category's entries. Delivery is
//! fire-and-forget: failures are logged and reported, never propagated, and
//! never retried.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::DeliveryError;
use crate::domain::{Entry, Platform};

/// Configuration for the ingestion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Ingestion endpoint URL
    pub endpoint: String,

    /// Pre-shared secret sent in the request body
    pub secret_key: String,

    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/ranking".to_string(),
            secret_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    secret_key: &'a str,
    platform: Platform,
    items: &'a [Entry],
}

/// What happened to one platform's submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Nothing to send; no request was made
    Skipped,
    Delivered { count: usize },
    Failed { reason: String },
    /// Run without delivery
    DryRun { count: usize },
}

impl DeliveryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeliveryOutcome::Failed { .. })
    }
}

#[derive(Clone)]
pub struct DeliveryClient {
    client: Client,
    endpoint: String,
    secret_key: String,
}

impl DeliveryClient {
    pub fn new(config: &DeliveryConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        if config.secret_key.is_empty() {
            warn!("Delivery secret key is empty; the endpoint will likely reject submissions");
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one platform's entries.
    pub async fn post(&self, platform: Platform, items: &[Entry]) -> Result<(), DeliveryError> {
        let payload = Payload {
            secret_key: &self.secret_key,
            platform,
            items,
        };

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Submit one platform's entries, logging and swallowing any failure.
    pub async fn submit(&self, platform: Platform, items: &[Entry]) -> DeliveryOutcome {
        if items.is_empty() {
            info!("[{}] Nothing to deliver", platform);
            return DeliveryOutcome::Skipped;
        }

        match self.post(platform, items).await {
            Ok(()) => {
                info!("[{}] Delivered {} entries", platform, items.len());
                DeliveryOutcome::Delivered { count: items.len() }
            }
            Err(e) => {
                warn!("[{}] Delivery failed: {}", platform, e);
                DeliveryOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
