use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Category-level failure while pulling a source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Render error: {0}")]
    Render(String),

    /// The rendering session itself could not be started. Aborts the platform.
    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl FetchError {
    /// True when retrying other categories of the same platform is pointless.
    pub fn is_session_failure(&self) -> bool {
        matches!(self, FetchError::Session(_))
    }
}

/// Item-level failure; the item is skipped.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Malformed entry: {0}")]
    Malformed(String),

    #[error("Link has no item identifier: {0}")]
    InvalidLink(String),

    #[error("Title is empty after cleaning")]
    EmptyTitle,

    #[error("Duplicate item: {0}")]
    Duplicate(String),
}

/// Failure submitting a platform's results.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Endpoint rejected delivery with status {status}")]
    Rejected { status: u16 },
}

#[derive(Error, Debug)]
pub enum RankscoutError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RankscoutError>;
