//! Ranking sources.
//!
//! Each platform has one [`SourceAdapter`]. Adapters return entries in
//! source order, already capped at the category limit; the
//! [`Normalizer`](crate::normalizer::Normalizer) makes the final pass.

pub mod feed;

pub use feed::{FeedAdapter, FeedConfig};

use async_trait::async_trait;

use crate::app::FetchError;
use crate::domain::{Category, Platform, RawEntry};

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch one category's entries, ordered by source rank.
    async fn fetch(&self, category: Category) -> Result<Vec<RawEntry>, FetchError>;

    /// Release long-lived resources once the platform is done.
    async fn shutdown(&self) {}
}
