pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::FetchError;

pub use http_fetcher::HttpFetcher;

#[async_trait]
pub trait Fetcher {
    /// GET `url` and return the response body of a successful response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
