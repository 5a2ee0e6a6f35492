use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ExtractionError, FetchError};
use crate::domain::{Category, CategoryLimits, Platform, RawEntry};
use crate::fetcher::Fetcher;
use crate::normalizer::clean_title;
use crate::source::SourceAdapter;

/// Title used when an entry has a name object without a label.
pub const UNKNOWN_TITLE: &str = "unknown";

/// Configuration for the ranking feed source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed URL with `{limit}` and `{genre}` placeholders
    pub url_template: String,

    /// User agent sent with feed requests
    pub user_agent: String,

    /// Request timeout in seconds (default: 20)
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url_template: "https://itunes.apple.com/kr/rss/topfreeapplications/limit={limit}{genre}/json"
                .to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 20,
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Expand the URL template for a category and request size.
    pub fn feed_url(&self, category: Category, limit: usize) -> String {
        let genre = category
            .feed_genre()
            .map(|code| format!("/genre={}", code))
            .unwrap_or_default();
        self.url_template
            .replace("{limit}", &limit.to_string())
            .replace("{genre}", &genre)
    }
}

#[derive(Deserialize)]
struct FeedDocument {
    #[serde(default)]
    feed: Option<FeedBody>,
}

#[derive(Deserialize)]
struct FeedBody {
    #[serde(default)]
    entry: Option<OneOrMany>,
}

/// The feed collapses a one-entry list into a bare object.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<serde_json::Value>),
    One(serde_json::Value),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<serde_json::Value> {
        match self {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

#[derive(Deserialize)]
struct FeedEntry {
    #[serde(rename = "im:name")]
    name: Option<Label>,
    #[serde(rename = "im:artist")]
    artist: Option<Label>,
    #[serde(rename = "im:image")]
    images: Option<Vec<Label>>,
    link: Option<LinkField>,
}

#[derive(Deserialize)]
struct Label {
    label: Option<String>,
}

/// An entry's `link` is either one link object or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LinkField {
    // Multi first: a derived struct also accepts a JSON array.
    Multi(Vec<FeedLink>),
    Single(FeedLink),
}

#[derive(Debug, Deserialize)]
pub struct FeedLink {
    #[serde(default)]
    attributes: LinkAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct LinkAttributes {
    href: Option<String>,
}

impl LinkField {
    /// The canonical link: the only link, or the first of several.
    pub fn into_href(self) -> Option<String> {
        let link = match self {
            LinkField::Single(link) => link,
            LinkField::Multi(links) => links.into_iter().next()?,
        };
        link.attributes.href.filter(|href| !href.trim().is_empty())
    }
}

fn decode(text: &str) -> String {
    decode_html_entities(text).to_string()
}

/// Turn one feed entry into a [`RawEntry`].
fn extract_entry(
    value: serde_json::Value,
    source_rank: usize,
    category: Category,
) -> Result<RawEntry, ExtractionError> {
    let entry: FeedEntry =
        serde_json::from_value(value).map_err(|e| ExtractionError::Malformed(e.to_string()))?;

    let name = entry.name.ok_or(ExtractionError::MissingField("im:name"))?;
    let title = clean_title(&decode(name.label.as_deref().unwrap_or(UNKNOWN_TITLE)));
    if title.is_empty() {
        return Err(ExtractionError::EmptyTitle);
    }

    let publisher = entry
        .artist
        .and_then(|artist| artist.label)
        .map(|label| decode(&label))
        .unwrap_or_else(|| Platform::Apple.default_publisher().to_string());

    // Images are listed smallest first.
    let icon_url = entry
        .images
        .and_then(|images| images.into_iter().last())
        .and_then(|image| image.label)
        .unwrap_or_default();

    let link = entry
        .link
        .and_then(LinkField::into_href)
        .ok_or(ExtractionError::MissingField("link"))?;

    Ok(RawEntry {
        source_rank,
        title,
        publisher: Some(publisher),
        icon_url,
        link,
        category,
    })
}

/// Parse a feed response and keep up to `limit` well-formed entries.
pub fn parse_feed(
    body: &[u8],
    category: Category,
    limit: usize,
) -> Result<Vec<RawEntry>, FetchError> {
    let document: FeedDocument = serde_json::from_slice(body)
        .map_err(|e| FetchError::UnexpectedShape(format!("feed is not valid JSON: {}", e)))?;

    let values = document
        .feed
        .and_then(|feed| feed.entry)
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    let mut entries = Vec::with_capacity(limit.min(values.len()));
    for (index, value) in values.into_iter().enumerate() {
        if entries.len() >= limit {
            break;
        }
        match extract_entry(value, entries.len() + 1, category) {
            Ok(entry) => entries.push(entry),
            Err(e) => debug!("Skipping feed entry {} in {}: {}", index, category, e),
        }
    }

    Ok(entries)
}

/// Ranking feed source with over-fetch.
pub struct FeedAdapter {
    config: FeedConfig,
    limits: CategoryLimits,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl FeedAdapter {
    pub fn new(
        config: FeedConfig,
        limits: CategoryLimits,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Self {
        Self {
            config,
            limits,
            fetcher,
        }
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    fn platform(&self) -> Platform {
        Platform::Apple
    }

    async fn fetch(&self, category: Category) -> Result<Vec<RawEntry>, FetchError> {
        let url = self
            .config
            .feed_url(category, self.limits.feed_request_size(category));
        debug!("Fetching feed {}", url);

        let body = self.fetcher.fetch(&url).await?;
        let entries = parse_feed(&body, category, self.limits.limit_for(category))?;

        info!("[{}] {}: {} entries from feed", Platform::Apple, category, entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    use crate::fetcher::HttpFetcher;

    struct StaticFetcher {
        body: Vec<u8>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn new(body: serde_json::Value) -> Self {
            Self {
                body: body.to_string().into_bytes(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(self.body.clone())
        }
    }

    fn entry(name: Option<&str>, id: u32) -> serde_json::Value {
        let mut value = json!({
            "im:artist": { "label": format!("Artist {}", id) },
            "im:image": [
                { "label": format!("https://cdn.example.com/{}/53x53.png", id) },
                { "label": format!("https://cdn.example.com/{}/100x100.png", id) }
            ],
            "link": { "attributes": { "rel": "alternate", "href": format!("https://apps.apple.com/kr/app/app/id{}", id) } }
        });
        if let Some(name) = name {
            value["im:name"] = json!({ "label": name });
        }
        value
    }

    fn feed(entries: Vec<serde_json::Value>) -> serde_json::Value {
        json!({ "feed": { "entry": entries } })
    }

    fn small_limits() -> CategoryLimits {
        CategoryLimits {
            all: 5,
            category: 3,
            overfetch_margin: 20,
        }
    }

    #[test]
    fn test_feed_url_with_and_without_genre() {
        let config = FeedConfig::default();
        assert_eq!(
            config.feed_url(Category::All, 70),
            "https://itunes.apple.com/kr/rss/topfreeapplications/limit=70/json"
        );
        assert_eq!(
            config.feed_url(Category::Games, 45),
            "https://itunes.apple.com/kr/rss/topfreeapplications/limit=45/genre=6014/json"
        );
    }

    #[test]
    fn test_link_field_single_and_multi() {
        let single: LinkField =
            serde_json::from_value(json!({ "attributes": { "href": "https://a.example/id1" } }))
                .unwrap();
        assert_eq!(single.into_href().as_deref(), Some("https://a.example/id1"));

        let multi: LinkField = serde_json::from_value(json!([
            { "attributes": { "href": "https://a.example/id1" } },
            { "attributes": { "href": "https://a.example/preview.m4v" } }
        ]))
        .unwrap();
        assert_eq!(multi.into_href().as_deref(), Some("https://a.example/id1"));

        let empty: LinkField = serde_json::from_value(json!([])).unwrap();
        assert_eq!(empty.into_href(), None);
    }

    #[test]
    fn test_extract_entry_picks_largest_icon() {
        let raw = extract_entry(entry(Some("Maps"), 7), 1, Category::All).unwrap();
        assert_eq!(raw.title, "Maps");
        assert_eq!(raw.publisher.as_deref(), Some("Artist 7"));
        assert_eq!(raw.icon_url, "https://cdn.example.com/7/100x100.png");
        assert_eq!(raw.link, "https://apps.apple.com/kr/app/app/id7");
    }

    #[test]
    fn test_extract_entry_fallbacks() {
        let value = json!({
            "im:name": {},
            "link": [{ "attributes": { "href": "https://apps.apple.com/kr/app/x/id9" } }]
        });
        let raw = extract_entry(value, 1, Category::All).unwrap();
        assert_eq!(raw.title, UNKNOWN_TITLE);
        assert_eq!(raw.publisher.as_deref(), Some("Apple App Store"));
        assert_eq!(raw.icon_url, "");
    }

    #[test]
    fn test_extract_entry_missing_name_or_link() {
        assert_eq!(
            extract_entry(entry(None, 1), 1, Category::All),
            Err(ExtractionError::MissingField("im:name"))
        );
        let no_link = json!({ "im:name": { "label": "App" } });
        assert_eq!(
            extract_entry(no_link, 1, Category::All),
            Err(ExtractionError::MissingField("link"))
        );
    }

    #[test]
    fn test_extract_entry_cleans_and_decodes_title() {
        let raw = extract_entry(entry(Some("Tom &amp; Jerry 4.5star"), 3), 1, Category::All).unwrap();
        assert_eq!(raw.title, "Tom & Jerry");
    }

    #[test]
    fn test_parse_feed_single_entry_object() {
        let body = json!({ "feed": { "entry": entry(Some("Solo"), 1) } }).to_string();
        let entries = parse_feed(body.as_bytes(), Category::All, 5).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Solo");
    }

    #[test]
    fn test_parse_feed_without_entries_is_empty() {
        let entries = parse_feed(br#"{"feed":{"author":{}}}"#, Category::All, 5).unwrap();
        assert!(entries.is_empty());
        let entries = parse_feed(b"{}", Category::All, 5).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_non_json() {
        let err = parse_feed(b"<html>", Category::All, 5).unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedShape(_)));
    }

    #[tokio::test]
    async fn test_fetch_skips_malformed_and_fills_to_limit() {
        let fetcher = Arc::new(StaticFetcher::new(feed(vec![
            entry(Some("One"), 1),
            entry(None, 2),
            entry(Some("Three"), 3),
            entry(None, 4),
            entry(Some("Five"), 5),
        ])));
        let adapter = FeedAdapter::new(FeedConfig::default(), small_limits(), fetcher.clone());

        let entries = adapter.fetch(Category::Games).await.unwrap();

        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Three", "Five"]);
        let ranks: Vec<_> = entries.iter().map(|e| e.source_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(entries.iter().all(|e| e.category == Category::Games));

        let requested = fetcher.requested.lock().unwrap();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].contains("limit=23/genre=6014"));
    }

    #[tokio::test]
    async fn test_fetch_stops_at_limit() {
        let entries = (1..=10).map(|i| entry(Some("App"), i)).collect();
        let fetcher = Arc::new(StaticFetcher::new(feed(entries)));
        let adapter = FeedAdapter::new(FeedConfig::default(), small_limits(), fetcher);

        let all = adapter.fetch(Category::All).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_returns_fewer_when_supply_exhausted() {
        let fetcher = Arc::new(StaticFetcher::new(feed(vec![
            entry(None, 1),
            entry(Some("Only"), 2),
        ])));
        let adapter = FeedAdapter::new(FeedConfig::default(), small_limits(), fetcher);

        let entries = adapter.fetch(Category::Finance).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/kr/limit=23/genre=6005/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(feed(vec![entry(Some("Chat"), 1)]).to_string())
            .create_async()
            .await;

        let config = FeedConfig {
            url_template: format!("{}/kr/limit={{limit}}{{genre}}/json", server.url()),
            ..FeedConfig::default()
        };
        let fetcher = Arc::new(HttpFetcher::new(&config.user_agent, config.timeout()).unwrap());
        let adapter = FeedAdapter::new(config, small_limits(), fetcher);

        let entries = adapter.fetch(Category::Social).await.unwrap();
        assert_eq!(entries.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_propagates_request_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let config = FeedConfig {
            url_template: format!("{}/limit={{limit}}{{genre}}/json", server.url()),
            ..FeedConfig::default()
        };
        let fetcher = Arc::new(HttpFetcher::new(&config.user_agent, config.timeout()).unwrap());
        let adapter = FeedAdapter::new(config, small_limits(), fetcher);

        tokio_test::assert_err!(adapter.fetch(Category::All).await);
    }
}
