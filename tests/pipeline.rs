use std::sync::Arc;

use async_trait::async_trait;
use mockito::{Matcher, Server};
use serde_json::json;

use rankscout::app::FetchError;
use rankscout::delivery::{DeliveryClient, DeliveryConfig, DeliveryOutcome};
use rankscout::domain::{Category, CategoryLimits, Platform, RawEntry};
use rankscout::fetcher::HttpFetcher;
use rankscout::normalizer::Normalizer;
use rankscout::orchestrator::{CategoryStatus, Orchestrator, PipelineConfig};
use rankscout::render::{PageRenderer, RenderConfig, RenderPlan, RenderedPageAdapter};
use rankscout::source::{FeedAdapter, FeedConfig, SourceAdapter};

/// First category fails, everything else succeeds.
struct FlakyAdapter;

#[async_trait]
impl SourceAdapter for FlakyAdapter {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    async fn fetch(&self, category: Category) -> Result<Vec<RawEntry>, FetchError> {
        if category == Category::All {
            return Err(FetchError::Render("page crashed".into()));
        }
        Ok(vec![
            raw(1, "Chess 4.7star", "com.chess", category),
            raw(2, "Go", "com.go", category),
            raw(3, "Chess again", "com.chess", category),
        ])
    }
}

fn raw(rank: usize, title: &str, id: &str, category: Category) -> RawEntry {
    RawEntry {
        source_rank: rank,
        title: title.to_string(),
        publisher: None,
        icon_url: String::new(),
        link: format!("https://play.google.com/store/apps/details?id={}", id),
        category,
    }
}

struct StaticPage(String);

#[async_trait]
impl PageRenderer for StaticPage {
    async fn render(&self, _url: &str, _plan: &RenderPlan) -> Result<String, FetchError> {
        Ok(self.0.clone())
    }
}

fn delivery(server: &Server) -> DeliveryClient {
    DeliveryClient::new(&DeliveryConfig {
        endpoint: format!("{}/api/ranking", server.url()),
        secret_key: "pipeline-secret".into(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn failed_category_does_not_block_delivery_of_the_next() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/ranking")
        .match_body(Matcher::Json(json!({
            "secretKey": "pipeline-secret",
            "platform": "google",
            "items": [
                {
                    "rank": 1, "title": "Chess", "publisher": "Google Play", "iconUrl": "",
                    "link": "https://play.google.com/store/apps/details?id=com.chess", "category": "게임"
                },
                {
                    "rank": 2, "title": "Go", "publisher": "Google Play", "iconUrl": "",
                    "link": "https://play.google.com/store/apps/details?id=com.go", "category": "게임"
                }
            ]
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let orchestrator = Orchestrator::new(
        Normalizer::new(),
        Some(delivery(&server)),
        CategoryLimits::default(),
        &PipelineConfig::default(),
    )
    .with_categories(vec![Category::All, Category::Games]);

    let report = orchestrator.run_platform(&FlakyAdapter).await;

    assert!(matches!(
        report.categories[0].status,
        CategoryStatus::Failed { .. }
    ));
    assert_eq!(
        report.categories[1].status,
        CategoryStatus::Collected { count: 2 }
    );
    assert_eq!(report.delivery, DeliveryOutcome::Delivered { count: 2 });
    mock.assert_async().await;
}

#[tokio::test]
async fn both_platforms_collected_and_delivered() {
    let mut server = Server::new_async().await;

    let feed = json!({
        "feed": {
            "entry": [
                {
                    "im:name": { "label": "Maps" },
                    "im:artist": { "label": "Apple" },
                    "im:image": [{ "label": "https://i/s.png" }, { "label": "https://i/l.png" }],
                    "link": { "attributes": { "href": "https://apps.apple.com/kr/app/maps/id1" } }
                },
                {
                    "im:artist": { "label": "Nameless" },
                    "link": { "attributes": { "href": "https://apps.apple.com/kr/app/x/id2" } }
                },
                {
                    "im:name": { "label": "Notes" },
                    "link": [
                        { "attributes": { "href": "https://apps.apple.com/kr/app/notes/id3" } },
                        { "attributes": { "href": "https://apps.apple.com/kr/app/notes/id3/preview" } }
                    ]
                }
            ]
        }
    });
    let feed_mock = server
        .mock("GET", "/rss/limit=70/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(feed.to_string())
        .create_async()
        .await;

    let apple_delivery = server
        .mock("POST", "/api/ranking")
        .match_body(Matcher::PartialJson(json!({ "platform": "apple" })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let google_delivery = server
        .mock("POST", "/api/ranking")
        .match_body(Matcher::PartialJson(json!({ "platform": "google" })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let feed_config = FeedConfig {
        url_template: format!("{}/rss/limit={{limit}}{{genre}}/json", server.url()),
        ..FeedConfig::default()
    };
    let fetcher = Arc::new(HttpFetcher::new(&feed_config.user_agent, feed_config.timeout()).unwrap());
    let apple: Arc<dyn SourceAdapter> =
        Arc::new(FeedAdapter::new(feed_config, CategoryLimits::default(), fetcher));

    let page = r#"<html><body>
        <div><a href="/store/apps/details?id=com.one"><img src="https://i/1.png">One 4.1star</a></div>
        <div><a href="/store/apps/details?id=com.two"><img data-src="https://i/2.png"></a><span class="Epkrse">Two</span></div>
        <div><a href="/store/apps/details?id=com.one">One duplicate</a></div>
    </body></html>"#;
    let google: Arc<dyn SourceAdapter> = Arc::new(
        RenderedPageAdapter::new(
            &RenderConfig::default(),
            CategoryLimits::default(),
            Arc::new(StaticPage(page.to_string())),
        )
        .unwrap(),
    );

    let orchestrator = Orchestrator::new(
        Normalizer::new(),
        Some(delivery(&server)),
        CategoryLimits::default(),
        &PipelineConfig::default(),
    )
    .with_categories(vec![Category::All]);

    let summary = orchestrator.run(vec![apple, google]).await;

    let apple = &summary.platforms[0];
    assert_eq!(apple.platform, Platform::Apple);
    assert_eq!(apple.total(), 2);
    assert_eq!(apple.delivery, DeliveryOutcome::Delivered { count: 2 });

    let google = &summary.platforms[1];
    assert_eq!(google.platform, Platform::Google);
    assert_eq!(google.total(), 2);
    assert_eq!(google.delivery, DeliveryOutcome::Delivered { count: 2 });

    feed_mock.assert_async().await;
    apple_delivery.assert_async().await;
    google_delivery.assert_async().await;
}

#[tokio::test]
async fn delivery_failure_for_one_platform_leaves_the_other_intact() {
    let mut server = Server::new_async().await;
    let _apple_rejected = server
        .mock("POST", "/api/ranking")
        .match_body(Matcher::PartialJson(json!({ "platform": "apple" })))
        .with_status(500)
        .create_async()
        .await;
    let google_ok = server
        .mock("POST", "/api/ranking")
        .match_body(Matcher::PartialJson(json!({ "platform": "google" })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    struct Fixed(Platform);

    #[async_trait]
    impl SourceAdapter for Fixed {
        fn platform(&self) -> Platform {
            self.0
        }

        async fn fetch(&self, category: Category) -> Result<Vec<RawEntry>, FetchError> {
            Ok(vec![raw(1, "App", "com.app", category)])
        }
    }

    let orchestrator = Orchestrator::new(
        Normalizer::new(),
        Some(delivery(&server)),
        CategoryLimits::default(),
        &PipelineConfig::default(),
    )
    .with_categories(vec![Category::Games]);

    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(Fixed(Platform::Apple)),
        Arc::new(Fixed(Platform::Google)),
    ];
    let summary = orchestrator.run(adapters).await;

    assert!(summary.platforms[0].delivery.is_failure());
    assert_eq!(
        summary.platforms[1].delivery,
        DeliveryOutcome::Delivered { count: 1 }
    );
    google_ok.assert_async().await;
}
