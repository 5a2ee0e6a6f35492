use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::FetchError;
use crate::render::config::RenderConfig;
use crate::render::{PageRenderer, RenderPlan, SCROLL_SCRIPT};

/// Run `work` for at most `timeout`, reporting an overrun through `on_elapsed`.
async fn bounded<T, F>(
    timeout: Duration,
    work: F,
    on_elapsed: fn(Duration) -> FetchError,
) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(timeout, work)
        .await
        .unwrap_or_else(|_| Err(on_elapsed(timeout)))
}

/// A browser that never finishes starting is a broken session.
fn launch_overrun(timeout: Duration) -> FetchError {
    FetchError::Session(format!("Browser did not start within {:?}", timeout))
}

struct Session {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
}

/// Chrome-based renderer using chromiumoxide.
///
/// The browser is launched on first use and shared by every page of the run.
pub struct ChromeRenderer {
    config: RenderConfig,
    session: Mutex<Option<Session>>,
}

impl ChromeRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    async fn launch(&self) -> Result<Session, FetchError> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .window_size(self.config.window_width, self.config.window_height)
            .request_timeout(self.config.timeout());

        if !self.config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| FetchError::Session(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            FetchError::Session(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drive the CDP connection
            }
        });

        info!("Browser session started");
        Ok(Session {
            browser: Arc::new(browser),
            handler,
        })
    }

    async fn browser(&self) -> Result<Arc<Browser>, FetchError> {
        let mut session = self.session.lock().await;
        if session.is_none() {
            let launched = bounded(self.config.timeout(), self.launch(), launch_overrun).await?;
            *session = Some(launched);
        }
        session
            .as_ref()
            .map(|s| s.browser.clone())
            .ok_or_else(|| FetchError::Session("Browser session unavailable".to_string()))
    }

    async fn drive(&self, page: &Page, url: &str, plan: &RenderPlan) -> Result<String, FetchError> {
        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| FetchError::Render(format!("Failed to set user agent: {}", e)))?;
        }

        page.goto(url)
            .await
            .map_err(|e| FetchError::Render(format!("Navigation failed: {}", e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| FetchError::Render(format!("Navigation failed: {}", e)))?;

        tokio::time::sleep(plan.initial_settle).await;

        page.evaluate(plan.zoom_script())
            .await
            .map_err(|e| FetchError::Render(format!("Zoom script failed: {}", e)))?;
        tokio::time::sleep(plan.zoom_settle).await;

        for round in 0..plan.scroll_rounds {
            page.evaluate(SCROLL_SCRIPT)
                .await
                .map_err(|e| FetchError::Render(format!("Scroll {} failed: {}", round, e)))?;
            tokio::time::sleep(plan.scroll_settle()).await;
        }

        page.content()
            .await
            .map_err(|e| FetchError::Render(format!("Failed to read page content: {}", e)))
    }

    async fn render_page(&self, url: &str, plan: &RenderPlan) -> Result<String, FetchError> {
        let browser = self.browser().await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Render(format!("Failed to create page: {}", e)))?;

        // The page is closed on every path, including an overrun.
        let result = bounded(
            self.config.timeout(),
            self.drive(&page, url, plan),
            FetchError::Timeout,
        )
        .await;

        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }
        result
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str, plan: &RenderPlan) -> Result<String, FetchError> {
        self.render_page(url, plan).await
    }

    async fn close(&self) {
        let Some(session) = self.session.lock().await.take() else {
            return;
        };

        match Arc::try_unwrap(session.browser) {
            Ok(mut browser) => {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    debug!("Browser process did not exit cleanly: {}", e);
                }
            }
            Err(_) => warn!("Browser still in use at shutdown; dropping it"),
        }
        session.handler.abort();
        info!("Browser session closed");
    }
}
