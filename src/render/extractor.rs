use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::app::ExtractionError;
use crate::config::ConfigError;
use crate::domain::{Category, Identifier, RawEntry};
use crate::normalizer::clean_title;
use crate::render::RenderConfig;

/// One way of finding an item's title, tried in order.
#[derive(Debug, Clone)]
pub enum TitleStrategy {
    /// Visible text of the item anchor itself
    AnchorText,
    /// First element matching the selector inside an enclosing container
    ContainerSelector(Selector),
}

/// Markup assumptions about the storefront listing page.
///
/// Built once from [`RenderConfig`]; every field fallback is an ordered list
/// so the policy can be checked against captured HTML without a browser.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    base_url: Url,
    anchor_pattern: String,
    anchor_selector: Selector,
    image_selector: Selector,
    title_strategies: Vec<TitleStrategy>,
    icon_attributes: Vec<String>,
    container_depth: usize,
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::Invalid(format!("bad selector {:?}: {}", selector, e)))
}

/// Visible text of an element with text nodes trimmed and space-joined.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl ExtractionRules {
    pub fn new(config: &RenderConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::Invalid(format!("bad base_url {:?}: {}", config.base_url, e)))?;

        let mut title_strategies = vec![TitleStrategy::AnchorText];
        for selector in &config.title_selectors {
            title_strategies.push(TitleStrategy::ContainerSelector(parse_selector(selector)?));
        }

        Ok(Self {
            base_url,
            anchor_pattern: config.anchor_pattern.clone(),
            anchor_selector: parse_selector("a[href]")?,
            image_selector: parse_selector("img")?,
            title_strategies,
            icon_attributes: config.icon_attributes.clone(),
            container_depth: config.container_depth,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Nearest enclosing `div`s, innermost first.
    fn containers<'a>(&self, anchor: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        anchor
            .ancestors()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name() == "div")
            .take(self.container_depth)
            .collect()
    }

    /// Raw title text: the anchor's own text, else the first selector match
    /// in the innermost container that has one.
    ///
    /// Every selector is tried in a container before moving outward, so an
    /// item never borrows a title from a neighbouring tile.
    pub fn extract_title(&self, anchor: ElementRef<'_>) -> Option<String> {
        let from_anchor = self
            .title_strategies
            .iter()
            .any(|strategy| matches!(strategy, TitleStrategy::AnchorText))
            .then(|| element_text(anchor))
            .filter(|t| !t.is_empty());

        from_anchor.or_else(|| {
            self.containers(anchor).into_iter().find_map(|container| {
                self.title_strategies.iter().find_map(|strategy| match strategy {
                    TitleStrategy::AnchorText => None,
                    TitleStrategy::ContainerSelector(selector) => container
                        .select(selector)
                        .map(element_text)
                        .find(|t| !t.is_empty()),
                })
            })
        })
    }

    /// Icon URL from an image in the anchor, else in an enclosing container.
    pub fn extract_icon(&self, anchor: ElementRef<'_>) -> String {
        let image = anchor.select(&self.image_selector).next().or_else(|| {
            self.containers(anchor)
                .into_iter()
                .find_map(|container| container.select(&self.image_selector).next())
        });

        image
            .and_then(|img| {
                self.icon_attributes
                    .iter()
                    .filter_map(|attr| img.value().attr(attr))
                    .map(str::trim)
                    .find(|value| !value.is_empty())
            })
            .unwrap_or_default()
            .to_string()
    }

    /// Absolute item link for an anchor href.
    pub fn item_link(&self, href: &str) -> Result<String, ExtractionError> {
        self.base_url
            .join(href)
            .map(String::from)
            .map_err(|_| ExtractionError::InvalidLink(href.to_string()))
    }

    fn extract_item(
        &self,
        anchor: ElementRef<'_>,
        href: &str,
        seen: &HashSet<Identifier>,
    ) -> Result<(Identifier, String, String, String), ExtractionError> {
        let link = self.item_link(href)?;
        let id = Identifier::from_link(&link)?;
        if seen.contains(&id) {
            return Err(ExtractionError::Duplicate(id.to_string()));
        }

        let title = self
            .extract_title(anchor)
            .map(|t| clean_title(&t))
            .unwrap_or_default();
        if title.is_empty() {
            return Err(ExtractionError::EmptyTitle);
        }

        let icon_url = self.extract_icon(anchor);
        Ok((id, title, icon_url, link))
    }

    /// Extract up to `limit` entries from a rendered listing page, in
    /// document order.
    ///
    /// An identifier only counts as seen once its item was extracted, so a
    /// bare icon anchor does not shadow the titled anchor for the same item.
    pub fn extract_entries(&self, html: &str, category: Category, limit: usize) -> Vec<RawEntry> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for anchor in document.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.contains(&self.anchor_pattern) {
                continue;
            }
            if entries.len() >= limit {
                break;
            }

            match self.extract_item(anchor, href, &seen) {
                Ok((id, title, icon_url, link)) => {
                    seen.insert(id);
                    entries.push(RawEntry {
                        source_rank: entries.len() + 1,
                        title,
                        publisher: None,
                        icon_url,
                        link,
                        category,
                    });
                }
                Err(ExtractionError::Duplicate(_)) => {}
                Err(e) => debug!("Skipping anchor {}: {}", href, e),
            }
        }

        entries
    }
}
