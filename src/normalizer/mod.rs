use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::app::ExtractionError;
use crate::domain::{Entry, Identifier, Platform, RawEntry};

/// Rating/review suffix some storefront tiles leak into the visible title,
/// e.g. `"Super Game 4.8star"` or `"게임 4.5별표"`.
static RATING_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)?\s*(?:star|review|별표|리뷰).*$").expect("valid rating suffix regex")
});

/// Strip a trailing rating/review annotation and surrounding whitespace.
pub fn clean_title(text: &str) -> String {
    RATING_SUFFIX.replace(text, "").trim().to_string()
}

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Turn one category's raw entries into ranked entries.
    ///
    /// Input order is source order. Entries with an empty cleaned title or no
    /// identifier are dropped, later duplicates are dropped, the result is
    /// capped at `limit` and ranked `1..=N`.
    pub fn process(&self, platform: Platform, raw: Vec<RawEntry>, limit: usize) -> Vec<Entry> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(raw.len().min(limit));

        for item in raw {
            if entries.len() >= limit {
                break;
            }

            match self.check(&item, &seen) {
                Ok(id) => {
                    seen.insert(id);
                    let rank = entries.len() + 1;
                    let publisher = item
                        .publisher
                        .filter(|p| !p.trim().is_empty())
                        .unwrap_or_else(|| platform.default_publisher().to_string());
                    entries.push(Entry::new(
                        rank,
                        clean_title(&item.title),
                        publisher,
                        item.icon_url,
                        item.link,
                        item.category,
                    ));
                }
                Err(e) => {
                    tracing::debug!("Dropping {} entry {}: {}", platform, item.source_rank, e);
                }
            }
        }

        entries
    }

    fn check(
        &self,
        item: &RawEntry,
        seen: &HashSet<Identifier>,
    ) -> Result<Identifier, ExtractionError> {
        if clean_title(&item.title).is_empty() {
            return Err(ExtractionError::EmptyTitle);
        }
        let id = Identifier::from_link(&item.link)?;
        if seen.contains(&id) {
            return Err(ExtractionError::Duplicate(id.to_string()));
        }
        Ok(id)
    }
}
