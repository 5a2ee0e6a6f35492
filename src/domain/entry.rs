use std::fmt;

use serde::Serialize;
use url::Url;

use crate::app::ExtractionError;
use crate::domain::Category;

/// Adapter output, before cleaning, dedup and ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Position in the source, 1-based, counting only extracted items
    pub source_rank: usize,
    pub title: String,
    /// `None` when the source has no publisher; the platform default is used
    pub publisher: Option<String>,
    pub icon_url: String,
    /// Absolute detail-page URL
    pub link: String,
    pub category: Category,
}

/// A ranked app, as delivered downstream.
///
/// Built only by [`Normalizer`](crate::normalizer::Normalizer); read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    rank: usize,
    title: String,
    publisher: String,
    icon_url: String,
    link: String,
    category: Category,
}

impl Entry {
    pub(crate) fn new(
        rank: usize,
        title: String,
        publisher: String,
        icon_url: String,
        link: String,
        category: Category,
    ) -> Self {
        Self {
            rank,
            title,
            publisher,
            icon_url,
            link,
            category,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn icon_url(&self) -> &str {
        &self.icon_url
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn identifier(&self) -> Option<Identifier> {
        Identifier::from_link(&self.link).ok()
    }
}

/// Dedup key naming an item within its source.
///
/// Storefront links carry it in the `id` query parameter
/// (`/store/apps/details?id=com.example`), feed links in the last path
/// segment (`/kr/app/example/id123456`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn from_link(link: &str) -> Result<Self, ExtractionError> {
        let invalid = || ExtractionError::InvalidLink(link.to_string());
        let url = Url::parse(link).map_err(|_| invalid())?;

        if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "id") {
            if !id.is_empty() {
                return Ok(Self(id.into_owned()));
            }
        }

        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(|segment| Self(segment.to_string()))
            .ok_or_else(invalid)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
