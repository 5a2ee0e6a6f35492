use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ranking categories shared by both sources, in processing order.
///
/// Labels are the ones the ingestion site filters on, so they are serialized
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "전체")]
    All,
    #[serde(rename = "게임")]
    Games,
    #[serde(rename = "금융")]
    Finance,
    #[serde(rename = "소셜")]
    Social,
    #[serde(rename = "엔터")]
    Entertainment,
    #[serde(rename = "생활")]
    Lifestyle,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::All,
        Category::Games,
        Category::Finance,
        Category::Social,
        Category::Entertainment,
        Category::Lifestyle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "전체",
            Category::Games => "게임",
            Category::Finance => "금융",
            Category::Social => "소셜",
            Category::Entertainment => "엔터",
            Category::Lifestyle => "생활",
        }
    }

    /// The "all apps" aggregate, which gets the larger cap.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Category::All)
    }

    /// Path of the storefront listing page, relative to the storefront host.
    pub fn storefront_path(&self) -> &'static str {
        match self {
            Category::All => "/store/apps?device=phone",
            Category::Games => "/store/games?device=phone",
            Category::Finance => "/store/apps/category/FINANCE?device=phone",
            Category::Social => "/store/apps/category/SOCIAL?device=phone",
            Category::Entertainment => "/store/apps/category/ENTERTAINMENT?device=phone",
            Category::Lifestyle => "/store/apps/category/LIFESTYLE?device=phone",
        }
    }

    /// Genre code of the ranking feed; `None` for the aggregate feed.
    pub fn feed_genre(&self) -> Option<u32> {
        match self {
            Category::All => None,
            Category::Games => Some(6014),
            Category::Finance => Some(6015),
            Category::Social => Some(6005),
            Category::Entertainment => Some(6016),
            Category::Lifestyle => Some(6012),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts either the wire label or the English variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s || format!("{:?}", c).eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}
