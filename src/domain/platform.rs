use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A ranking source, labelled the way the ingestion endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// App Store top-free feed (JSON).
    Apple,
    /// Play Store storefront pages (rendered).
    Google,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Apple, Platform::Google];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Apple => "apple",
            Platform::Google => "google",
        }
    }

    /// Publisher used when a source does not expose one.
    pub fn default_publisher(&self) -> &'static str {
        match self {
            Platform::Apple => "Apple App Store",
            Platform::Google => "Google Play",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "apple" | "ios" => Ok(Platform::Apple),
            "google" | "android" => Ok(Platform::Google),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}
