use serde::{Deserialize, Serialize};

use crate::domain::Category;

/// Per-category result caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryLimits {
    /// Cap for the aggregate "all apps" category (default: 50)
    pub all: usize,

    /// Cap shared by every named category (default: 25)
    pub category: usize,

    /// Extra entries requested from the feed to cover malformed ones (default: 20)
    pub overfetch_margin: usize,
}

impl Default for CategoryLimits {
    fn default() -> Self {
        Self {
            all: 50,
            category: 25,
            overfetch_margin: 20,
        }
    }
}

impl CategoryLimits {
    pub fn limit_for(&self, category: Category) -> usize {
        if category.is_aggregate() {
            self.all
        } else {
            self.category
        }
    }

    /// Number of entries to ask the feed for.
    pub fn feed_request_size(&self, category: Category) -> usize {
        self.limit_for(category) + self.overfetch_margin
    }
}
