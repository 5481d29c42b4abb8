//! Page content trees and the override merger.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Content rendered on a marketing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub hero: Hero,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

/// Partial content stored by editors. Every field is optional; unknown
/// fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOverride {
    #[serde(default)]
    pub hero: Option<HeroOverride>,
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroOverride {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
}

impl ContentOverride {
    /// Parse a stored override. Malformed documents are logged and treated
    /// as absent so the default content is still served.
    pub fn from_stored(value: serde_json::Value) -> Option<Self> {
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Ignoring malformed content override: {}", e);
                None
            }
        }
    }
}

/// Merge `overrides` over `default`, returning a fresh tree.
///
/// Fields present in the override replace the matching default; everything
/// else keeps its default value. `None` yields a copy of `default`.
pub fn merge_content(default: &PageContent, overrides: Option<&ContentOverride>) -> PageContent {
    let mut merged = default.clone();

    let Some(overrides) = overrides else {
        return merged;
    };

    if let Some(hero) = &overrides.hero {
        if let Some(title) = &hero.title {
            merged.hero.title = title.clone();
        }
        if let Some(description) = &hero.description {
            merged.hero.description = description.clone();
        }
        if let Some(badge) = &hero.badge {
            merged.hero.badge = Some(badge.clone());
        }
    }

    if let Some(sections) = &overrides.sections {
        merged.sections = sections.clone();
    }

    merged
}
