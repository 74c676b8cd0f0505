//! Catalog entry data structure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One title from the catalog listing.
///
/// Display-only fields arrive as strings or numbers depending on the title,
/// so they are kept as raw JSON values and rendered with [`display_value`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Path segment of the canonical link
    #[serde(default)]
    pub slug: Option<String>,

    /// Title, also the deduplication key
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub rating: Value,

    #[serde(default)]
    pub desc: Value,

    #[serde(default)]
    pub last_chapter: Value,

    #[serde(default)]
    pub year: Value,

    /// Cover descriptors, first one is used
    #[serde(default)]
    pub md_covers: Option<Vec<Cover>>,
}

/// Cover image descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cover {
    /// Storage key on the image host
    #[serde(default)]
    pub b2key: Option<String>,
}

impl CatalogEntry {
    /// Canonical link: `{base}/{slug}`.
    pub fn link(&self, comic_base_url: &str) -> String {
        format!(
            "{}/{}",
            comic_base_url.trim_end_matches('/'),
            self.slug.as_deref().unwrap_or("None")
        )
    }

    /// Image URL built from the first cover, if any and if an image host is set.
    pub fn cover_url(&self, image_base_url: Option<&str>) -> Option<String> {
        let base = image_base_url?;
        let key = self.md_covers.as_ref()?.first()?.b2key.as_deref()?;
        Some(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            key.trim_start_matches('/')
        ))
    }
}

/// Render a loosely typed field for display.
///
/// Absent or null values render as `None`, strings without quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
