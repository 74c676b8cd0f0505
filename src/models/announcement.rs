//! Outbound announcement data structure.

use super::entry::{CatalogEntry, display_value};

/// Everything the notifier needs to post one title.
///
/// Fields hold display text; escaping happens when the caption is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub title: String,
    pub link: String,
    pub rating: String,
    pub description: String,
    pub chapter: String,
    pub year: String,
    /// Candidate cover image, subject to a reachability probe
    pub image_url: Option<String>,
}

impl Announcement {
    /// Build an announcement from a catalog entry with a known title.
    pub fn from_entry(
        entry: &CatalogEntry,
        title: &str,
        comic_base_url: &str,
        image_base_url: Option<&str>,
    ) -> Self {
        Self {
            title: title.to_string(),
            link: entry.link(comic_base_url),
            rating: display_value(&entry.rating),
            description: display_value(&entry.desc),
            chapter: display_value(&entry.last_chapter),
            year: display_value(&entry.year),
            image_url: entry.cover_url(image_base_url),
        }
    }
}
