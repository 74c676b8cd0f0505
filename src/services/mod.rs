//! Service layer for the herald.
//!
//! This module contains the outbound integrations:
//! - Catalog listing (`CatalogClient`)
//! - Cover image reachability (`ImageProbe`)
//! - Channel posting (`TelegramNotifier`)

mod catalog;
mod notifier;
mod probe;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Announcement, CatalogEntry};

pub use catalog::CatalogClient;
pub use notifier::{TelegramNotifier, build_caption};
pub use probe::ImageProbe;

/// Source of newly listed titles.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the first page of the listing.
    async fn fetch_latest(&self) -> Result<Vec<CatalogEntry>>;
}

/// Destination for announcements.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post one announcement and return the message identifier.
    async fn notify(&self, post: &Announcement) -> Result<i64>;
}
