// src/models/mod.rs

//! Domain models for the herald.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod announcement;
mod config;
mod entry;
mod telegram;

// Re-export all public types
pub use announcement::Announcement;
pub use config::{
    CatalogConfig, Config, ENV_BOT_TOKEN, ENV_CATALOG_URL, ENV_CHAT_ID, ENV_IMAGE_URL,
    ImageConfig, LedgerConfig, ScheduleConfig, SiteConfig, TelegramConfig,
};
pub use entry::{CatalogEntry, Cover, display_value};
pub use telegram::{ApiResponse, InlineButton, InlineKeyboard, SendMessage, SendPhoto, SentMessage};

/// Counters for one publish cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Entries returned by the catalog
    pub fetched: usize,
    /// Entries already in the ledger, or without a title
    pub skipped: usize,
    /// Entries posted and recorded
    pub sent: usize,
    /// Entries whose post failed
    pub failed: usize,
}
