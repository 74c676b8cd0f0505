//! Storage abstractions for the sent-title ledger.
//!
//! The ledger is a flat JSON array of titles that have been announced:
//!
//! ```text
//! [
//!     "Solo Leveling",
//!     "New Saga"
//! ]
//! ```
//!
//! It is the only durable state of the herald and is rewritten in full on
//! every append.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::JsonTitleLedger;

/// Trait for sent-title ledger backends.
#[async_trait]
pub trait TitleLedger: Send + Sync {
    /// Load all recorded titles in insertion order.
    ///
    /// Missing or unparsable storage yields an empty list.
    async fn load(&self) -> Result<Vec<String>>;

    /// Exact, case-sensitive membership test against freshly loaded storage.
    async fn contains(&self, title: &str) -> Result<bool> {
        Ok(self.load().await?.iter().any(|t| t == title))
    }

    /// Record a title as announced.
    async fn append(&self, title: &str) -> Result<()>;
}
