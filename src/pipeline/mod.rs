//! Pipeline entry points for the herald.
//!
//! - `PublishCycle`: one fetch-filter-notify pass over the catalog
//! - `run_forever`: startup run followed by the daily trigger

pub mod publish;
pub mod schedule;

pub use publish::PublishCycle;
pub use schedule::{DailyTrigger, run_forever};
