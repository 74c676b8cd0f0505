//! Utility functions and helpers.

pub mod http;
pub mod markdown;

pub use markdown::escape as escape_markdown;
