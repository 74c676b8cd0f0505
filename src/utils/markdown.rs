// src/utils/markdown.rs

//! Escaping for the bot API's strict markdown dialect (MarkdownV2).

/// Characters that must be backslash-escaped outside of entities.
pub const RESERVED: [char; 18] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escape every reserved character by prefixing it with a backslash.
///
/// The backslash itself is not reserved, so one replacement pass per
/// reserved character never double-escapes.
pub fn escape(text: &str) -> String {
    RESERVED.iter().fold(text.to_string(), |acc, ch| {
        acc.replace(*ch, &format!("\\{ch}"))
    })
}
