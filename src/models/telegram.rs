//! Bot API request and response payloads.

use serde::{Deserialize, Serialize};

/// Inline keyboard attached to every announcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

/// A single URL button.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub url: String,
}

impl InlineKeyboard {
    /// Keyboard with one button linking to `url`.
    pub fn single_link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineButton {
                text: text.into(),
                url: url.into(),
            }]],
        }
    }
}

/// Body of `sendPhoto`.
#[derive(Debug, Clone, Serialize)]
pub struct SendPhoto<'a> {
    pub chat_id: &'a str,
    pub photo: &'a str,
    pub caption: &'a str,
    pub parse_mode: &'a str,
    /// Keyboard serialized to a JSON string
    pub reply_markup: &'a str,
}

/// Body of `sendMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
    /// Keyboard serialized to a JSON string
    pub reply_markup: &'a str,
}

/// Envelope of every bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<SentMessage>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

/// The part of a sent message this bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}
