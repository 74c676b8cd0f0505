// src/services/notifier.rs

//! Channel notifier service.
//!
//! Formats an announcement caption and posts it either as a photo with a
//! caption or as a plain text message, depending on whether the cover
//! image answers a reachability probe.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{
    Announcement, ApiResponse, InlineKeyboard, SendMessage, SendPhoto, TelegramConfig,
};
use crate::services::{ImageProbe, Notifier};
use crate::utils::{escape_markdown, http};

/// Bot API timeout for send calls, in seconds.
const SEND_TIMEOUT_SECS: u64 = 30;

/// Build the MarkdownV2 caption for an announcement.
pub fn build_caption(post: &Announcement) -> String {
    format!(
        "📖 *{}*\n\n⭐ Rating: {}\nChapter: {}\nYear: {}\n\n{}",
        escape_markdown(&post.title),
        escape_markdown(&post.rating),
        escape_markdown(&post.chapter),
        escape_markdown(&post.year),
        escape_markdown(&post.description),
    )
}

/// Posts announcements to a channel through the bot API.
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
    probe: ImageProbe,
}

impl TelegramNotifier {
    /// Create a notifier; `probe_timeout` bounds each image HEAD request.
    pub fn new(config: &TelegramConfig, probe_timeout: Duration) -> Result<Self> {
        let client = http::create_api_client(SEND_TIMEOUT_SECS)?;
        let probe = ImageProbe::new(client.clone(), probe_timeout);
        Ok(Self {
            config: config.clone(),
            client,
            probe,
        })
    }

    /// Post the announcement and return the message identifier.
    pub async fn send(&self, post: &Announcement) -> Result<i64> {
        let chat_id = self.config.chat_target();
        let caption = build_caption(post);
        let keyboard = InlineKeyboard::single_link(&self.config.button_text, &post.link);
        let reply_markup = serde_json::to_string(&keyboard)?;

        let request = match self.attachable_cover(post).await {
            Some(photo) => self
                .client
                .post(self.config.method_url("sendPhoto"))
                .json(&SendPhoto {
                    chat_id: &chat_id,
                    photo,
                    caption: &caption,
                    parse_mode: &self.config.parse_mode,
                    reply_markup: &reply_markup,
                }),
            None => self
                .client
                .post(self.config.method_url("sendMessage"))
                .json(&SendMessage {
                    chat_id: &chat_id,
                    text: &caption,
                    parse_mode: &self.config.parse_mode,
                    reply_markup: &reply_markup,
                }),
        };

        let response: ApiResponse = request.send().await?.json().await?;
        Self::message_id(response)
    }

    /// Cover URL to attach, if the post has one and it passes the probe.
    async fn attachable_cover<'a>(&self, post: &'a Announcement) -> Option<&'a str> {
        let url = post.image_url.as_deref().filter(|url| !url.is_empty())?;
        if self.probe.is_reachable(url).await {
            Some(url)
        } else {
            log::info!("Cover {} is not reachable, posting text only", url);
            None
        }
    }

    /// Extract the message identifier from a bot API response.
    fn message_id(response: ApiResponse) -> Result<i64> {
        if !response.ok {
            return Err(AppError::bot_api(
                response
                    .description
                    .unwrap_or_else(|| "request was not ok".to_string()),
            ));
        }
        response
            .result
            .map(|sent| sent.message_id)
            .ok_or_else(|| AppError::bot_api("response is missing result.message_id"))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, post: &Announcement) -> Result<i64> {
        self.send(post).await
    }
}
