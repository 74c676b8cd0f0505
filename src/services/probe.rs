// src/services/probe.rs

//! Cover image reachability probe.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

/// Decides whether a cover image can be attached to a post.
#[derive(Clone)]
pub struct ImageProbe {
    client: Client,
    timeout: Duration,
}

impl ImageProbe {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// HEAD the URL; reachable only on a success status with an `image/*`
    /// content type. Any failure, including a timeout, counts as unreachable.
    pub async fn is_reachable(&self, url: &str) -> bool {
        let response = match self.client.head(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Image probe failed for {}: {}", url, e);
                return false;
            }
        };

        if !response.status().is_success() {
            log::debug!("Image probe for {} returned {}", url, response.status());
            return false;
        }

        let is_image = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("image/"));

        if !is_image {
            log::debug!("Image probe for {} returned a non-image content type", url);
        }
        is_image
    }
}
