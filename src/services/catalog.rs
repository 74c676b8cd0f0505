// src/services/catalog.rs

//! Catalog listing service.
//!
//! Fetches one page of newly listed titles from the catalog API.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, REFERER};
use serde_json::Value;

use crate::error::Result;
use crate::models::{CatalogConfig, CatalogEntry};
use crate::services::Catalog;
use crate::utils::http;

/// Client for the catalog listing endpoint.
pub struct CatalogClient {
    config: CatalogConfig,
    client: Client,
}

impl CatalogClient {
    /// Create a catalog client with the given configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            client: http::create_catalog_client(config)?,
        })
    }

    /// Fetch page one of the listing. No retries, no pagination.
    pub async fn fetch(&self) -> Result<Vec<CatalogEntry>> {
        let mut request = self
            .client
            .get(&self.config.url)
            .query(&self.config.query())
            .header(ACCEPT, "application/json");

        if let Some(referer) = &self.config.referer {
            request = request.header(REFERER, referer);
        }

        let raw = request
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Value>>()
            .await?;

        let entries = decode_entries(raw);
        log::debug!("Catalog returned {} entries", entries.len());
        Ok(entries)
    }
}

/// Decode listing items one by one, dropping malformed ones.
fn decode_entries(raw: Vec<Value>) -> Vec<CatalogEntry> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping malformed catalog entry #{}: {}", index, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn fetch_latest(&self) -> Result<Vec<CatalogEntry>> {
        self.fetch().await
    }
}
