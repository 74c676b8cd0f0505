//! Local filesystem ledger implementation.
//!
//! Every call re-reads the file, so the ledger always reflects what is on
//! disk. Appends are a load-modify-write sequence without locking; a single
//! writer process is assumed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::TitleLedger;

/// Title ledger stored as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonTitleLedger {
    path: PathBuf,
}

impl JsonTitleLedger {
    /// Create a ledger backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Serialize titles with four-space indentation.
    fn to_pretty_json(titles: &[String]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        titles.serialize(&mut ser)?;
        Ok(buf)
    }
}

#[async_trait]
impl TitleLedger for JsonTitleLedger {
    async fn load(&self) -> Result<Vec<String>> {
        let Some(bytes) = self.read_bytes().await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_slice(&bytes) {
            Ok(titles) => Ok(titles),
            Err(e) => {
                log::warn!(
                    "Ledger {} is unreadable ({}), treating as empty",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    async fn append(&self, title: &str) -> Result<()> {
        let mut titles = self.load().await?;
        titles.push(title.to_string());
        let bytes = Self::to_pretty_json(&titles)?;
        self.write_bytes(&bytes).await?;
        log::debug!(
            "Ledger {} now holds {} titles",
            self.path.display(),
            titles.len()
        );
        Ok(())
    }
}
