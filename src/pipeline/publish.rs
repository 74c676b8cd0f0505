// src/pipeline/publish.rs

//! Publish cycle: fetch the catalog, skip titles already announced, post
//! the rest and record every confirmed post.

use std::time::Duration;

use crate::error::Result;
use crate::models::{Announcement, CatalogEntry, Config, CycleStats};
use crate::services::{Catalog, Notifier};
use crate::storage::TitleLedger;

/// One fetch-filter-notify pass over the catalog.
pub struct PublishCycle<'a> {
    config: &'a Config,
    catalog: &'a dyn Catalog,
    ledger: &'a dyn TitleLedger,
    notifier: &'a dyn Notifier,
}

impl<'a> PublishCycle<'a> {
    pub fn new(
        config: &'a Config,
        catalog: &'a dyn Catalog,
        ledger: &'a dyn TitleLedger,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            config,
            catalog,
            ledger,
            notifier,
        }
    }

    /// Run the cycle to completion.
    ///
    /// A failed catalog fetch counts as an empty listing. Every processed
    /// entry is followed by the configured post delay, whether it was sent,
    /// skipped or failed. Only ledger I/O errors abort the cycle.
    pub async fn run(&self) -> Result<CycleStats> {
        log::info!("Running publish cycle");

        let entries = match self.catalog.fetch_latest().await {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Error while listing catalog: {}", e);
                Vec::new()
            }
        };

        let mut stats = CycleStats {
            fetched: entries.len(),
            ..CycleStats::default()
        };

        if entries.is_empty() {
            log::info!("No catalog entries this cycle");
            return Ok(stats);
        }

        let delay = Duration::from_secs(self.config.schedule.post_delay_secs);
        for entry in &entries {
            self.process(entry, &mut stats).await?;

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        log::info!(
            "Publish cycle complete: {} fetched, {} skipped, {} sent, {} failed",
            stats.fetched,
            stats.skipped,
            stats.sent,
            stats.failed
        );
        Ok(stats)
    }

    /// Run the cycle and log instead of returning an error.
    pub async fn run_logged(&self) {
        if let Err(e) = self.run().await {
            log::error!("Publish cycle aborted: {}", e);
        }
    }

    async fn process(&self, entry: &CatalogEntry, stats: &mut CycleStats) -> Result<()> {
        let Some(title) = entry.title.as_deref() else {
            log::warn!(
                "Skipping entry without a title (slug: {})",
                entry.slug.as_deref().unwrap_or("None")
            );
            stats.skipped += 1;
            return Ok(());
        };

        if self.ledger.contains(title).await? {
            log::info!("{} already sent. skipping...", title);
            stats.skipped += 1;
            return Ok(());
        }

        let post = Announcement::from_entry(
            entry,
            title,
            &self.config.site.comic_base_url,
            self.config.images.base_url.as_deref(),
        );
        log::debug!("Cover for {}: {:?}", title, post.image_url);

        match self.notifier.notify(&post).await {
            Ok(message_id) => {
                self.ledger.append(title).await?;
                stats.sent += 1;
                log::info!("Announced {} (message {})", title, message_id);
            }
            Err(e) => {
                stats.failed += 1;
                log::error!("Error while sending {}: {}", title, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::error::AppError;

    struct FakeCatalog {
        entries: Option<Vec<CatalogEntry>>,
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn fetch_latest(&self) -> Result<Vec<CatalogEntry>> {
            self.entries
                .clone()
                .ok_or_else(|| AppError::config("catalog unavailable"))
        }
    }

    #[derive(Default)]
    struct MemoryLedger {
        titles: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TitleLedger for MemoryLedger {
        async fn load(&self) -> Result<Vec<String>> {
            Ok(self.titles.lock().unwrap().clone())
        }

        async fn append(&self, title: &str) -> Result<()> {
            self.titles.lock().unwrap().push(title.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        sent: Mutex<Vec<Announcement>>,
        rejected: HashSet<String>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn notify(&self, post: &Announcement) -> Result<i64> {
            if self.rejected.contains(&post.title) {
                return Err(AppError::bot_api("Bad Request"));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(post.clone());
            Ok(sent.len() as i64)
        }
    }

    fn entry(title: &str) -> CatalogEntry {
        serde_json::from_value(serde_json::json!({
            "slug": title.to_lowercase().replace(' ', "-"),
            "title": title,
            "rating": "8.1",
            "desc": "desc",
            "last_chapter": 3,
            "year": 2024,
            "md_covers": [{"b2key": "cover.jpg"}]
        }))
        .unwrap()
    }

    fn config(delay: u64) -> Config {
        let mut config = Config::default();
        config.schedule.post_delay_secs = delay;
        config.images.base_url = Some("https://img.example.com".to_string());
        config
    }

    #[tokio::test]
    async fn test_sends_new_titles_and_records_them() {
        let config = config(0);
        let catalog = FakeCatalog {
            entries: Some(vec![entry("New Saga"), entry("Other")]),
        };
        let ledger = MemoryLedger::default();
        let notifier = FakeNotifier::default();

        let stats = PublishCycle::new(&config, &catalog, &ledger, &notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.sent, 2);
        assert_eq!(ledger.load().await.unwrap(), vec!["New Saga", "Other"]);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].link, "https://comick.io/comic/new-saga");
        assert_eq!(
            sent[0].image_url.as_deref(),
            Some("https://img.example.com/cover.jpg")
        );
    }

    #[tokio::test]
    async fn test_never_resends_recorded_titles() {
        let config = config(0);
        let catalog = FakeCatalog {
            entries: Some(vec![entry("Old"), entry("New")]),
        };
        let ledger = MemoryLedger::default();
        ledger.append("Old").await.unwrap();
        let notifier = FakeNotifier::default();

        let cycle = PublishCycle::new(&config, &catalog, &ledger, &notifier);
        let first = cycle.run().await.unwrap();
        let second = cycle.run().await.unwrap();

        assert_eq!((first.sent, first.skipped), (1, 1));
        assert_eq!((second.sent, second.skipped), (0, 2));
        let titles: Vec<String> = notifier
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.title.clone())
            .collect();
        assert_eq!(titles, vec!["New"]);
    }

    #[tokio::test]
    async fn test_failed_send_is_not_recorded_and_retried() {
        let config = config(0);
        let catalog = FakeCatalog {
            entries: Some(vec![entry("Flaky"), entry("Fine")]),
        };
        let ledger = MemoryLedger::default();
        let mut notifier = FakeNotifier::default();
        notifier.rejected.insert("Flaky".to_string());

        let stats = PublishCycle::new(&config, &catalog, &ledger, &notifier)
            .run()
            .await
            .unwrap();
        assert_eq!((stats.sent, stats.failed), (1, 1));
        assert_eq!(ledger.load().await.unwrap(), vec!["Fine"]);

        notifier.rejected.clear();
        let stats = PublishCycle::new(&config, &catalog, &ledger, &notifier)
            .run()
            .await
            .unwrap();
        assert_eq!((stats.sent, stats.skipped), (1, 1));
        assert_eq!(ledger.load().await.unwrap(), vec!["Fine", "Flaky"]);
    }

    #[tokio::test]
    async fn test_catalog_failure_does_nothing() {
        let config = config(0);
        let catalog = FakeCatalog { entries: None };
        let ledger = MemoryLedger::default();
        let notifier = FakeNotifier::default();

        let stats = PublishCycle::new(&config, &catalog, &ledger, &notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(stats, CycleStats::default());
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(ledger.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_untitled_entry_is_skipped() {
        let config = config(0);
        let mut untitled = entry("x");
        untitled.title = None;
        let catalog = FakeCatalog {
            entries: Some(vec![untitled]),
        };
        let ledger = MemoryLedger::default();
        let notifier = FakeNotifier::default();

        let stats = PublishCycle::new(&config, &catalog, &ledger, &notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_titles_are_not_normalized() {
        let config = config(0);
        let catalog = FakeCatalog {
            entries: Some(vec![entry("Saga "), entry("saga")]),
        };
        let ledger = MemoryLedger::default();
        ledger.append("Saga").await.unwrap();
        let notifier = FakeNotifier::default();

        let stats = PublishCycle::new(&config, &catalog, &ledger, &notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.sent, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_follows_every_entry() {
        let config = config(15);
        let catalog = FakeCatalog {
            entries: Some(vec![entry("Seen"), entry("New"), entry("Rejected")]),
        };
        let ledger = MemoryLedger::default();
        ledger.append("Seen").await.unwrap();
        let mut notifier = FakeNotifier::default();
        notifier.rejected.insert("Rejected".to_string());

        let start = Instant::now();
        PublishCycle::new(&config, &catalog, &ledger, &notifier)
            .run()
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(45));
        assert!(elapsed < Duration::from_secs(46));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_without_entries() {
        let config = config(15);
        let catalog = FakeCatalog {
            entries: Some(Vec::new()),
        };
        let ledger = MemoryLedger::default();
        let notifier = FakeNotifier::default();

        let start = Instant::now();
        PublishCycle::new(&config, &catalog, &ledger, &notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
