// src/pipeline/schedule.rs

//! Startup run and daily wall-clock trigger.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, TimeZone};

use crate::error::{AppError, Result};
use crate::models::ScheduleConfig;
use crate::pipeline::PublishCycle;

/// Fixed time of day at which the publish cycle fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    at: NaiveTime,
}

impl DailyTrigger {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(|at| Self { at })
            .ok_or_else(|| {
                AppError::validation(format!("invalid daily trigger time {hour:02}:{minute:02}"))
            })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Self::new(config.hour, config.minute)
    }

    /// First trigger strictly after `now`, in `now`'s timezone.
    ///
    /// Days on which the trigger time does not exist locally (DST gap) are
    /// skipped; on ambiguous days the earlier instant is used.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let mut date = now.date_naive();
        loop {
            if let Some(at) = tz.from_local_datetime(&date.and_time(self.at)).earliest() {
                if at > *now {
                    return at;
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => return now.clone(),
            }
        }
    }
}

/// Run the startup cycle, then the daily cycle forever.
pub async fn run_forever(
    cycle: &PublishCycle<'_>,
    config: &ScheduleConfig,
    skip_startup: bool,
) -> Result<()> {
    let trigger = DailyTrigger::from_config(config)?;

    if config.run_on_startup && !skip_startup {
        if config.warmup_secs > 0 {
            log::info!("Warming up for {}s before the startup run", config.warmup_secs);
            tokio::time::sleep(Duration::from_secs(config.warmup_secs)).await;
        }
        cycle.run_logged().await;
    }

    loop {
        let now = Local::now();
        let next = trigger.next_after(&now);
        log::info!("Next publish cycle at {}", next.format("%Y-%m-%d %H:%M:%S %Z"));

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;
        cycle.run_logged().await;
    }
}
