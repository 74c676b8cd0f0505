//! Manhwa Herald CLI
//!
//! Long-running bot entry point: announces newly listed titles at startup
//! and then once a day.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use clap::{Parser, Subcommand};
use manhwa_herald::{
    error::Result,
    models::Config,
    pipeline::{self, DailyTrigger, PublishCycle},
    services::{CatalogClient, TelegramNotifier},
    storage::{JsonTitleLedger, TitleLedger},
};

/// Herald - announces new manhwa titles to a Telegram channel
#[derive(Parser, Debug)]
#[command(
    name = "herald",
    version,
    about = "Announces newly listed manhwa titles to a Telegram channel"
)]

struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run at startup, then every day at the configured time (default)
    Run {
        /// Wait for the first daily trigger instead of running immediately
        #[arg(long)]
        skip_startup: bool,
    },

    /// Run a single publish cycle and exit
    Once,

    /// Validate configuration and environment
    Validate,

    /// Show ledger and schedule info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load the settings file and overlay the environment.
///
/// Exits the process with status 1 when required variables are missing.
fn load_config(path: &Path) -> Config {
    let mut config = if path.exists() {
        Config::load_or_default(path)
    } else {
        log::debug!("No settings file at {}, using defaults", path.display());
        Config::default()
    };

    if let Err(e) = config.apply_env() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    config
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();
    init_logging(cli.verbose);

    if let Err(e) = dotenv {
        if !e.not_found() {
            log::warn!("Failed to read .env: {}", e);
        }
    }

    log::info!("Manhwa Herald starting...");

    let config = load_config(&cli.config);
    let ledger = JsonTitleLedger::new(&config.ledger.path);

    match cli.command.unwrap_or(Command::Run {
        skip_startup: false,
    }) {
        Command::Run { skip_startup } => {
            config.validate()?;
            let catalog = CatalogClient::new(&config.catalog)?;
            let notifier = TelegramNotifier::new(
                &config.telegram,
                Duration::from_secs(config.images.probe_timeout_secs),
            )?;
            let cycle = PublishCycle::new(&config, &catalog, &ledger, &notifier);

            pipeline::run_forever(&cycle, &config.schedule, skip_startup).await?;
        }

        Command::Once => {
            config.validate()?;
            let catalog = CatalogClient::new(&config.catalog)?;
            let notifier = TelegramNotifier::new(
                &config.telegram,
                Duration::from_secs(config.images.probe_timeout_secs),
            )?;
            let stats = PublishCycle::new(&config, &catalog, &ledger, &notifier)
                .run()
                .await?;

            log::info!(
                "Sent {} of {} entries ({} skipped, {} failed)",
                stats.sent,
                stats.fetched,
                stats.skipped,
                stats.failed
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            // Other commands fall back to defaults on a broken file; here it must fail.
            if cli.config.exists() {
                if let Err(e) = Config::load(&cli.config) {
                    log::error!("Config validation failed: {}", e);
                    return Err(e);
                }
            }

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let titles = ledger.load().await?;
            log::info!("Ledger: {}", ledger.path().display());
            log::info!("Announced titles: {}", titles.len());
            if let Some(last) = titles.last() {
                log::info!("Most recent: {}", last);
            }

            let trigger = DailyTrigger::from_config(&config.schedule)?;
            log::info!(
                "Next scheduled run: {}",
                trigger
                    .next_after(&Local::now())
                    .format("%Y-%m-%d %H:%M:%S %Z")
            );
        }
    }

    Ok(())
}
