mod ingest;

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tours_db::{RestStore, TourStore};
use tracing_subscriber::EnvFilter;

const DEFAULT_RUNS_LIMIT: u32 = 10;

#[derive(Debug, Parser)]
#[command(name = "tours-cli")]
#[command(about = "Tour listing ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape the listing pages and reconcile tours into the store
    Scrape {
        /// Extract and print tours without reading or writing the store
        #[arg(long)]
        dry_run: bool,

        /// Scrape this URL instead of the configured sources (repeatable)
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,
    },
    /// Show the most recent scrape runs
    Runs {
        #[arg(long, default_value_t = DEFAULT_RUNS_LIMIT)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = tours_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Scrape { dry_run, urls } => {
            validate_urls(&urls)?;
            let settings = ingest::RunSettings::from_config(&config, &urls);

            if dry_run {
                let mut page = ingest::launch_page(&config)
                    .await
                    .context("failed to start browser")?;
                let counters = ingest::run_dry(page.as_mut(), &settings).await;
                println!(
                    "dry-run: extracted {} tours from {} URLs",
                    counters.found,
                    settings.source_urls.len()
                );
                return Ok(());
            }

            let store = connect_store(&config)?;
            let counters = ingest::run_scrape(&config, &store, &settings).await?;
            println!(
                "scraped {} tours: {} new, {} updated, {} unchanged, {} failed",
                counters.found, counters.new, counters.updated, counters.skipped, counters.failed
            );
        }
        Commands::Runs { limit } => {
            let store = connect_store(&config)?;
            print_runs(&store, limit).await?;
        }
    }

    Ok(())
}

fn connect_store(config: &tours_core::AppConfig) -> anyhow::Result<RestStore> {
    RestStore::new(
        &config.store_url,
        &config.store_service_key,
        Duration::from_secs(config.store_timeout_secs),
    )
    .context("failed to build store client")
}

fn validate_urls(urls: &[String]) -> anyhow::Result<()> {
    if let Some(bad) = urls
        .iter()
        .find(|u| !u.starts_with("http://") && !u.starts_with("https://"))
    {
        anyhow::bail!("--url must be an http(s) URL, got '{bad}'");
    }
    Ok(())
}

async fn print_runs(store: &dyn TourStore, limit: u32) -> anyhow::Result<()> {
    let logs = store.list_scrape_logs(limit).await?;
    if logs.is_empty() {
        println!("no scrape runs recorded");
        return Ok(());
    }
    for log in logs {
        println!(
            "{}  {:<7}  found={} new={} updated={} skipped={} failed={}{}",
            log.started_at.format("%Y-%m-%d %H:%M:%S"),
            log.status.to_string(),
            log.tours_found,
            log.tours_new,
            log.tours_updated,
            log.tours_skipped,
            log.tours_failed,
            log.error_message
                .map(|m| format!("  error: {m}"))
                .unwrap_or_default(),
        );
    }
    Ok(())
}
