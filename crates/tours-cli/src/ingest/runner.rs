//! Scrape run orchestration: one browser session, source URLs in order,
//! one run log per run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tours_core::{AppConfig, BrowserBackend, TOUR_SOURCE};
use tours_db::{NewScrapeLog, ScrapeStatus, TourStore};
use tours_scraper::{
    extract_listings, normalize_listing, BrowserPage, BrowserSettings, ExtractSettings, HttpPage,
    ScraperError, WebDriverPage,
};

use super::reconcile::{reconcile_tour, RecordOutcome};

#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub source_urls: Vec<String>,
    pub extract: ExtractSettings,
    pub delay_min: Duration,
    pub delay_max: Duration,
}

impl RunSettings {
    /// Settings from `config`; a non-empty `url_override` replaces the
    /// configured source URLs.
    pub(crate) fn from_config(config: &AppConfig, url_override: &[String]) -> Self {
        let source_urls = if url_override.is_empty() {
            config.source_urls.clone()
        } else {
            url_override.to_vec()
        };
        Self {
            source_urls,
            extract: ExtractSettings {
                navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
                popup_timeout: Duration::from_millis(config.popup_timeout_ms),
                card_wait_timeout: Duration::from_secs(config.card_wait_timeout_secs),
            },
            delay_min: Duration::from_millis(config.inter_url_delay_min_ms),
            delay_max: Duration::from_millis(config.inter_url_delay_max_ms),
        }
    }
}

/// Per-run counters, written to the run log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunCounters {
    pub found: u32,
    pub new: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl RunCounters {
    fn record(&mut self, outcome: RecordOutcome) {
        let slot = match outcome {
            RecordOutcome::Inserted => &mut self.new,
            RecordOutcome::Updated => &mut self.updated,
            RecordOutcome::Skipped => &mut self.skipped,
            RecordOutcome::Failed => &mut self.failed,
        };
        *slot = slot.saturating_add(1);
    }
}

pub(crate) fn browser_settings(config: &AppConfig) -> BrowserSettings {
    BrowserSettings {
        webdriver_url: config.webdriver_url.clone(),
        user_agent: config.user_agent.clone(),
        viewport_width: config.viewport_width,
        viewport_height: config.viewport_height,
        http_max_retries: config.http_max_retries,
        http_backoff_base_secs: config.http_backoff_base_secs,
    }
}

/// Opens a page session on the configured backend.
pub(crate) async fn launch_page(config: &AppConfig) -> Result<Box<dyn BrowserPage>, ScraperError> {
    let settings = browser_settings(config);
    let page: Box<dyn BrowserPage> = match config.browser_backend {
        BrowserBackend::WebDriver => Box::new(WebDriverPage::launch(&settings).await?),
        BrowserBackend::Http => Box::new(HttpPage::new(&settings)?),
    };
    Ok(page)
}

/// Runs a full scrape: launches the browser, crawls every source URL,
/// reconciles each tour and writes exactly one run log.
///
/// # Errors
///
/// Returns an error if the browser cannot be started or the run log cannot
/// be written. A `failed` run log is attempted first in both cases.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    store: &dyn TourStore,
    settings: &RunSettings,
) -> anyhow::Result<RunCounters> {
    let started_at = Utc::now();
    let mut page = match launch_page(config).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!(error = %e, "failed to start browser");
            write_failed_log(store, started_at, RunCounters::default(), &e.to_string()).await;
            return Err(anyhow::anyhow!("failed to start browser: {e}"));
        }
    };
    run_session(page.as_mut(), store, settings, started_at).await
}

/// Crawls with an already-open `page`, which is closed before returning
/// whatever the outcome.
///
/// # Errors
///
/// Returns an error if the success run log cannot be written.
pub(crate) async fn run_session(
    page: &mut dyn BrowserPage,
    store: &dyn TourStore,
    settings: &RunSettings,
    started_at: DateTime<Utc>,
) -> anyhow::Result<RunCounters> {
    tracing::info!(urls = settings.source_urls.len(), "scrape run started");
    let counters = crawl(page, Some(store), settings).await;
    close_page(page).await;

    let log = run_log(ScrapeStatus::Success, started_at, counters, None);
    if let Err(e) = store.insert_scrape_log(&log).await {
        let message = format!("failed to write run log: {e}");
        tracing::error!(error = %e, "failed to write run log");
        write_failed_log(store, started_at, counters, &message).await;
        anyhow::bail!(message);
    }

    tracing::info!(
        found = counters.found,
        new = counters.new,
        updated = counters.updated,
        skipped = counters.skipped,
        failed = counters.failed,
        "scrape run completed"
    );
    Ok(counters)
}

/// Extracts and normalizes without touching the store; tours are printed as
/// JSON lines. The page is closed before returning.
pub(crate) async fn run_dry(page: &mut dyn BrowserPage, settings: &RunSettings) -> RunCounters {
    let counters = crawl(page, None, settings).await;
    close_page(page).await;
    counters
}

async fn crawl(
    page: &mut dyn BrowserPage,
    store: Option<&dyn TourStore>,
    settings: &RunSettings,
) -> RunCounters {
    let mut counters = RunCounters::default();
    let url_count = settings.source_urls.len();

    for (index, url) in settings.source_urls.iter().enumerate() {
        tracing::info!(url, "scraping listing page");
        let records = extract_listings(page, url, &settings.extract).await;
        counters.found = counters
            .found
            .saturating_add(u32::try_from(records.len()).unwrap_or(u32::MAX));

        for record in records {
            let tour = normalize_listing(record);
            match store {
                Some(store) => counters.record(reconcile_tour(store, &tour).await),
                None => match serde_json::to_string(&tour) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(tour = %tour.name, error = %e, "failed to print tour"),
                },
            }
        }

        if index + 1 < url_count {
            let delay = jitter(settings.delay_min, settings.delay_max);
            tracing::debug!(delay_ms = delay.as_millis(), "waiting before next URL");
            tokio::time::sleep(delay).await;
        }
    }

    counters
}

async fn close_page(page: &mut dyn BrowserPage) {
    if let Err(e) = page.close().await {
        tracing::warn!(error = %e, "failed to close browser");
    }
}

/// Uniform random duration in `[min, max]`.
fn jitter(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let min_ms = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
}

fn run_log(
    status: ScrapeStatus,
    started_at: DateTime<Utc>,
    counters: RunCounters,
    error_message: Option<String>,
) -> NewScrapeLog {
    NewScrapeLog {
        source: TOUR_SOURCE.to_string(),
        status,
        tours_found: counters.found,
        tours_new: counters.new,
        tours_updated: counters.updated,
        tours_skipped: counters.skipped,
        tours_failed: counters.failed,
        error_message,
        started_at,
        completed_at: Utc::now(),
    }
}

/// Writes a `failed` run log; a write error is only logged.
async fn write_failed_log(
    store: &dyn TourStore,
    started_at: DateTime<Utc>,
    counters: RunCounters,
    message: &str,
) {
    let log = run_log(
        ScrapeStatus::Failed,
        started_at,
        counters,
        Some(message.to_string()),
    );
    if let Err(e) = store.insert_scrape_log(&log).await {
        tracing::error!(error = %e, "failed to write failed run log");
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
