//! Page sessions the extractor drives.
//!
//! A [`BrowserPage`] is one open tab: it navigates, dismisses overlays, waits
//! for markup to appear, and hands back the rendered HTML. Three backends
//! exist:
//!
//! - [`WebDriverPage`]: a headless Chrome session over WebDriver.
//! - [`HttpPage`]: plain HTTP GETs; no script execution.
//! - [`FixturePage`]: canned HTML keyed by URL, for tests and offline runs.

mod fixture;
mod http;
mod webdriver;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

pub use fixture::FixturePage;
pub use http::HttpPage;
pub use webdriver::WebDriverPage;

/// Interval between selector probes while waiting for markup.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[async_trait]
pub trait BrowserPage: Send {
    /// Navigates to `url` and waits for the initial document to load.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::NavigationTimeout`] if loading takes longer
    /// than `timeout`, or a backend error if the page cannot be fetched.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScraperError>;

    /// Clicks the first element matching `selector` if one shows up within
    /// `timeout`. Returns whether anything was clicked.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the browser command itself fails.
    async fn click_if_present(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScraperError>;

    /// Waits up to `timeout` for `selector` to match at least one element.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::NoPageLoaded`] before the first `goto`, or a
    /// backend error if the browser command fails.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScraperError>;

    /// Returns the current page HTML.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::NoPageLoaded`] before the first `goto`.
    async fn content(&mut self) -> Result<String, ScraperError>;

    /// Ends the session. Calling it more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the session could not be shut down cleanly.
    async fn close(&mut self) -> Result<(), ScraperError>;
}

/// Settings shared by the live page backends.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Retries after the first failed HTTP page load.
    pub http_max_retries: u32,
    pub http_backoff_base_secs: u64,
}
