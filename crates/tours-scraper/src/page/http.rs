use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{BrowserPage, BrowserSettings};
use crate::cards::html_matches;
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Fallback wait when a 429 response carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Page backend that fetches server-rendered HTML over plain HTTP.
///
/// Nothing is executed, so markup injected by scripts never appears and
/// overlays are never clicked. Transient failures (429, network errors) are
/// retried with exponential backoff.
pub struct HttpPage {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
    html: Option<String>,
}

impl HttpPage {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: &BrowserSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            max_retries: settings.http_max_retries,
            backoff_base_secs: settings.http_backoff_base_secs,
            html: None,
        })
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, ScraperError> {
        let response = match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(ScraperError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_secs: timeout.as_secs(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ScraperError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    fn loaded(&self) -> Result<&str, ScraperError> {
        self.html.as_deref().ok_or(ScraperError::NoPageLoaded)
    }
}

#[async_trait]
impl BrowserPage for HttpPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScraperError> {
        self.html = None;
        let html =
            retry_with_backoff(self.max_retries, self.backoff_base_secs, || self.fetch(url, timeout))
                .await?;
        tracing::debug!(url, bytes = html.len(), "page fetched");
        self.html = Some(html);
        Ok(())
    }

    async fn click_if_present(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScraperError> {
        Ok(false)
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScraperError> {
        Ok(html_matches(self.loaded()?, selector))
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        self.loaded().map(str::to_string)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.html = None;
        Ok(())
    }
}

/// Host part of `url` for error messages; falls back to the full string.
fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
