use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tokio::time::Instant;

use super::{BrowserPage, BrowserSettings, POLL_INTERVAL};
use crate::error::ScraperError;

/// Headless Chrome driven through a running WebDriver endpoint
/// (chromedriver by default).
pub struct WebDriverPage {
    client: Option<Client>,
    loaded: bool,
}

impl WebDriverPage {
    /// Starts a headless session with the configured user agent and viewport.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Session`] if the WebDriver endpoint is
    /// unreachable or refuses the capabilities.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, ScraperError> {
        let mut caps = Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": chrome_args(settings) }),
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&settings.webdriver_url)
            .await?;

        if let Err(e) = client
            .set_window_size(settings.viewport_width, settings.viewport_height)
            .await
        {
            tracing::debug!(error = %e, "could not resize browser window");
        }

        tracing::info!(
            webdriver_url = %settings.webdriver_url,
            width = settings.viewport_width,
            height = settings.viewport_height,
            "browser session started"
        );

        Ok(Self {
            client: Some(client),
            loaded: false,
        })
    }

    fn client(&self) -> Result<&Client, ScraperError> {
        self.client.as_ref().ok_or(ScraperError::NoPageLoaded)
    }

    async fn probe(&self, selector: &str) -> Result<bool, ScraperError> {
        let found = self.client()?.find_all(Locator::Css(selector)).await?;
        Ok(!found.is_empty())
    }
}

fn chrome_args(settings: &BrowserSettings) -> Vec<Value> {
    [
        "--headless=new".to_string(),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        format!("--user-agent={}", settings.user_agent),
        format!(
            "--window-size={},{}",
            settings.viewport_width, settings.viewport_height
        ),
    ]
    .into_iter()
    .map(Value::String)
    .collect()
}

#[async_trait]
impl BrowserPage for WebDriverPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScraperError> {
        let client = self.client()?;
        match tokio::time::timeout(timeout, client.goto(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ScraperError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_secs: timeout.as_secs(),
                })
            }
        }
        self.loaded = true;
        Ok(())
    }

    async fn click_if_present(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScraperError> {
        if !self.wait_for_selector(selector, timeout).await? {
            return Ok(false);
        }
        let client = self.client()?;
        let Some(element) = client.find_all(Locator::Css(selector)).await?.into_iter().next()
        else {
            return Ok(false);
        };
        element.click().await?;
        Ok(true)
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScraperError> {
        if !self.loaded {
            return Err(ScraperError::NoPageLoaded);
        }
        let deadline = Instant::now() + timeout;
        loop {
            if self.probe(selector).await? {
                return Ok(true);
            }
            if Instant::now() + POLL_INTERVAL > deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        if !self.loaded {
            return Err(ScraperError::NoPageLoaded);
        }
        Ok(self.client()?.source().await?)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        self.loaded = false;
        client.close().await?;
        tracing::info!("browser session closed");
        Ok(())
    }
}
