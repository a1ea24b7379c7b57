use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::BrowserPage;
use crate::cards::html_matches;
use crate::error::ScraperError;

/// In-memory page backend serving canned HTML per URL.
///
/// Navigating to an unknown URL fails with [`ScraperError::NotFound`].
#[derive(Debug, Default)]
pub struct FixturePage {
    pages: HashMap<String, String>,
    current: Option<String>,
    visited: Vec<String>,
    clicked: Vec<String>,
    closed: bool,
}

impl FixturePage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `html` to be served for `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// URLs passed to `goto`, in call order, including failed ones.
    #[must_use]
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Selectors whose first match was "clicked".
    #[must_use]
    pub fn clicked(&self) -> &[String] {
        &self.clicked
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn loaded(&self) -> Result<&str, ScraperError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .map(String::as_str)
            .ok_or(ScraperError::NoPageLoaded)
    }
}

#[async_trait]
impl BrowserPage for FixturePage {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), ScraperError> {
        self.visited.push(url.to_string());
        if !self.pages.contains_key(url) {
            self.current = None;
            return Err(ScraperError::NotFound {
                url: url.to_string(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn click_if_present(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScraperError> {
        let present = html_matches(self.loaded()?, selector);
        if present {
            self.clicked.push(selector.to_string());
        }
        Ok(present)
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
        self.current = None;
        self.closed = true;
        Ok(())
    }
}
