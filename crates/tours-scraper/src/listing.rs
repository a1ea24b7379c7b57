//! Listing page extraction: navigate, clear overlays, find the card grid,
//! and read every card.

use std::time::Duration;

use crate::cards::{extract_cards, CARD_SELECTORS, POPUP_SELECTOR};
use crate::error::ScraperError;
use crate::page::BrowserPage;
use crate::types::ListingRecord;

#[derive(Debug, Clone, Copy)]
pub struct ExtractSettings {
    pub navigation_timeout: Duration,
    /// How long to look for a consent banner or modal before moving on.
    pub popup_timeout: Duration,
    /// Wait applied to each card selector in turn.
    pub card_wait_timeout: Duration,
}

/// Extracts listing records from the page at `url`.
///
/// Never fails: navigation errors, a missing card grid, and browser command
/// failures are logged and yield an empty list so the run can move on to
/// the next URL.
pub async fn extract_listings(
    page: &mut dyn BrowserPage,
    url: &str,
    settings: &ExtractSettings,
) -> Vec<ListingRecord> {
    match try_extract(page, url, settings).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(url, error = %e, "listing page extraction failed");
            Vec::new()
        }
    }
}

async fn try_extract(
    page: &mut dyn BrowserPage,
    url: &str,
    settings: &ExtractSettings,
) -> Result<Vec<ListingRecord>, ScraperError> {
    page.goto(url, settings.navigation_timeout).await?;

    match page
        .click_if_present(POPUP_SELECTOR, settings.popup_timeout)
        .await
    {
        Ok(true) => tracing::debug!(url, "dismissed overlay"),
        Ok(false) => {}
        Err(e) => tracing::debug!(url, error = %e, "overlay dismissal failed"),
    }

    let Some(card_selector) = find_card_selector(page, settings.card_wait_timeout).await? else {
        tracing::warn!(url, "no listing cards found on page");
        return Ok(Vec::new());
    };

    let html = page.content().await?;
    let records = extract_cards(&html, url, card_selector);
    tracing::info!(
        url,
        card_selector,
        count = records.len(),
        "extracted listing cards"
    );
    Ok(records)
}

/// First entry of [`CARD_SELECTORS`] that appears within `timeout`.
async fn find_card_selector(
    page: &mut dyn BrowserPage,
    timeout: Duration,
) -> Result<Option<&'static str>, ScraperError> {
    for &selector in CARD_SELECTORS {
        if page.wait_for_selector(selector, timeout).await? {
            return Ok(Some(selector));
        }
        tracing::debug!(selector, "card selector did not match");
    }
    Ok(None)
}
