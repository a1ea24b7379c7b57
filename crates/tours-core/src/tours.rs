use serde::{Deserialize, Serialize};

/// Value written to `tours.source` and `scrape_logs.source` for rows created
/// by the listing ingestion pipeline.
pub const TOUR_SOURCE: &str = "tripadvisor";

/// ISO 4217 currency stored on every inserted tour.
pub const DEFAULT_CURRENCY: &str = "BHD";

/// `tour_providers.type` for providers created by the pipeline.
pub const PROVIDER_TYPE: &str = "tour_operator";

/// A tour scraped from a listing card, with typed fields derived from the raw
/// card text. Ready for reconciliation against the `tours` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTour {
    /// Listing id taken from the detail URL; empty when the URL has no id.
    pub external_id: String,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    /// Canonical category name, e.g. `"Food"`.
    pub category: String,
    /// Duration text exactly as shown on the card, for display.
    pub duration_text: Option<String>,
    pub duration_hours: Option<f64>,
    pub group_size: Option<String>,
    pub price_from: Option<f64>,
    /// Average rating on a 0–5 scale.
    pub rating: Option<f64>,
    pub review_count: u32,
    pub image_url: Option<String>,
    pub provider_name: Option<String>,
    /// Absolute URL of the listing's detail page on the source site.
    pub detail_url: Option<String>,
    pub highlights: Vec<String>,
}

impl NormalizedTour {
    /// Returns `true` when the scrape carries a rating or at least one review.
    ///
    /// Tours without either are not used to overwrite persisted ratings.
    #[must_use]
    pub fn has_review_signal(&self) -> bool {
        self.rating.is_some() || self.review_count > 0
    }
}
