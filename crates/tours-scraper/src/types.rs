//! Raw per-card data as pulled out of a listing page.
//!
//! Every field except `name` is best-effort: a missing sub-element leaves the
//! field empty rather than rejecting the card. Typed values (duration hours,
//! price, category) are derived later in [`crate::normalize`].

use serde::{Deserialize, Serialize};

/// One listing card from a category page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub name: String,
    pub description: String,
    /// Category label exactly as shown on the card, e.g. `"Food Tours"`.
    pub category_label: String,
    /// Average rating on a 0–5 scale, decoded from the card markup.
    pub rating: Option<f64>,
    /// Review count text, e.g. `"(1,204)"` or `"87 reviews"`.
    pub review_count_text: String,
    pub duration_text: String,
    pub group_size_text: String,
    pub price_text: String,
    pub image_url: String,
    pub provider_name: String,
    /// Absolute URL of the listing's detail page.
    pub detail_url: String,
    pub highlights: Vec<String>,
}
