//! Normalization from raw [`ListingRecord`]s to [`tours_core::NormalizedTour`].
//!
//! Free-text parsing is delegated to [`crate::parse`]; this module handles
//! id extraction, slugging, and turning empty strings into `None`.

use std::sync::LazyLock;

use regex::Regex;
use tours_core::{slugify, NormalizedTour};

use crate::parse::{map_category, parse_duration, parse_price, parse_review_count};
use crate::types::ListingRecord;

/// Listing ids appear in detail paths as `-d<digits>-`, e.g.
/// `/AttractionProductReview-g293996-d11452311-Pearl_Diving.html`.
static EXTERNAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-d(\d+)-").expect("valid external id regex"));

/// Extracts the source listing id from a detail page URL.
///
/// Returns an empty string when the URL does not carry an id.
#[must_use]
pub fn extract_external_id(detail_url: &str) -> String {
    EXTERNAL_ID_RE
        .captures(detail_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Normalizes a raw [`ListingRecord`] into a [`NormalizedTour`].
#[must_use]
pub fn normalize_listing(record: ListingRecord) -> NormalizedTour {
    let external_id = extract_external_id(&record.detail_url);
    let slug = slugify(&record.name);
    let duration = parse_duration(&record.duration_text);
    let price_from = parse_price(&record.price_text);
    let review_count = parse_review_count(&record.review_count_text);
    let category = map_category(&record.category_label);

    NormalizedTour {
        external_id,
        slug,
        name: record.name,
        description: non_empty(record.description),
        category,
        duration_text: non_empty(duration.text),
        duration_hours: duration.hours,
        group_size: non_empty(record.group_size_text),
        price_from,
        rating: record.rating,
        review_count,
        image_url: non_empty(record.image_url),
        provider_name: non_empty(record.provider_name),
        detail_url: non_empty(record.detail_url),
        highlights: record
            .highlights
            .into_iter()
            .filter(|h| !h.trim().is_empty())
            .collect(),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
