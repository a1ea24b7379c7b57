//! Row types for the `tours` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tours_core::{NormalizedTour, DEFAULT_CURRENCY, TOUR_SOURCE};
use uuid::Uuid;

use crate::providers::ProviderRow;

/// A row from the `tours` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Duration as displayed on the listing, e.g. `"4 hours"`.
    pub duration: Option<String>,
    pub duration_hours: Option<f64>,
    pub group_size: Option<String>,
    pub price_from: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    pub image_url: Option<String>,
    pub provider_id: Option<Uuid>,
    pub provider_name: Option<String>,
    pub booking_url: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub source: Option<String>,
    pub source_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a tour first seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTour {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: String,
    pub duration: Option<String>,
    pub duration_hours: Option<f64>,
    pub group_size: Option<String>,
    pub price_from: Option<f64>,
    pub currency: String,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub image_url: Option<String>,
    pub provider_id: Option<Uuid>,
    pub provider_name: Option<String>,
    pub booking_url: Option<String>,
    pub highlights: Vec<String>,
    pub includes: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub source: String,
    /// `None` when the listing URL carried no id.
    pub source_id: Option<String>,
}

impl NewTour {
    /// Builds the insert row for `tour`, linked to `provider` when one was
    /// resolved.
    #[must_use]
    pub fn from_normalized(tour: &NormalizedTour, provider: Option<&ProviderRow>) -> Self {
        Self {
            name: tour.name.clone(),
            slug: tour.slug.clone(),
            description: tour.description.clone(),
            category: tour.category.clone(),
            duration: tour.duration_text.clone(),
            duration_hours: tour.duration_hours,
            group_size: tour.group_size.clone(),
            price_from: tour.price_from,
            currency: DEFAULT_CURRENCY.to_string(),
            rating: tour.rating,
            review_count: tour.review_count,
            image_url: tour.image_url.clone(),
            provider_id: provider.map(|p| p.id),
            provider_name: provider
                .map(|p| p.name.clone())
                .or_else(|| tour.provider_name.clone()),
            booking_url: tour.detail_url.clone(),
            highlights: tour.highlights.clone(),
            includes: Vec::new(),
            is_active: true,
            is_featured: false,
            source: TOUR_SOURCE.to_string(),
            source_id: (!tour.external_id.is_empty()).then(|| tour.external_id.clone()),
        }
    }
}

/// Partial update applied to an existing tour when a fresh scrape carries
/// review signal. No other column is touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourSignalsUpdate {
    pub rating: Option<f64>,
    pub review_count: u32,
    /// Left out of the update when the card had no link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TourSignalsUpdate {
    #[must_use]
    pub fn from_normalized(tour: &NormalizedTour, now: DateTime<Utc>) -> Self {
        Self {
            rating: tour.rating,
            review_count: tour.review_count,
            booking_url: tour.detail_url.clone(),
            updated_at: now,
        }
    }
}
