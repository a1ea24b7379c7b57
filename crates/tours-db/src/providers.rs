//! Row types for the `tour_providers` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tours_core::{slugify, PROVIDER_TYPE};
use uuid::Uuid;

/// A row from the `tour_providers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a provider created on first sight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProvider {
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub is_active: bool,
    pub is_verified: bool,
}

impl NewProvider {
    /// An active, unverified tour operator named `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slugify(name),
            provider_type: PROVIDER_TYPE.to_string(),
            is_active: true,
            is_verified: false,
        }
    }
}
