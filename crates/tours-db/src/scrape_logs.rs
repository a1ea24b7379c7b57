//! Row types for the `scrape_logs` table. One row is written per run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Success,
    Failed,
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A row from the `scrape_logs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeLogRow {
    pub id: Uuid,
    pub source: String,
    pub status: ScrapeStatus,
    #[serde(default)]
    pub tours_found: u32,
    #[serde(default)]
    pub tours_new: u32,
    #[serde(default)]
    pub tours_updated: u32,
    #[serde(default)]
    pub tours_skipped: u32,
    #[serde(default)]
    pub tours_failed: u32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewScrapeLog {
    pub source: String,
    pub status: ScrapeStatus,
    pub tours_found: u32,
    pub tours_new: u32,
    pub tours_updated: u32,
    pub tours_skipped: u32,
    pub tours_failed: u32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
