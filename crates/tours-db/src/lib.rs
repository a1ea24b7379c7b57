use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod providers;
pub mod rest;
pub mod scrape_logs;
pub mod tours;

pub use memory::MemoryStore;
pub use providers::{NewProvider, ProviderRow};
pub use rest::RestStore;
pub use scrape_logs::{NewScrapeLog, ScrapeLogRow, ScrapeStatus};
pub use tours::{NewTour, TourRow, TourSignalsUpdate};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned HTTP {status} for {table}: {body}")]
    UnexpectedStatus {
        table: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode {table} response: {source}")]
    Deserialize {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("store returned no row for insert into {table}")]
    EmptyInsertResponse { table: &'static str },
    #[error("service key is not a valid header value")]
    InvalidServiceKey,
    #[error("{table} write rejected: {reason}")]
    Rejected { table: &'static str, reason: String },
}

/// Persistence operations used by the ingestion pipeline.
///
/// One handle is constructed at startup and shared for the whole run.
#[async_trait]
pub trait TourStore: Send + Sync {
    /// Returns the first tour whose `source_id` equals `source_id` or whose
    /// `slug` equals `slug`. An empty `source_id` matches by slug only.
    async fn find_tour(&self, source_id: &str, slug: &str) -> Result<Option<TourRow>, DbError>;

    async fn update_tour_signals(
        &self,
        id: Uuid,
        update: &TourSignalsUpdate,
    ) -> Result<(), DbError>;

    async fn insert_tour(&self, tour: &NewTour) -> Result<TourRow, DbError>;

    async fn find_provider_by_slug(&self, slug: &str) -> Result<Option<ProviderRow>, DbError>;

    async fn insert_provider(&self, provider: &NewProvider) -> Result<ProviderRow, DbError>;

    async fn insert_scrape_log(&self, log: &NewScrapeLog) -> Result<(), DbError>;

    /// Most recent run logs first.
    async fn list_scrape_logs(&self, limit: u32) -> Result<Vec<ScrapeLogRow>, DbError>;
}
