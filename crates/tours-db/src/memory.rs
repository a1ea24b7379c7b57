//! In-process [`TourStore`] for tests and local experiments.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    DbError, NewProvider, NewScrapeLog, NewTour, ProviderRow, ScrapeLogRow, TourRow,
    TourSignalsUpdate, TourStore,
};

#[derive(Debug, Default)]
struct State {
    tours: Vec<TourRow>,
    providers: Vec<ProviderRow>,
    scrape_logs: Vec<ScrapeLogRow>,
    rejected_slugs: HashSet<String>,
    reject_scrape_logs: bool,
}

/// Thread-safe in-memory store with the same matching rules as the REST
/// store. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts `tour` directly and returns the stored row.
    pub fn seed_tour(&self, tour: &NewTour) -> TourRow {
        let row = tour_row(tour);
        self.lock().tours.push(row.clone());
        row
    }

    pub fn seed_provider(&self, provider: &NewProvider) -> ProviderRow {
        let row = provider_row(provider);
        self.lock().providers.push(row.clone());
        row
    }

    /// Makes every later `insert_tour` for `slug` fail.
    pub fn reject_tour_slug(&self, slug: &str) {
        self.lock().rejected_slugs.insert(slug.to_string());
    }

    /// Makes every later `insert_scrape_log` fail.
    pub fn reject_scrape_logs(&self) {
        self.lock().reject_scrape_logs = true;
    }

    #[must_use]
    pub fn tours(&self) -> Vec<TourRow> {
        self.lock().tours.clone()
    }

    #[must_use]
    pub fn providers(&self) -> Vec<ProviderRow> {
        self.lock().providers.clone()
    }

    #[must_use]
    pub fn scrape_logs(&self) -> Vec<ScrapeLogRow> {
        self.lock().scrape_logs.clone()
    }
}

fn tour_row(tour: &NewTour) -> TourRow {
    let now = Utc::now();
    TourRow {
        id: Uuid::new_v4(),
        name: tour.name.clone(),
        slug: tour.slug.clone(),
        description: tour.description.clone(),
        category: Some(tour.category.clone()),
        duration: tour.duration.clone(),
        duration_hours: tour.duration_hours,
        group_size: tour.group_size.clone(),
        price_from: tour.price_from,
        currency: Some(tour.currency.clone()),
        rating: tour.rating,
        review_count: tour.review_count,
        image_url: tour.image_url.clone(),
        provider_id: tour.provider_id,
        provider_name: tour.provider_name.clone(),
        booking_url: tour.booking_url.clone(),
        highlights: tour.highlights.clone(),
        includes: tour.includes.clone(),
        is_active: tour.is_active,
        is_featured: tour.is_featured,
        source: Some(tour.source.clone()),
        source_id: tour.source_id.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn provider_row(provider: &NewProvider) -> ProviderRow {
    ProviderRow {
        id: Uuid::new_v4(),
        name: provider.name.clone(),
        slug: provider.slug.clone(),
        provider_type: provider.provider_type.clone(),
        is_active: provider.is_active,
        is_verified: provider.is_verified,
        created_at: Some(Utc::now()),
    }
}

#[async_trait]
impl TourStore for MemoryStore {
    async fn find_tour(&self, source_id: &str, slug: &str) -> Result<Option<TourRow>, DbError> {
        let state = self.lock();
        let found = state.tours.iter().find(|t| {
            (!source_id.is_empty() && t.source_id.as_deref() == Some(source_id)) || t.slug == slug
        });
        Ok(found.cloned())
    }

    async fn update_tour_signals(
        &self,
        id: Uuid,
        update: &TourSignalsUpdate,
    ) -> Result<(), DbError> {
        let mut state = self.lock();
        if let Some(tour) = state.tours.iter_mut().find(|t| t.id == id) {
            tour.rating = update.rating;
            tour.review_count = update.review_count;
            if update.booking_url.is_some() {
                tour.booking_url.clone_from(&update.booking_url);
            }
            tour.updated_at = update.updated_at;
        }
        Ok(())
    }

    async fn insert_tour(&self, tour: &NewTour) -> Result<TourRow, DbError> {
        let mut state = self.lock();
        if state.rejected_slugs.contains(&tour.slug) {
            return Err(DbError::Rejected {
                table: "tours",
                reason: format!("insert of {} rejected", tour.slug),
            });
        }
        let row = tour_row(tour);
        state.tours.push(row.clone());
        Ok(row)
    }

    async fn find_provider_by_slug(&self, slug: &str) -> Result<Option<ProviderRow>, DbError> {
        Ok(self.lock().providers.iter().find(|p| p.slug == slug).cloned())
    }

    async fn insert_provider(&self, provider: &NewProvider) -> Result<ProviderRow, DbError> {
        let row = provider_row(provider);
        self.lock().providers.push(row.clone());
        Ok(row)
    }

    async fn insert_scrape_log(&self, log: &NewScrapeLog) -> Result<(), DbError> {
        let mut state = self.lock();
        if state.reject_scrape_logs {
            return Err(DbError::Rejected {
                table: "scrape_logs",
                reason: "log writes disabled".to_string(),
            });
        }
        state.scrape_logs.push(ScrapeLogRow {
            id: Uuid::new_v4(),
            source: log.source.clone(),
            status: log.status,
            tours_found: log.tours_found,
            tours_new: log.tours_new,
            tours_updated: log.tours_updated,
            tours_skipped: log.tours_skipped,
            tours_failed: log.tours_failed,
            error_message: log.error_message.clone(),
            started_at: log.started_at,
            completed_at: Some(log.completed_at),
        });
        Ok(())
    }

    async fn list_scrape_logs(&self, limit: u32) -> Result<Vec<ScrapeLogRow>, DbError> {
        let mut logs = self.lock().scrape_logs.clone();
        logs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        logs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tours_core::NormalizedTour;

    fn new_tour(slug: &str, source_id: &str) -> NewTour {
        NewTour::from_normalized(
            &NormalizedTour {
                external_id: source_id.to_string(),
                slug: slug.to_string(),
                name: slug.to_string(),
                description: None,
                category: "Day Tours".to_string(),
                duration_text: None,
                duration_hours: None,
                group_size: None,
                price_from: None,
                rating: None,
                review_count: 0,
                image_url: None,
                provider_name: None,
                detail_url: None,
                highlights: Vec::new(),
            },
            None,
        )
    }

    #[tokio::test]
    async fn find_tour_matches_source_id_or_slug() {
        let store = MemoryStore::new();
        let seeded = store.seed_tour(&new_tour("bahrain-fort", "42"));

        let by_id = store.find_tour("42", "other").await.unwrap();
        assert_eq!(by_id.map(|t| t.id), Some(seeded.id));

        let by_slug = store.find_tour("99", "bahrain-fort").await.unwrap();
        assert_eq!(by_slug.map(|t| t.id), Some(seeded.id));

        assert!(store.find_tour("99", "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_source_id_does_not_match_null_ids() {
        let store = MemoryStore::new();
        store.seed_tour(&new_tour("no-id-tour", ""));
        assert!(store.find_tour("", "different").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_touches_only_signal_columns() {
        let store = MemoryStore::new();
        let seeded = store.seed_tour(&new_tour("bahrain-fort", "42"));
        let update = TourSignalsUpdate {
            rating: Some(4.5),
            review_count: 120,
            booking_url: Some("https://example.com/d42-".to_string()),
            updated_at: Utc::now(),
        };
        store.update_tour_signals(seeded.id, &update).await.unwrap();

        let row = &store.tours()[0];
        assert_eq!(row.rating, Some(4.5));
        assert_eq!(row.review_count, 120);
        assert_eq!(row.name, seeded.name);
        assert_eq!(row.category, seeded.category);
    }

    #[tokio::test]
    async fn rejected_slug_fails_insert() {
        let store = MemoryStore::new();
        store.reject_tour_slug("broken");
        let err = store.insert_tour(&new_tour("broken", "1")).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected { table: "tours", .. }));
        assert!(store.tours().is_empty());
    }

    #[tokio::test]
    async fn list_scrape_logs_newest_first_with_limit() {
        let store = MemoryStore::new();
        let base = Utc::now();
        for minutes in [0, 10, 5] {
            let started_at = base + chrono::Duration::minutes(minutes);
            store
                .insert_scrape_log(&NewScrapeLog {
                    source: "tripadvisor".to_string(),
                    status: crate::ScrapeStatus::Success,
                    tours_found: u32::try_from(minutes).unwrap(),
                    tours_new: 0,
                    tours_updated: 0,
                    tours_skipped: 0,
                    tours_failed: 0,
                    error_message: None,
                    started_at,
                    completed_at: started_at,
                })
                .await
                .unwrap();
        }
        let logs = store.list_scrape_logs(2).await.unwrap();
        let found: Vec<u32> = logs.iter().map(|l| l.tours_found).collect();
        assert_eq!(found, vec![10, 5]);
    }
}
