//! Update-or-insert decision for one scraped tour.

use chrono::Utc;
use tours_core::{slugify, NormalizedTour};
use tours_db::{DbError, NewProvider, NewTour, ProviderRow, TourSignalsUpdate, TourStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordOutcome {
    Inserted,
    Updated,
    /// Matched an existing tour but carried no rating or reviews.
    Skipped,
    Failed,
}

/// Reconciles `tour` against the store. Store errors are logged with the tour
/// name and reported as [`RecordOutcome::Failed`]; they never propagate.
/// A tour whose name yields no slug is never looked up or inserted.
pub(crate) async fn reconcile_tour(store: &dyn TourStore, tour: &NormalizedTour) -> RecordOutcome {
    if tour.slug.is_empty() {
        tracing::warn!(tour = %tour.name, "tour name yields an empty slug, not storing it");
        return RecordOutcome::Failed;
    }
    match try_reconcile(store, tour).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(tour = %tour.name, slug = %tour.slug, error = %e, "failed to reconcile tour");
            RecordOutcome::Failed
        }
    }
}

async fn try_reconcile(
    store: &dyn TourStore,
    tour: &NormalizedTour,
) -> Result<RecordOutcome, DbError> {
    // There is no transaction around find-then-insert: two concurrent runs
    // can both miss and insert the same tour.
    if let Some(existing) = store.find_tour(&tour.external_id, &tour.slug).await? {
        if !tour.has_review_signal() {
            tracing::debug!(tour = %tour.name, id = %existing.id, "no review signal, leaving tour unchanged");
            return Ok(RecordOutcome::Skipped);
        }
        let update = TourSignalsUpdate::from_normalized(tour, Utc::now());
        store.update_tour_signals(existing.id, &update).await?;
        tracing::debug!(tour = %tour.name, id = %existing.id, "updated tour");
        return Ok(RecordOutcome::Updated);
    }

    let provider = resolve_provider(store, tour.provider_name.as_deref()).await?;
    let row = store
        .insert_tour(&NewTour::from_normalized(tour, provider.as_ref()))
        .await?;
    tracing::info!(tour = %row.name, id = %row.id, "inserted tour");
    Ok(RecordOutcome::Inserted)
}

/// Finds the provider named `name` by slug, creating it when missing.
/// Returns `None` when the card named no provider.
async fn resolve_provider(
    store: &dyn TourStore,
    name: Option<&str>,
) -> Result<Option<ProviderRow>, DbError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let slug = slugify(name);
    if slug.is_empty() {
        return Ok(None);
    }

    if let Some(provider) = store.find_provider_by_slug(&slug).await? {
        return Ok(Some(provider));
    }

    let provider = store.insert_provider(&NewProvider::named(name)).await?;
    tracing::info!(provider = %provider.name, id = %provider.id, "created provider");
    Ok(Some(provider))
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
