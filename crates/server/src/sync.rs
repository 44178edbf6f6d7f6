//! Cache rebuild: fetch, normalize, cap, replace, refresh the popular view.

use std::time::Instant;

use chrono::NaiveDate;
use grantbridge_client::sonar::prompt::featured_prompt;
use grantbridge_client::{Completions, fetch_grant_records, normalize_grants};
use grantbridge_core::{Error, GrantStore, prepare_cache_batch};
use serde::Serialize;

/// Outcome of one cache rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records returned by the completions API.
    pub fetched: usize,
    /// Rows written to the cache after collapsing duplicate ids and capping.
    pub stored: usize,
    /// Whether the popular-open view was refreshed.
    pub view_refreshed: bool,
}

/// Replace the grants cache with a fresh batch from the completions API.
///
/// Nothing is written unless the reply parses and holds at least one record.
/// A failed view refresh is logged and reported, not returned as an error.
pub async fn rebuild_cache(
    completions: &dyn Completions,
    store: &dyn GrantStore,
    model: &str,
    today: NaiveDate,
) -> Result<SyncReport, Error> {
    let started = Instant::now();
    tracing::info!(model, backend = store.backend(), "grant sync started");

    let records = fetch_grant_records(completions, model, featured_prompt(today)).await?;
    if records.is_empty() {
        return Err(Error::Parse("completions API returned no grant records".into()));
    }

    let batch = prepare_cache_batch(normalize_grants(&records, &mut rand::thread_rng()));
    store.replace_cache(&batch).await?;

    let view_refreshed = match store.refresh_popular().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "popular grants refresh failed; cache rows kept");
            false
        }
    };

    let report = SyncReport { fetched: records.len(), stored: batch.len(), view_refreshed };
    tracing::info!(
        fetched = report.fetched,
        stored = report.stored,
        view_refreshed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "grant sync finished"
    );

    Ok(report)
}
