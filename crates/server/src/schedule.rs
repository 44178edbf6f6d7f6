//! In-process cron trigger for the cache rebuild.

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::state::AppState;

/// Start a scheduler running the sync on `sync_cron`, if one is configured.
///
/// Ticks that land while another sync holds the lock are skipped.
pub async fn maybe_start(state: &AppState) -> Result<Option<JobScheduler>> {
    let Some(cron) = state.config.sync_cron.clone() else {
        tracing::info!("no sync schedule configured; use POST /api/sync-grants");
        return Ok(None);
    };

    let sched = JobScheduler::new().await.context("creating scheduler")?;

    let job_state = state.clone();
    let job = Job::new_async(cron.as_str(), move |_uuid, _l| {
        let state = job_state.clone();
        Box::pin(async move {
            match state.run_sync().await {
                Ok(report) => tracing::info!(stored = report.stored, "scheduled grant sync finished"),
                Err(e) if e.is_client_error() => tracing::info!(error = %e, "scheduled grant sync skipped"),
                Err(e) => tracing::error!(error = %e, "scheduled grant sync failed"),
            }
        })
    })
    .with_context(|| format!("creating scheduler job for cron {cron}"))?;

    sched.add(job).await.context("adding scheduler job")?;
    sched.start().await.context("starting scheduler")?;
    tracing::info!(cron = %cron, "grant sync scheduled");

    Ok(Some(sched))
}
