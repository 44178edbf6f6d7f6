//! `POST /api/grants`: live, profile-driven grant search.
//!
//! Nothing is cached; every request is one completions call.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use grantbridge_client::sonar::prompt::dashboard_prompt;
use grantbridge_client::{GrantListing, fetch_grant_records, to_listings};
use grantbridge_core::LegacyProfile;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn search_grants(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<GrantListing>>, ApiError> {
    let Json(body) = body?;
    let profile = LegacyProfile::from_json(&body)?;

    let prompt = dashboard_prompt(&profile, chrono::Utc::now().date_naive());
    let records = fetch_grant_records(state.completions()?, &state.config.search_model, prompt)
        .await
        .map_err(grantbridge_core::Error::from)?;

    let listings = to_listings(&records);
    tracing::info!(count = listings.len(), "grant search served");
    Ok(Json(listings))
}
