//! `POST /api/sync-grants`: rebuild the homepage cache on demand.
//!
//! Meant for an external cron. When `sync_token` is configured the caller
//! must send it as a bearer token.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use grantbridge_core::Error;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;
use crate::sync::SyncReport;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: SyncReport,
}

fn authorize(expected: Option<&str>, headers: &HeaderMap) -> Result<(), Error> {
    let Some(expected) = expected.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(());
    };

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(Error::Unauthorized("invalid sync token".into())),
        None => Err(Error::Unauthorized("missing bearer token".into())),
    }
}

pub async fn sync_grants(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<SyncResponse>, ApiError> {
    authorize(state.config.sync_token.as_deref(), &headers)?;

    let report = state.run_sync().await?;
    Ok(Json(SyncResponse { success: true, report }))
}
