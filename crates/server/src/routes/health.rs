//! `GET /api/health`: liveness and wiring summary.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// Always answers. Does not touch the store or the completions API.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store.backend(),
        "completions_configured": state.completions.is_some(),
        "sync_scheduled": state.config.sync_cron.is_some(),
    }))
}
