//! `POST /api/contact`: store a contact form submission.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use grantbridge_core::ContactMessage;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn submit_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactMessage>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(message) = body?;
    message.validate()?;

    state.store.save_contact(&message).await?;
    tracing::info!(backend = state.store.backend(), "contact message stored");

    Ok(Json(json!({ "success": true })))
}
