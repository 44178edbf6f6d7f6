//! HTTP routes.

pub mod contact;
pub mod featured;
pub mod grants;
pub mod health;
pub mod sync;

use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/grants", post(grants::search_grants))
        .route("/api/featured-grants", get(featured::featured_grants))
        .route("/api/sync-grants", post(sync::sync_grants))
        .route("/api/contact", post(contact::submit_contact))
        .route("/api/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
