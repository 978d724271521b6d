//! Router for the health API

use std::sync::Arc;

use axum::{Json, Router, routing::get};

use super::public;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

async fn health() -> Json<public::HealthResponse> {
    Json(public::HealthResponse::ok())
}

/// Create the health router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(health))
}
