//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{HealthDto, PresenceDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Debug endpoint exposing the current presence snapshot
pub async fn debug_presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let snapshot = state.gateway.presence().await;
    let connections = state.gateway.connection_count().await;
    Json(PresenceDto::new(&snapshot, connections))
}
