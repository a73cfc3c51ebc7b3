//! Dashboard HTTP handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::services::dashboard::DashboardService;
use crate::AppState;

/// Fleet statistics
pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let service = DashboardService::new(state.db.clone());

    match service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}
