//! Scout HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::scout::{
    AssignTruckScoutsInput, CreateScoutInput, ScoutRoleInput, ScoutService,
};
use crate::AppState;

/// List scouts
pub async fn list_scouts(State(state): State<AppState>) -> impl IntoResponse {
    let service = ScoutService::new(state.db.clone());

    match service.list_scouts().await {
        Ok(scouts) => (StatusCode::OK, Json(serde_json::json!({ "scouts": scouts }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a scout
pub async fn create_scout(
    State(state): State<AppState>,
    Json(input): Json<CreateScoutInput>,
) -> impl IntoResponse {
    let service = ScoutService::new(state.db.clone());

    match service.create_scout(input).await {
        Ok(scout) => (StatusCode::CREATED, Json(scout)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Give a scout a role on a stop
pub async fn assign_stop_scout(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
    Json(input): Json<ScoutRoleInput>,
) -> impl IntoResponse {
    let service = ScoutService::new(state.db.clone());

    match service.assign_to_stop(stop_id, input).await {
        Ok(scouts) => (StatusCode::OK, Json(serde_json::json!({ "assigned_scouts": scouts }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove one role of a scout from a stop
pub async fn remove_stop_scout(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
    Json(input): Json<ScoutRoleInput>,
) -> impl IntoResponse {
    let service = ScoutService::new(state.db.clone());

    match service.remove_from_stop(stop_id, input).await {
        Ok(scouts) => (StatusCode::OK, Json(serde_json::json!({ "assigned_scouts": scouts }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Give a truck's scouts the selected roles on a stop
pub async fn assign_truck_scouts(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
    Json(input): Json<AssignTruckScoutsInput>,
) -> impl IntoResponse {
    let service = ScoutService::new(state.db.clone());

    match service.assign_truck_scouts(stop_id, input).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}
