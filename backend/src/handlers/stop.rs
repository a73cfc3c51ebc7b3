//! Stop HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::stop::{
    AssignTruckInput, CreateStopInput, StopQuery, StopService, UpdateStopInput,
};
use crate::AppState;

/// List stops, optionally filtered by route, truck or missing truck
pub async fn list_stops(
    State(state): State<AppState>,
    Query(query): Query<StopQuery>,
) -> impl IntoResponse {
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };
    let service = StopService::new(state.db.clone());

    match service.list_stops(filter).await {
        Ok(stops) => (StatusCode::OK, Json(serde_json::json!({ "stops": stops }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a stop with products, problems, scouts and route
pub async fn get_stop(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = StopService::new(state.db.clone());

    match service.get_stop(stop_id).await {
        Ok(stop) => (StatusCode::OK, Json(stop)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a stop
pub async fn create_stop(
    State(state): State<AppState>,
    Json(input): Json<CreateStopInput>,
) -> impl IntoResponse {
    let service = StopService::new(state.db.clone());

    match service.create_stop(input).await {
        Ok(stop) => (StatusCode::CREATED, Json(stop)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update stop fields
pub async fn update_stop(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
    Json(input): Json<UpdateStopInput>,
) -> impl IntoResponse {
    let service = StopService::new(state.db.clone());

    match service.update_stop(stop_id, input).await {
        Ok(stop) => (StatusCode::OK, Json(stop)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Assign a stop to a truck
pub async fn assign_stop_truck(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
    Json(input): Json<AssignTruckInput>,
) -> impl IntoResponse {
    let service = StopService::new(state.db.clone());

    match service.assign_truck(stop_id, input).await {
        Ok(stop) => (StatusCode::OK, Json(stop)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Unassign a stop from its truck
pub async fn unassign_stop_truck(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = StopService::new(state.db.clone());

    match service.unassign_truck(stop_id).await {
        Ok(stop) => (StatusCode::OK, Json(stop)).into_response(),
        Err(e) => e.into_response(),
    }
}
