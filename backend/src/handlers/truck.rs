//! Truck HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::truck::{
    AssignTruckScoutInput, CreateTruckInput, TruckService, UpdateTruckInput,
};
use crate::AppState;

/// List trucks with current and completed stops
pub async fn list_trucks(State(state): State<AppState>) -> impl IntoResponse {
    let service = TruckService::new(state.db.clone());

    match service.list_trucks().await {
        Ok(trucks) => (StatusCode::OK, Json(serde_json::json!({ "trucks": trucks }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a truck with crew, progress and remaining inventory
pub async fn get_truck(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = TruckService::new(state.db.clone());

    match service.get_truck(truck_id).await {
        Ok(truck) => (StatusCode::OK, Json(truck)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a truck
pub async fn create_truck(
    State(state): State<AppState>,
    Json(input): Json<CreateTruckInput>,
) -> impl IntoResponse {
    let service = TruckService::new(state.db.clone());

    match service.create_truck(input).await {
        Ok(truck) => (StatusCode::CREATED, Json(truck)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a truck
pub async fn update_truck(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
    Json(input): Json<UpdateTruckInput>,
) -> impl IntoResponse {
    let service = TruckService::new(state.db.clone());

    match service.update_truck(truck_id, input).await {
        Ok(truck) => (StatusCode::OK, Json(truck)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Put a scout on a truck
pub async fn assign_truck_scout(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
    Json(input): Json<AssignTruckScoutInput>,
) -> impl IntoResponse {
    let service = TruckService::new(state.db.clone());

    match service.assign_scout(truck_id, input).await {
        Ok(scouts) => (StatusCode::OK, Json(serde_json::json!({ "scouts": scouts }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Take a scout off a truck
pub async fn remove_truck_scout(
    State(state): State<AppState>,
    Path((truck_id, scout_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = TruckService::new(state.db.clone());

    match service.remove_scout(truck_id, scout_id).await {
        Ok(scouts) => (StatusCode::OK, Json(serde_json::json!({ "scouts": scouts }))).into_response(),
        Err(e) => e.into_response(),
    }
}
