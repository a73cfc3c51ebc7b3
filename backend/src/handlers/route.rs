//! Route HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::route::{AssignRouteTruckInput, RouteInput, RouteService};
use crate::AppState;

/// List routes with progress
pub async fn list_routes(State(state): State<AppState>) -> impl IntoResponse {
    let service = RouteService::new(state.db.clone());

    match service.list_routes().await {
        Ok(routes) => (StatusCode::OK, Json(serde_json::json!({ "routes": routes }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a route with stops, trucks and progress
pub async fn get_route(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = RouteService::new(state.db.clone());

    match service.get_route(route_id).await {
        Ok(route) => (StatusCode::OK, Json(route)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a route
pub async fn create_route(
    State(state): State<AppState>,
    Json(input): Json<RouteInput>,
) -> impl IntoResponse {
    let service = RouteService::new(state.db.clone());

    match service.create_route(input).await {
        Ok(route) => (StatusCode::CREATED, Json(route)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Rename a route
pub async fn rename_route(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
    Json(input): Json<RouteInput>,
) -> impl IntoResponse {
    let service = RouteService::new(state.db.clone());

    match service.rename_route(route_id, input).await {
        Ok(route) => (StatusCode::OK, Json(route)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Assign a truck to every unassigned stop of a route
pub async fn assign_route_truck(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
    Json(input): Json<AssignRouteTruckInput>,
) -> impl IntoResponse {
    let service = RouteService::new(state.db.clone());

    match service.assign_truck(route_id, input).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}
