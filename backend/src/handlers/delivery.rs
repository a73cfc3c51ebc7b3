//! Product line and delivery HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::delivery::{
    AddProductLineInput, ProductLineService, RecordDeliveryInput, SetDeliveredInput,
    UpdateProductLineInput,
};
use crate::AppState;

/// Add a product line to a stop
pub async fn add_product_line(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
    Json(input): Json<AddProductLineInput>,
) -> impl IntoResponse {
    let service = ProductLineService::new(state.db.clone());

    match service.add_product(stop_id, input).await {
        Ok(delivery) => (StatusCode::CREATED, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a product line's quantity or spread request
pub async fn update_product_line(
    State(state): State<AppState>,
    Path(line_id): Path<Uuid>,
    Json(input): Json<UpdateProductLineInput>,
) -> impl IntoResponse {
    let service = ProductLineService::new(state.db.clone());

    match service.update_line(line_id, input).await {
        Ok(delivery) => (StatusCode::OK, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove a product line
pub async fn remove_product_line(
    State(state): State<AppState>,
    Path(line_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductLineService::new(state.db.clone());

    match service.remove_line(line_id).await {
        Ok(delivery) => (StatusCode::OK, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Set the delivered quantity of a product line
pub async fn set_delivered_quantity(
    State(state): State<AppState>,
    Path(line_id): Path<Uuid>,
    Json(input): Json<SetDeliveredInput>,
) -> impl IntoResponse {
    let service = ProductLineService::new(state.db.clone());

    match service.set_delivered(line_id, input).await {
        Ok(delivery) => (StatusCode::OK, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record an additional delivered amount on a product line
pub async fn record_delivery(
    State(state): State<AppState>,
    Path(line_id): Path<Uuid>,
    Json(input): Json<RecordDeliveryInput>,
) -> impl IntoResponse {
    let service = ProductLineService::new(state.db.clone());

    match service.record_delivery(line_id, input).await {
        Ok(delivery) => (StatusCode::OK, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark one product line as spread
pub async fn mark_line_spread(
    State(state): State<AppState>,
    Path(line_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductLineService::new(state.db.clone());

    match service.mark_line_spread(line_id).await {
        Ok(delivery) => (StatusCode::OK, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Deliver every product line of a stop
pub async fn deliver_all(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductLineService::new(state.db.clone());

    match service.mark_all_delivered(stop_id).await {
        Ok(delivery) => (StatusCode::OK, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Spread every spread-requested product line of a stop
pub async fn spread_all(
    State(state): State<AppState>,
    Path(stop_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductLineService::new(state.db.clone());

    match service.mark_all_spread(stop_id).await {
        Ok(delivery) => (StatusCode::OK, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}
