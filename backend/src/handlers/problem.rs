//! Problem HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::problem::{CreateProblemInput, ProblemService};
use crate::AppState;

/// List unresolved problems
pub async fn list_problems(State(state): State<AppState>) -> impl IntoResponse {
    let service = ProblemService::new(state.db.clone());

    match service.list_unresolved().await {
        Ok(problems) => (StatusCode::OK, Json(serde_json::json!({ "problems": problems }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Report a problem on a stop
pub async fn create_problem(
    State(state): State<AppState>,
    Json(input): Json<CreateProblemInput>,
) -> impl IntoResponse {
    let service = ProblemService::new(state.db.clone());

    match service.create_problem(input).await {
        Ok(problem) => (StatusCode::CREATED, Json(problem)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Resolve a problem
pub async fn resolve_problem(
    State(state): State<AppState>,
    Path(problem_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProblemService::new(state.db.clone());

    match service.resolve_problem(problem_id).await {
        Ok(problem) => (StatusCode::OK, Json(problem)).into_response(),
        Err(e) => e.into_response(),
    }
}
