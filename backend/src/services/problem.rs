//! Problem service: issues reported against stops
//!
//! `stops.has_problems` mirrors whether a stop has unresolved problems and is
//! only written here, in the same transaction as the problem change.

use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::delivery::lock_stop;
use super::stop::ensure_exists;
use crate::error::{AppError, AppResult};
use crate::models::{
    Problem, ProblemDetails, ProblemRow, Route, RouteRow, Stop, StopRow, PROBLEM_COLUMNS,
    ROUTE_COLUMNS, STOP_COLUMNS,
};
use shared::{has_unresolved_problems, validate_required_text};

/// Problem service for stop issues
#[derive(Clone)]
pub struct ProblemService {
    db: PgPool,
}

/// Input for reporting a problem
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProblemInput {
    pub stop_id: Uuid,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
}

impl ProblemService {
    /// Create a new ProblemService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Unresolved problems, newest first, with their stop and route
    pub async fn list_unresolved(&self) -> AppResult<Vec<ProblemDetails>> {
        let problems = sqlx::query_as::<_, ProblemRow>(&format!(
            "SELECT {PROBLEM_COLUMNS} FROM problems WHERE resolved = false ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        if problems.is_empty() {
            return Ok(Vec::new());
        }

        let stop_ids: Vec<Uuid> = problems.iter().map(|p| p.stop_id).collect();
        let stops: Vec<Stop> = sqlx::query_as::<_, StopRow>(&format!(
            "SELECT {STOP_COLUMNS} FROM stops WHERE id = ANY($1)"
        ))
        .bind(&stop_ids)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(Stop::try_from)
        .collect::<AppResult<_>>()?;

        let route_ids: Vec<Uuid> = stops.iter().map(|s| s.route_id).collect();
        let routes: Vec<Route> = sqlx::query_as::<_, RouteRow>(&format!(
            "SELECT {ROUTE_COLUMNS} FROM routes WHERE id = ANY($1)"
        ))
        .bind(&route_ids)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(Route::from)
        .collect();

        Ok(problems
            .into_iter()
            .map(|row| {
                let problem = Problem::from(row);
                let stop = stops.iter().find(|s| s.id == problem.stop_id).cloned();
                let route = stop
                    .as_ref()
                    .and_then(|s| routes.iter().find(|r| r.id == s.route_id))
                    .cloned();
                ProblemDetails {
                    problem,
                    stop,
                    route,
                }
            })
            .collect())
    }

    /// Report a problem and flag the stop
    pub async fn create_problem(&self, input: CreateProblemInput) -> AppResult<Problem> {
        input.validate()?;

        validate_required_text(&input.description)
            .map_err(|msg| AppError::validation("description", msg))?;
        let description = input.description.trim();
        ensure_exists(&self.db, "stops", "Stop", input.stop_id).await?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ProblemRow>(&format!(
            r#"
            INSERT INTO problems (stop_id, description, resolved)
            VALUES ($1, $2, false)
            RETURNING {PROBLEM_COLUMNS}
            "#
        ))
        .bind(input.stop_id)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        sync_has_problems(&mut tx, input.stop_id).await?;
        tx.commit().await?;

        tracing::info!(problem_id = %row.id, stop_id = %row.stop_id, "Problem reported");
        Ok(row.into())
    }

    /// Resolve a problem; the stop stays flagged while others remain open
    pub async fn resolve_problem(&self, problem_id: Uuid) -> AppResult<Problem> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ProblemRow>(&format!(
            r#"
            UPDATE problems SET resolved = true, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROBLEM_COLUMNS}
            "#
        ))
        .bind(problem_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem".to_string()))?;

        sync_has_problems(&mut tx, row.stop_id).await?;
        tx.commit().await?;

        tracing::info!(problem_id = %problem_id, stop_id = %row.stop_id, "Problem resolved");
        Ok(row.into())
    }
}

async fn sync_has_problems(conn: &mut PgConnection, stop_id: Uuid) -> AppResult<()> {
    // Serializes concurrent problem writes on the same stop before the re-read
    lock_stop(conn, stop_id).await?;

    let problems: Vec<Problem> = sqlx::query_as::<_, ProblemRow>(&format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems WHERE stop_id = $1"
    ))
    .bind(stop_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(Problem::from)
    .collect();

    sqlx::query("UPDATE stops SET has_problems = $1, updated_at = NOW() WHERE id = $2")
        .bind(has_unresolved_problems(&problems))
        .bind(stop_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
