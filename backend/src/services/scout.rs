//! Scout service: people and their roles on stops

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::delivery::lock_stop;
use super::stop::ensure_exists;
use crate::error::{AppError, AppResult};
use crate::models::{
    try_convert, AssignedScout, RoleSelection, Scout, ScoutRole, ScoutRow, StopScout,
    StopScoutRow, SCOUT_COLUMNS,
};
use shared::{
    group_scout_roles, role_to_remove, roles_to_add, truck_scout_assignments,
    validate_required_text,
};

/// Scout service for managing scouts and stop roles
#[derive(Clone)]
pub struct ScoutService {
    db: PgPool,
}

/// Input for creating a scout
#[derive(Debug, Deserialize, Validate)]
pub struct CreateScoutInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// Input for assigning or removing one role on a stop
#[derive(Debug, Deserialize)]
pub struct ScoutRoleInput {
    pub scout_id: Uuid,
    pub role: ScoutRole,
}

/// Input for putting a truck's crew on a stop
#[derive(Debug, Deserialize)]
pub struct AssignTruckScoutsInput {
    pub truck_id: Uuid,
    #[serde(flatten)]
    pub roles: RoleSelection,
}

/// Outcome of a bulk crew assignment
#[derive(Debug, Serialize)]
pub struct TruckScoutsAssignment {
    pub stop_id: Uuid,
    pub rows_added: u64,
    pub message: String,
    pub assigned_scouts: Vec<AssignedScout>,
}

impl ScoutService {
    /// Create a new ScoutService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all scouts by name
    pub async fn list_scouts(&self) -> AppResult<Vec<Scout>> {
        let rows = sqlx::query_as::<_, ScoutRow>(&format!(
            "SELECT {SCOUT_COLUMNS} FROM scouts ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Scout::from).collect())
    }

    /// Register a scout
    pub async fn create_scout(&self, input: CreateScoutInput) -> AppResult<Scout> {
        input.validate()?;
        validate_required_text(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let row = sqlx::query_as::<_, ScoutRow>(&format!(
            "INSERT INTO scouts (name) VALUES ($1) RETURNING {SCOUT_COLUMNS}"
        ))
        .bind(input.name.trim())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(scout_id = %row.id, name = %row.name, "Scout created");
        Ok(row.into())
    }

    /// Give a scout a role on a stop; an existing identical role is kept as is
    pub async fn assign_to_stop(
        &self,
        stop_id: Uuid,
        input: ScoutRoleInput,
    ) -> AppResult<Vec<AssignedScout>> {
        ensure_exists(&self.db, "scouts", "Scout", input.scout_id).await?;

        let mut tx = self.db.begin().await?;
        lock_stop(&mut tx, stop_id).await?;

        let existing = load_stop_roles(&mut tx, stop_id).await?;
        let to_add = roles_to_add(
            &existing,
            &[StopScout {
                stop_id,
                scout_id: input.scout_id,
                role: input.role,
            }],
        );
        insert_roles(&mut tx, &to_add).await?;
        tx.commit().await?;

        tracing::info!(
            stop_id = %stop_id,
            scout_id = %input.scout_id,
            role = %input.role,
            added = !to_add.is_empty(),
            "Scout role assigned"
        );

        self.stop_roster(stop_id).await
    }

    /// Remove exactly one role; the scout's other roles on the stop stay
    pub async fn remove_from_stop(
        &self,
        stop_id: Uuid,
        input: ScoutRoleInput,
    ) -> AppResult<Vec<AssignedScout>> {
        let mut tx = self.db.begin().await?;
        lock_stop(&mut tx, stop_id).await?;

        let existing = load_stop_roles(&mut tx, stop_id).await?;
        let target = role_to_remove(&existing, stop_id, input.scout_id, input.role)?;

        sqlx::query("DELETE FROM stop_scouts WHERE stop_id = $1 AND scout_id = $2 AND role = $3")
            .bind(target.stop_id)
            .bind(target.scout_id)
            .bind(target.role.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            stop_id = %stop_id,
            scout_id = %input.scout_id,
            role = %input.role,
            "Scout role removed"
        );

        self.stop_roster(stop_id).await
    }

    /// Give every scout on a truck the selected roles on a stop
    pub async fn assign_truck_scouts(
        &self,
        stop_id: Uuid,
        input: AssignTruckScoutsInput,
    ) -> AppResult<TruckScoutsAssignment> {
        ensure_exists(&self.db, "stops", "Stop", stop_id).await?;
        ensure_exists(&self.db, "trucks", "Truck", input.truck_id).await?;

        if input.roles.is_empty() {
            return Ok(TruckScoutsAssignment {
                stop_id,
                rows_added: 0,
                message: "No roles selected".to_string(),
                assigned_scouts: self.stop_roster(stop_id).await?,
            });
        }

        let scout_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT scout_id FROM truck_scouts WHERE truck_id = $1",
        )
        .bind(input.truck_id)
        .fetch_all(&self.db)
        .await?;

        if scout_ids.is_empty() {
            return Ok(TruckScoutsAssignment {
                stop_id,
                rows_added: 0,
                message: "No scouts assigned to this truck".to_string(),
                assigned_scouts: self.stop_roster(stop_id).await?,
            });
        }

        let mut tx = self.db.begin().await?;
        lock_stop(&mut tx, stop_id).await?;

        let existing = load_stop_roles(&mut tx, stop_id).await?;
        let rows = roles_to_add(
            &existing,
            &truck_scout_assignments(stop_id, &scout_ids, input.roles),
        );
        let rows_added = insert_roles(&mut tx, &rows).await?;
        tx.commit().await?;

        tracing::info!(
            stop_id = %stop_id,
            truck_id = %input.truck_id,
            scouts = scout_ids.len(),
            rows_added,
            "Truck scouts assigned to stop"
        );

        Ok(TruckScoutsAssignment {
            stop_id,
            rows_added,
            message: format!("Assigned {} scout(s) from truck", scout_ids.len()),
            assigned_scouts: self.stop_roster(stop_id).await?,
        })
    }

    /// Scouts on a stop grouped with their roles
    pub async fn stop_roster(&self, stop_id: Uuid) -> AppResult<Vec<AssignedScout>> {
        let mut conn = self.db.acquire().await?;
        let rows = load_stop_roles(&mut conn, stop_id).await?;

        let scouts: Vec<Scout> = sqlx::query_as::<_, ScoutRow>(
            r#"
            SELECT DISTINCT s.id, s.name, s.created_at
            FROM stop_scouts ss
            JOIN scouts s ON s.id = ss.scout_id
            WHERE ss.stop_id = $1
            "#,
        )
        .bind(stop_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Scout::from)
        .collect();

        Ok(group_scout_roles(stop_id, &rows, &scouts))
    }
}

async fn load_stop_roles(conn: &mut PgConnection, stop_id: Uuid) -> AppResult<Vec<StopScout>> {
    try_convert(
        sqlx::query_as::<_, StopScoutRow>(
            "SELECT stop_id, scout_id, role FROM stop_scouts WHERE stop_id = $1",
        )
        .bind(stop_id)
        .fetch_all(&mut *conn)
        .await?,
    )
}

/// Insert role rows, skipping triples that already exist
async fn insert_roles(conn: &mut PgConnection, rows: &[StopScout]) -> AppResult<u64> {
    let mut added = 0;

    for row in rows {
        added += sqlx::query(
            r#"
            INSERT INTO stop_scouts (stop_id, scout_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (stop_id, scout_id, role) DO NOTHING
            "#,
        )
        .bind(row.stop_id)
        .bind(row.scout_id)
        .bind(row.role.as_str())
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }

    Ok(added)
}
