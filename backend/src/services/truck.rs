//! Truck service: fleet, truck crews and per-truck progress

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::stop::{ensure_exists, load_stop_details, StopFilter};
use crate::error::{AppError, AppResult};
use crate::models::{
    Scout, ScoutRow, Truck, TruckDetails, TruckRow, TruckSummary, TRUCK_COLUMNS,
};
use shared::{split_truck_stops, summarize_stops, truck_inventory, validate_capacity};

/// Truck service for managing the fleet
#[derive(Clone)]
pub struct TruckService {
    db: PgPool,
}

/// Input for creating a truck
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTruckInput {
    #[validate(length(min = 1, max = 200))]
    pub driver_name: String,
    #[validate(range(min = 0))]
    pub capacity: i32,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
}

/// Input for updating a truck; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTruckInput {
    #[validate(length(min = 1, max = 200))]
    pub driver_name: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub active: Option<bool>,
}

/// Input for putting a scout on a truck
#[derive(Debug, Deserialize)]
pub struct AssignTruckScoutInput {
    pub scout_id: Uuid,
}

impl TruckService {
    /// Create a new TruckService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List trucks with current and completed stops
    pub async fn list_trucks(&self) -> AppResult<Vec<TruckSummary>> {
        let trucks = sqlx::query_as::<_, TruckRow>(&format!(
            "SELECT {TRUCK_COLUMNS} FROM trucks ORDER BY driver_name"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut conn = self.db.acquire().await?;
        let mut summaries = Vec::with_capacity(trucks.len());
        for truck in trucks {
            let stops = load_stop_details(&mut conn, &StopFilter::Truck(truck.id)).await?;
            let (current_stops, completed_stops) = split_truck_stops(stops);
            summaries.push(TruckSummary {
                truck: truck.into(),
                current_stops,
                completed_stops,
            });
        }

        Ok(summaries)
    }

    /// Full view of one truck: stops, crew, progress and remaining load
    pub async fn get_truck(&self, truck_id: Uuid) -> AppResult<TruckDetails> {
        let truck: Truck = sqlx::query_as::<_, TruckRow>(&format!(
            "SELECT {TRUCK_COLUMNS} FROM trucks WHERE id = $1"
        ))
        .bind(truck_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Truck".to_string()))?
        .into();

        let mut conn = self.db.acquire().await?;
        let stops = load_stop_details(&mut conn, &StopFilter::Truck(truck_id)).await?;
        let progress = summarize_stops(&stops);
        let (current_stops, completed_stops) = split_truck_stops(stops);
        let inventory = truck_inventory(&current_stops);

        let assigned_scouts = sqlx::query_as::<_, ScoutRow>(
            r#"
            SELECT s.id, s.name, s.created_at
            FROM truck_scouts ts
            JOIN scouts s ON s.id = ts.scout_id
            WHERE ts.truck_id = $1
            ORDER BY s.name
            "#,
        )
        .bind(truck_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Scout::from)
        .collect();

        Ok(TruckDetails {
            truck,
            current_stops,
            completed_stops,
            assigned_scouts,
            progress,
            inventory,
        })
    }

    /// Register a truck
    pub async fn create_truck(&self, input: CreateTruckInput) -> AppResult<Truck> {
        input.validate()?;
        validate_capacity(input.capacity).map_err(|msg| AppError::validation("capacity", msg))?;

        let row = sqlx::query_as::<_, TruckRow>(&format!(
            r#"
            INSERT INTO trucks (driver_name, capacity, phone, active)
            VALUES ($1, $2, $3, true)
            RETURNING {TRUCK_COLUMNS}
            "#
        ))
        .bind(input.driver_name.trim())
        .bind(input.capacity)
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(truck_id = %row.id, driver = %row.driver_name, "Truck created");
        Ok(row.into())
    }

    /// Update a truck's driver, capacity, phone or active flag
    pub async fn update_truck(&self, truck_id: Uuid, input: UpdateTruckInput) -> AppResult<Truck> {
        input.validate()?;
        if let Some(capacity) = input.capacity {
            validate_capacity(capacity).map_err(|msg| AppError::validation("capacity", msg))?;
        }

        let row = sqlx::query_as::<_, TruckRow>(&format!(
            r#"
            UPDATE trucks
            SET driver_name = COALESCE($1, driver_name),
                capacity = COALESCE($2, capacity),
                phone = COALESCE($3, phone),
                active = COALESCE($4, active),
                updated_at = NOW()
            WHERE id = $5
            RETURNING {TRUCK_COLUMNS}
            "#
        ))
        .bind(input.driver_name.as_deref().map(str::trim))
        .bind(input.capacity)
        .bind(&input.phone)
        .bind(input.active)
        .bind(truck_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Truck".to_string()))?;

        tracing::debug!(truck_id = %truck_id, active = row.active, "Truck updated");
        Ok(row.into())
    }

    /// Put a scout on a truck; repeating it is a no-op
    pub async fn assign_scout(&self, truck_id: Uuid, input: AssignTruckScoutInput) -> AppResult<Vec<Scout>> {
        ensure_exists(&self.db, "trucks", "Truck", truck_id).await?;
        ensure_exists(&self.db, "scouts", "Scout", input.scout_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO truck_scouts (truck_id, scout_id)
            VALUES ($1, $2)
            ON CONFLICT (truck_id, scout_id) DO NOTHING
            "#,
        )
        .bind(truck_id)
        .bind(input.scout_id)
        .execute(&self.db)
        .await?;

        tracing::info!(
            truck_id = %truck_id,
            scout_id = %input.scout_id,
            added = result.rows_affected() > 0,
            "Scout assigned to truck"
        );

        self.truck_scouts(truck_id).await
    }

    /// Take a scout off a truck
    pub async fn remove_scout(&self, truck_id: Uuid, scout_id: Uuid) -> AppResult<Vec<Scout>> {
        let result = sqlx::query("DELETE FROM truck_scouts WHERE truck_id = $1 AND scout_id = $2")
            .bind(truck_id)
            .bind(scout_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Truck scout assignment".to_string()));
        }

        tracing::info!(truck_id = %truck_id, scout_id = %scout_id, "Scout removed from truck");
        self.truck_scouts(truck_id).await
    }

    async fn truck_scouts(&self, truck_id: Uuid) -> AppResult<Vec<Scout>> {
        let rows = sqlx::query_as::<_, ScoutRow>(
            r#"
            SELECT s.id, s.name, s.created_at
            FROM truck_scouts ts
            JOIN scouts s ON s.id = ts.scout_id
            WHERE ts.truck_id = $1
            ORDER BY s.name
            "#,
        )
        .bind(truck_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Scout::from).collect())
    }
}
