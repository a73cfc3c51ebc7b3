//! Route service: routes, their stops and route-level progress

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::stop::{ensure_exists, link_truck_to_route, load_stop_details, StopFilter};
use crate::error::{AppError, AppResult};
use crate::models::{Route, RouteDetails, RouteRow, Truck, TruckRow, ROUTE_COLUMNS};
use shared::{summarize_stops, validate_required_text};

/// Route service for managing delivery routes
#[derive(Clone)]
pub struct RouteService {
    db: PgPool,
}

/// Input for creating or renaming a route
#[derive(Debug, Deserialize, Validate)]
pub struct RouteInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

/// Input for putting one truck on every unassigned stop of a route
#[derive(Debug, Deserialize)]
pub struct AssignRouteTruckInput {
    pub truck_id: Uuid,
}

/// Result of a bulk truck assignment
#[derive(Debug, Serialize)]
pub struct RouteTruckAssignment {
    pub route_id: Uuid,
    pub truck_id: Uuid,
    pub stops_assigned: u64,
}

impl RouteService {
    /// Create a new RouteService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List routes with their stops, trucks and progress
    pub async fn list_routes(&self) -> AppResult<Vec<RouteDetails>> {
        let routes = sqlx::query_as::<_, RouteRow>(&format!(
            "SELECT {ROUTE_COLUMNS} FROM routes ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut conn = self.db.acquire().await?;
        let stops = load_stop_details(&mut conn, &StopFilter::All).await?;

        let trucks = sqlx::query_as::<_, RouteTruckRow>(
            r#"
            SELECT rt.route_id, t.id, t.driver_name, t.capacity, t.phone, t.active, t.created_at, t.updated_at
            FROM route_trucks rt
            JOIN trucks t ON t.id = rt.truck_id
            ORDER BY t.driver_name
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut details = Vec::with_capacity(routes.len());
        for route in routes {
            let route = Route::from(route);
            let route_stops: Vec<_> = stops
                .iter()
                .filter(|s| s.stop.route_id == route.id)
                .cloned()
                .collect();
            let assigned_trucks = trucks
                .iter()
                .filter(|t| t.route_id == route.id)
                .map(RouteTruckRow::truck)
                .collect();

            details.push(RouteDetails {
                progress: summarize_stops(&route_stops),
                route,
                stops: route_stops,
                assigned_trucks,
            });
        }

        Ok(details)
    }

    /// Get a single route with its stops, trucks and progress
    pub async fn get_route(&self, route_id: Uuid) -> AppResult<RouteDetails> {
        let route: Route = sqlx::query_as::<_, RouteRow>(&format!(
            "SELECT {ROUTE_COLUMNS} FROM routes WHERE id = $1"
        ))
        .bind(route_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Route".to_string()))?
        .into();

        let mut conn = self.db.acquire().await?;
        let stops = load_stop_details(&mut conn, &StopFilter::Route(route_id)).await?;

        let assigned_trucks = sqlx::query_as::<_, TruckRow>(
            r#"
            SELECT t.id, t.driver_name, t.capacity, t.phone, t.active, t.created_at, t.updated_at
            FROM route_trucks rt
            JOIN trucks t ON t.id = rt.truck_id
            WHERE rt.route_id = $1
            ORDER BY t.driver_name
            "#,
        )
        .bind(route_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Truck::from)
        .collect();

        Ok(RouteDetails {
            progress: summarize_stops(&stops),
            route,
            stops,
            assigned_trucks,
        })
    }

    /// Create a route
    pub async fn create_route(&self, input: RouteInput) -> AppResult<Route> {
        input.validate()?;
        validate_required_text(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let row = sqlx::query_as::<_, RouteRow>(&format!(
            "INSERT INTO routes (name) VALUES ($1) RETURNING {ROUTE_COLUMNS}"
        ))
        .bind(input.name.trim())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(route_id = %row.id, name = %row.name, "Route created");
        Ok(row.into())
    }

    /// Rename a route
    pub async fn rename_route(&self, route_id: Uuid, input: RouteInput) -> AppResult<Route> {
        input.validate()?;
        validate_required_text(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let row = sqlx::query_as::<_, RouteRow>(&format!(
            "UPDATE routes SET name = $1, updated_at = NOW() WHERE id = $2 RETURNING {ROUTE_COLUMNS}"
        ))
        .bind(input.name.trim())
        .bind(route_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Route".to_string()))?;

        tracing::debug!(route_id = %route_id, "Route renamed");
        Ok(row.into())
    }

    /// Assign a truck to every stop of the route that has none
    pub async fn assign_truck(
        &self,
        route_id: Uuid,
        input: AssignRouteTruckInput,
    ) -> AppResult<RouteTruckAssignment> {
        ensure_exists(&self.db, "routes", "Route", route_id).await?;
        ensure_exists(&self.db, "trucks", "Truck", input.truck_id).await?;

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE stops SET assigned_truck_id = $1, updated_at = NOW()
            WHERE route_id = $2 AND assigned_truck_id IS NULL
            "#,
        )
        .bind(input.truck_id)
        .bind(route_id)
        .execute(&mut *tx)
        .await?;

        link_truck_to_route(&mut *tx, route_id, input.truck_id).await?;
        tx.commit().await?;

        tracing::info!(
            route_id = %route_id,
            truck_id = %input.truck_id,
            stops = result.rows_affected(),
            "Truck assigned to route"
        );

        Ok(RouteTruckAssignment {
            route_id,
            truck_id: input.truck_id,
            stops_assigned: result.rows_affected(),
        })
    }
}

/// Truck joined through `route_trucks`
#[derive(Debug, sqlx::FromRow)]
struct RouteTruckRow {
    route_id: Uuid,
    id: Uuid,
    driver_name: String,
    capacity: i32,
    phone: Option<String>,
    active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl RouteTruckRow {
    fn truck(&self) -> Truck {
        Truck {
            id: self.id,
            driver_name: self.driver_name.clone(),
            capacity: self.capacity,
            phone: self.phone.clone(),
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
