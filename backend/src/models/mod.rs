//! Database models for the Mulch Dispatch server
//!
//! Re-exports models from the shared crate and adds the row types sqlx maps
//! query results into.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;
pub use shared::types::*;

use crate::error::AppError;

pub const ROUTE_COLUMNS: &str = "id, name, created_at, updated_at";
pub const PRODUCT_COLUMNS: &str = "id, name, created_at, updated_at";
pub const TRUCK_COLUMNS: &str = "id, driver_name, capacity, phone, active, created_at, updated_at";
pub const SCOUT_COLUMNS: &str = "id, name, created_at";
pub const PROBLEM_COLUMNS: &str = "id, stop_id, description, resolved, created_at, updated_at";
pub const STOP_COLUMNS: &str = "id, route_id, customer_name, address, phone, paid, instructions, \
     has_problems, assigned_truck_id, status, created_at, updated_at";
pub const PRODUCT_LINE_COLUMNS: &str = "id, stop_id, product_id, quantity, delivered_quantity, \
     spread_requested, is_spread, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct RouteRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Route {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct TruckRow {
    pub id: Uuid,
    pub driver_name: String,
    pub capacity: i32,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TruckRow> for Truck {
    fn from(row: TruckRow) -> Self {
        Truck {
            id: row.id,
            driver_name: row.driver_name,
            capacity: row.capacity,
            phone: row.phone,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ScoutRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ScoutRow> for Scout {
    fn from(row: ScoutRow) -> Self {
        Scout {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ProblemRow {
    pub id: Uuid,
    pub stop_id: Uuid,
    pub description: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProblemRow> for Problem {
    fn from(row: ProblemRow) -> Self {
        Problem {
            id: row.id,
            stop_id: row.stop_id,
            description: row.description,
            resolved: row.resolved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct StopRow {
    pub id: Uuid,
    pub route_id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub phone: Option<String>,
    pub paid: bool,
    pub instructions: Option<String>,
    pub has_problems: bool,
    pub assigned_truck_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StopRow> for Stop {
    type Error = AppError;

    fn try_from(row: StopRow) -> Result<Self, Self::Error> {
        Ok(Stop {
            id: row.id,
            route_id: row.route_id,
            customer_name: row.customer_name,
            address: row.address,
            phone: row.phone,
            paid: row.paid,
            instructions: row.instructions,
            has_problems: row.has_problems,
            assigned_truck_id: row.assigned_truck_id,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ProductLineRow {
    pub id: Uuid,
    pub stop_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub delivered_quantity: i32,
    pub spread_requested: bool,
    pub is_spread: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductLineRow> for ProductLine {
    fn from(row: ProductLineRow) -> Self {
        ProductLine {
            id: row.id,
            stop_id: row.stop_id,
            product_id: row.product_id,
            quantity: row.quantity,
            delivered_quantity: row.delivered_quantity,
            spread_requested: row.spread_requested,
            is_spread: row.is_spread,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct StopScoutRow {
    pub stop_id: Uuid,
    pub scout_id: Uuid,
    pub role: String,
}

impl TryFrom<StopScoutRow> for StopScout {
    type Error = AppError;

    fn try_from(row: StopScoutRow) -> Result<Self, Self::Error> {
        Ok(StopScout {
            stop_id: row.stop_id,
            scout_id: row.scout_id,
            role: row.role.parse()?,
        })
    }
}

/// Convert a batch of fallible rows, failing on the first bad one
pub fn try_convert<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}
