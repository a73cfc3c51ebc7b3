//! Trucks and their drivers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Scout, StopDetails};
use crate::rollup::{DeliveryRollup, TruckInventory};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Truck {
    pub id: Uuid,
    pub driver_name: String,
    /// Capacity in bags
    pub capacity: i32,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Truck with its stops split into current and completed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckSummary {
    #[serde(flatten)]
    pub truck: Truck,
    pub current_stops: Vec<StopDetails>,
    pub completed_stops: Vec<StopDetails>,
}

/// Full truck view: stops, crew, progress and remaining load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckDetails {
    #[serde(flatten)]
    pub truck: Truck,
    pub current_stops: Vec<StopDetails>,
    pub completed_stops: Vec<StopDetails>,
    pub assigned_scouts: Vec<Scout>,
    pub progress: DeliveryRollup,
    pub inventory: TruckInventory,
}
