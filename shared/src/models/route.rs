//! Delivery routes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StopDetails, Truck};
use crate::rollup::DeliveryRollup;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Route with its stops, trucks and progress figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDetails {
    #[serde(flatten)]
    pub route: Route,
    pub stops: Vec<StopDetails>,
    pub assigned_trucks: Vec<Truck>,
    pub progress: DeliveryRollup,
}
