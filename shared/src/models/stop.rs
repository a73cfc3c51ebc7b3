//! Delivery stops

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AssignedScout, Problem, ProductLineDetail, Route};
use crate::delivery::stop_totals;
use crate::types::StopStatus;

/// A single customer delivery location on a route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stop {
    pub id: Uuid,
    pub route_id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub phone: Option<String>,
    pub paid: bool,
    pub instructions: Option<String>,
    pub has_problems: bool,
    pub assigned_truck_id: Option<Uuid>,
    /// Cached result of the status engine; refreshed on every product line write
    pub status: StopStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stop {
    pub fn is_delivered(&self) -> bool {
        self.status == StopStatus::Delivered
    }

    pub fn is_unassigned(&self) -> bool {
        self.assigned_truck_id.is_none()
    }
}

/// Stop with its product lines, open problems and crew
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopDetails {
    #[serde(flatten)]
    pub stop: Stop,
    pub products: Vec<ProductLineDetail>,
    pub problems: Vec<Problem>,
    pub assigned_scouts: Vec<AssignedScout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    /// Sum of requested quantities, derived on read
    pub total_quantity: i64,
    /// Sum of delivered quantities, derived on read
    pub delivered_quantity: i64,
}

impl StopDetails {
    pub fn new(
        stop: Stop,
        products: Vec<ProductLineDetail>,
        problems: Vec<Problem>,
        assigned_scouts: Vec<AssignedScout>,
    ) -> Self {
        let (total_quantity, delivered_quantity) = stop_totals(&products);
        Self {
            stop,
            products,
            problems,
            assigned_scouts,
            route: None,
            total_quantity,
            delivered_quantity,
        }
    }

    pub fn with_route(mut self, route: Option<Route>) -> Self {
        self.route = route;
        self
    }
}
