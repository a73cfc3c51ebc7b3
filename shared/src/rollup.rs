//! Route, truck and fleet progress rollups
//!
//! Rollups are recomputed from scratch on every read. Stop-level credit is
//! coarse: a stop only counts toward delivered items once its status is
//! `delivered`, so partially delivered stops contribute nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{StopDetails, Truck};

/// Progress figures for a collection of stops
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRollup {
    pub total_items: i64,
    pub delivered_items: i64,
    pub remaining_items: i64,
    /// Items on stops with no truck that are not delivered yet
    pub unassigned_items: i64,
    pub unassigned_by_product: BTreeMap<String, i64>,
    pub percent_complete: u32,
}

/// Remaining load for one product on a truck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInventory {
    pub product_name: String,
    pub quantity: i64,
    pub delivered: i64,
    pub remaining: i64,
}

/// Per-product load across a truck's current stops
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckInventory {
    pub products: Vec<ProductInventory>,
    pub remaining_total: i64,
}

/// Fleet-wide dashboard figures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_items: i64,
    pub delivered_items: i64,
    pub remaining_items: i64,
    pub percent_complete: u32,
    pub active_routes: usize,
    pub active_trucks: usize,
    pub open_problems: usize,
    pub completed_stops: usize,
    pub total_stops: usize,
}

/// `round(100 * delivered / total)` with halves rounded up; 0 when total is 0
pub fn percent_complete(delivered: i64, total: i64) -> u32 {
    if total <= 0 || delivered <= 0 {
        return 0;
    }
    let delivered = delivered.min(total) as i128;
    let total = total as i128;
    ((200 * delivered + total) / (2 * total)) as u32
}

/// Summarize a set of stops (a route, a truck, or any filtered subset)
pub fn summarize_stops(stops: &[StopDetails]) -> DeliveryRollup {
    let mut rollup = DeliveryRollup::default();

    for stop in stops {
        rollup.total_items += stop.total_quantity;

        if stop.stop.is_delivered() {
            rollup.delivered_items += stop.total_quantity;
            continue;
        }

        if stop.stop.is_unassigned() {
            rollup.unassigned_items += stop.total_quantity;
            for line in &stop.products {
                *rollup
                    .unassigned_by_product
                    .entry(line.product_name().to_string())
                    .or_insert(0) += i64::from(line.line.quantity);
            }
        }
    }

    rollup.remaining_items = rollup.total_items - rollup.delivered_items;
    rollup.percent_complete = percent_complete(rollup.delivered_items, rollup.total_items);
    rollup
}

/// Split a truck's stops into current (not delivered) and completed
pub fn split_truck_stops(stops: Vec<StopDetails>) -> (Vec<StopDetails>, Vec<StopDetails>) {
    stops.into_iter().partition(|s| !s.stop.is_delivered())
}

/// Per-product quantity, delivered and remaining over a truck's current stops
pub fn truck_inventory(current_stops: &[StopDetails]) -> TruckInventory {
    let mut totals: BTreeMap<String, (i64, i64)> = BTreeMap::new();

    for line in current_stops.iter().flat_map(|s| s.products.iter()) {
        let entry = totals.entry(line.product_name().to_string()).or_insert((0, 0));
        entry.0 += i64::from(line.line.quantity);
        entry.1 += i64::from(line.line.delivered_quantity);
    }

    let products: Vec<ProductInventory> = totals
        .into_iter()
        .map(|(product_name, (quantity, delivered))| ProductInventory {
            product_name,
            quantity,
            delivered,
            remaining: quantity - delivered,
        })
        .collect();
    let remaining_total = products.iter().map(|p| p.remaining).sum();

    TruckInventory {
        products,
        remaining_total,
    }
}

/// Fleet dashboard over every stop of every route
pub fn dashboard_stats(
    route_count: usize,
    stops: &[StopDetails],
    trucks: &[Truck],
    open_problems: usize,
) -> DashboardStats {
    let rollup = summarize_stops(stops);

    DashboardStats {
        total_items: rollup.total_items,
        delivered_items: rollup.delivered_items,
        remaining_items: rollup.remaining_items,
        percent_complete: rollup.percent_complete,
        active_routes: route_count,
        active_trucks: trucks.iter().filter(|t| t.active).count(),
        open_problems,
        completed_stops: stops.iter().filter(|s| s.stop.is_delivered()).count(),
        total_stops: stops.len(),
    }
}
