//! WebAssembly module for Mulch Dispatch
//!
//! Gives the browser the same delivery rules the server applies, so a stop's
//! status and progress can be previewed before a write round-trips:
//! - Stop status derivation from product lines
//! - Percent complete rounding
//! - Delivered quantity and spreading checks

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use shared::models::*;
pub use shared::types::*;

use shared::{
    derive_stop_progress, percent_complete, resolve_stop_status, summarize_stops,
    validate_delivered_quantity, validate_spreadable, DeliveryRollup,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("mulch dispatch engine loaded"));
}

/// Status and totals a stop would have with the given lines
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusPreview {
    pub status: StopStatus,
    pub total_quantity: i64,
    pub delivered_quantity: i64,
    pub percent_complete: u32,
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

fn parse_lines(lines_json: &str) -> Result<Vec<ProductLine>, String> {
    serde_json::from_str(lines_json).map_err(|e| format!("Invalid product lines JSON: {}", e))
}

fn parse_status(label: &str) -> Result<StopStatus, String> {
    label.parse().map_err(|e: shared::DomainError| e.to_string())
}

fn preview(lines_json: &str, current_status: &str) -> Result<StatusPreview, String> {
    let lines = parse_lines(lines_json)?;
    let current = parse_status(current_status)?;

    let (total_quantity, delivered_quantity) = derive_stop_progress(&lines)
        .map(|p| (p.total_quantity, p.delivered_quantity))
        .unwrap_or((0, 0));

    Ok(StatusPreview {
        status: resolve_stop_status(current, &lines),
        total_quantity,
        delivered_quantity,
        percent_complete: percent_complete(delivered_quantity, total_quantity),
    })
}

// Totals are rebuilt from each stop's products; client-sent totals are ignored
fn rollup(stops_json: &str) -> Result<DeliveryRollup, String> {
    let stops: Vec<StopDetails> = serde_json::from_str::<Vec<StopDetails>>(stops_json)
        .map_err(|e| format!("Invalid stops JSON: {}", e))?
        .into_iter()
        .map(|s| {
            StopDetails::new(s.stop, s.products, s.problems, s.assigned_scouts).with_route(s.route)
        })
        .collect();
    Ok(summarize_stops(&stops))
}

/// Status label for a stop's lines; a stop without lines keeps `current_status`
#[wasm_bindgen]
pub fn derive_stop_status(lines_json: &str, current_status: &str) -> Result<String, JsValue> {
    preview(lines_json, current_status)
        .map(|p| p.status.as_str().to_string())
        .map_err(js_error)
}

/// Status, totals and percent for a stop's lines, as JSON
#[wasm_bindgen]
pub fn preview_stop(lines_json: &str, current_status: &str) -> Result<String, JsValue> {
    let preview = preview(lines_json, current_status).map_err(js_error)?;
    serde_json::to_string(&preview).map_err(|e| js_error(e.to_string()))
}

/// Route or truck rollup over a list of stops, as JSON
#[wasm_bindgen]
pub fn summarize_stops_json(stops_json: &str) -> Result<String, JsValue> {
    let rollup = rollup(stops_json).map_err(js_error)?;
    serde_json::to_string(&rollup).map_err(|e| js_error(e.to_string()))
}

/// Rounded percent of delivered items, 0 when there is nothing to deliver
#[wasm_bindgen]
pub fn calculate_percent_complete(delivered: f64, total: f64) -> u32 {
    if !delivered.is_finite() || !total.is_finite() {
        return 0;
    }
    percent_complete(delivered as i64, total as i64)
}

/// Whether a delivered quantity may be entered for a line
#[wasm_bindgen]
pub fn is_valid_delivered_quantity(quantity: i32, delivered: i32) -> bool {
    validate_delivered_quantity(None, quantity, delivered).is_ok()
}

/// Whether a line may be marked as spread
#[wasm_bindgen]
pub fn can_mark_spread(quantity: i32, delivered: i32, spread_requested: bool) -> bool {
    validate_spreadable(None, quantity, delivered, spread_requested).is_ok()
}
