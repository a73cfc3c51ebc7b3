//! Route definitions for the Mulch Dispatch API

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/dashboard", get(handlers::get_dashboard))
        .nest("/products", product_routes())
        .nest("/routes", route_routes())
        .nest("/stops", stop_routes())
        .nest("/product-lines", product_line_routes())
        .nest("/trucks", truck_routes())
        .nest("/scouts", scout_routes())
        .nest("/problems", problem_routes())
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_products).post(handlers::create_product),
    )
}

/// Delivery route management
fn route_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_routes).post(handlers::create_route))
        .route(
            "/:route_id",
            get(handlers::get_route).put(handlers::rename_route),
        )
        .route("/:route_id/assign-truck", post(handlers::assign_route_truck))
}

/// Stop routes, including delivery commands and scout roles
fn stop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stops).post(handlers::create_stop))
        .route("/:stop_id", get(handlers::get_stop).put(handlers::update_stop))
        .route(
            "/:stop_id/truck",
            put(handlers::assign_stop_truck).delete(handlers::unassign_stop_truck),
        )
        .route("/:stop_id/products", post(handlers::add_product_line))
        .route("/:stop_id/deliver-all", post(handlers::deliver_all))
        .route("/:stop_id/spread-all", post(handlers::spread_all))
        .route(
            "/:stop_id/scouts",
            post(handlers::assign_stop_scout).delete(handlers::remove_stop_scout),
        )
        .route("/:stop_id/truck-scouts", post(handlers::assign_truck_scouts))
}

/// Product line routes
fn product_line_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:line_id",
            put(handlers::update_product_line).delete(handlers::remove_product_line),
        )
        .route("/:line_id/delivered", put(handlers::set_delivered_quantity))
        .route("/:line_id/deliveries", post(handlers::record_delivery))
        .route("/:line_id/spread", post(handlers::mark_line_spread))
}

/// Truck and truck crew routes
fn truck_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_trucks).post(handlers::create_truck))
        .route("/:truck_id", get(handlers::get_truck).put(handlers::update_truck))
        .route("/:truck_id/scouts", post(handlers::assign_truck_scout))
        .route(
            "/:truck_id/scouts/:scout_id",
            delete(handlers::remove_truck_scout),
        )
}

/// Scout routes
fn scout_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_scouts).post(handlers::create_scout))
}

/// Problem routes
fn problem_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_problems).post(handlers::create_problem))
        .route("/:problem_id/resolve", post(handlers::resolve_problem))
}
