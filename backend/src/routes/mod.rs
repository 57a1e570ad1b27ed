//! Route definitions for the AudiCare Clinic Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - product catalog
        .nest("/products", product_routes())
        // Protected routes - parties
        .nest("/parties", party_routes())
        // Protected routes - patient enquiries
        .nest("/enquiries", enquiry_routes())
        // Protected routes - trade documents
        .nest("/materials", material_routes())
        .nest("/purchases", purchase_routes())
        .nest("/sales", sale_routes())
        // Protected routes - derived stock view
        .nest("/stock", stock_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        // Staff registration requires an authenticated admin
        .route(
            "/register",
            post(handlers::register_staff).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Party management routes (protected)
fn party_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_parties).post(handlers::create_party),
        )
        .route(
            "/:party_id",
            get(handlers::get_party)
                .put(handlers::update_party)
                .delete(handlers::delete_party),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Patient enquiry routes (protected)
fn enquiry_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_enquiries).post(handlers::create_enquiry),
        )
        .route("/:enquiry_id", get(handlers::get_enquiry))
        .route("/:enquiry_id/visits", post(handlers::add_visit))
        .route(
            "/:enquiry_id/journey-stage",
            put(handlers::update_journey_stage),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Material inward/outward routes (protected)
fn material_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/inward",
            get(handlers::list_inward).post(handlers::create_inward),
        )
        .route(
            "/outward",
            get(handlers::list_dispatches).post(handlers::create_dispatch),
        )
        .route(
            "/outward/:dispatch_id/dispatch",
            post(handlers::mark_dispatched),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase routes (protected)
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Derived stock routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_stock))
        .route("/summary", get(handlers::get_stock_summary))
        .route("/grouped", get(handlers::get_stock_grouped))
        .route("/export", get(handlers::export_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}
