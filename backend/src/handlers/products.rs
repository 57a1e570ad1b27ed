//! HTTP handlers for product catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::catalog::{CatalogService, CreateProductInput, UpdateProductInput};
use crate::AppState;
use shared::models::ProductRef;

/// Query parameters for product listing
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
}

/// List catalog entries
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<ProductRef>>> {
    let service = CatalogService::new(state.db);
    let products = service.list(query.search.as_deref()).await?;
    Ok(Json(products))
}

/// Get a single catalog entry
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<ProductRef>> {
    let service = CatalogService::new(state.db);
    let product = service.get(&product_id).await?;
    Ok(Json(product))
}

/// Create a catalog entry
pub async fn create_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<ProductRef>> {
    let service = CatalogService::new(state.db);
    let product = service.create(input).await?;
    Ok(Json(product))
}

/// Update a catalog entry
pub async fn update_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<String>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductRef>> {
    let service = CatalogService::new(state.db);
    let product = service.update(&product_id, input).await?;
    Ok(Json(product))
}

/// Delete a catalog entry
pub async fn delete_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<()>> {
    let service = CatalogService::new(state.db);
    service.delete(&product_id).await?;
    Ok(Json(()))
}
