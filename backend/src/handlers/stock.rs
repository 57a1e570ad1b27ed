//! HTTP handlers for the derived stock view

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::inventory::{InventoryService, StockView};
use crate::AppState;
use shared::models::StockSummary;
use shared::reconcile::{CategoryGroup, StockFilter};

/// Get the reconciled stock view, optionally filtered
pub async fn get_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<StockView>> {
    ensure_stock_access(&current_user)?;
    let service = InventoryService::new(state.db, &state.config);
    let view = service.stock(&filter).await?;
    Ok(Json(view))
}

/// Get summary statistics over the full stock view
pub async fn get_stock_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<StockSummary>> {
    ensure_stock_access(&current_user)?;
    let service = InventoryService::new(state.db, &state.config);
    let summary = service.summary().await?;
    Ok(Json(summary))
}

/// Get the category -> product -> serial drill-down view
pub async fn get_stock_grouped(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<CategoryGroup>>> {
    ensure_stock_access(&current_user)?;
    let service = InventoryService::new(state.db, &state.config);
    let groups = service.grouped().await?;
    Ok(Json(groups))
}

/// Export the filtered stock view as CSV
pub async fn export_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<StockFilter>,
) -> AppResult<Response> {
    ensure_stock_access(&current_user)?;
    let service = InventoryService::new(state.db, &state.config);
    let csv = service.export_csv(&filter).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"stock.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// The stock module is gated as a whole; actions are not differentiated
fn ensure_stock_access(current_user: &CurrentUser) -> AppResult<()> {
    if current_user.0.is_allowed_module("stock") {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}
