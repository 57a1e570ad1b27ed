//! HTTP handlers for trade document endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::documents::{
    CreateDispatchInput, CreateInwardInput, CreatePurchaseInput, CreateSaleInput, DocumentService,
};
use crate::AppState;
use shared::models::{InwardReceipt, OutwardDispatch, Purchase, SaleRecord};

/// Record a material inward receipt
pub async fn create_inward(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateInwardInput>,
) -> AppResult<Json<InwardReceipt>> {
    ensure_write_access(&current_user)?;
    let service = DocumentService::new(state.db);
    let receipt = service.create_inward(input).await?;
    Ok(Json(receipt))
}

/// List material inward receipts
pub async fn list_inward(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<InwardReceipt>>> {
    let service = DocumentService::new(state.db);
    let receipts = service.list_inward().await?;
    Ok(Json(receipts))
}

/// Record a vendor purchase
pub async fn create_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePurchaseInput>,
) -> AppResult<Json<Purchase>> {
    ensure_write_access(&current_user)?;
    let service = DocumentService::new(state.db);
    let purchase = service.create_purchase(input).await?;
    Ok(Json(purchase))
}

/// List vendor purchases
pub async fn list_purchases(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Purchase>>> {
    let service = DocumentService::new(state.db);
    let purchases = service.list_purchases().await?;
    Ok(Json(purchases))
}

/// Record a material outward dispatch
pub async fn create_dispatch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateDispatchInput>,
) -> AppResult<Json<OutwardDispatch>> {
    ensure_write_access(&current_user)?;
    let service = DocumentService::new(state.db);
    let dispatch = service.create_dispatch(input).await?;
    Ok(Json(dispatch))
}

/// List outward dispatches
pub async fn list_dispatches(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<OutwardDispatch>>> {
    let service = DocumentService::new(state.db);
    let dispatches = service.list_dispatches().await?;
    Ok(Json(dispatches))
}

/// Mark a pending dispatch as dispatched
pub async fn mark_dispatched(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dispatch_id): Path<String>,
) -> AppResult<Json<()>> {
    ensure_write_access(&current_user)?;
    let service = DocumentService::new(state.db);
    service.mark_dispatched(&dispatch_id).await?;
    Ok(Json(()))
}

/// Record a direct sale
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<SaleRecord>> {
    ensure_write_access(&current_user)?;
    let service = DocumentService::new(state.db);
    let sale = service.create_sale(input).await?;
    Ok(Json(sale))
}

/// List sales
pub async fn list_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<SaleRecord>>> {
    let service = DocumentService::new(state.db);
    let sales = service.list_sales().await?;
    Ok(Json(sales))
}

fn ensure_write_access(current_user: &CurrentUser) -> AppResult<()> {
    if current_user.0.has_permission("documents", "write") {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}
