//! HTTP handlers for party management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::party::{CreatePartyInput, PartyService, UpdatePartyInput};
use crate::AppState;
use shared::models::Party;
use shared::types::{PaginatedResponse, Pagination};

/// Query parameters for party listing
#[derive(Debug, Deserialize)]
pub struct PartyQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

/// List parties with pagination
pub async fn list_parties(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PartyQuery>,
) -> AppResult<Json<PaginatedResponse<Party>>> {
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    let service = PartyService::new(state.db);
    let parties = service.list(&pagination, query.search.as_deref()).await?;
    Ok(Json(parties))
}

/// Get a single party
pub async fn get_party(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(party_id): Path<Uuid>,
) -> AppResult<Json<Party>> {
    let service = PartyService::new(state.db);
    let party = service.get(party_id).await?;
    Ok(Json(party))
}

/// Create a party
pub async fn create_party(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreatePartyInput>,
) -> AppResult<Json<Party>> {
    let service = PartyService::new(state.db);
    let party = service.create(input).await?;
    Ok(Json(party))
}

/// Update a party
pub async fn update_party(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(party_id): Path<Uuid>,
    Json(input): Json<UpdatePartyInput>,
) -> AppResult<Json<Party>> {
    let service = PartyService::new(state.db);
    let party = service.update(party_id, input).await?;
    Ok(Json(party))
}

/// Delete a party
pub async fn delete_party(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(party_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = PartyService::new(state.db);
    service.delete(party_id).await?;
    Ok(Json(()))
}
