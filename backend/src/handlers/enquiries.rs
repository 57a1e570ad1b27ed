//! HTTP handlers for patient enquiry endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::enquiry::{CreateEnquiryInput, EnquiryService};
use crate::AppState;
use shared::models::{Enquiry, Visit};
use shared::types::{PaginatedResponse, Pagination};

/// Query parameters for enquiry listing
#[derive(Debug, Deserialize)]
pub struct EnquiryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

/// Input for updating the journey stage
#[derive(Debug, Deserialize)]
pub struct JourneyStageInput {
    pub journey_stage: String,
}

/// List enquiries with pagination
pub async fn list_enquiries(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<EnquiryQuery>,
) -> AppResult<Json<PaginatedResponse<Enquiry>>> {
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    let service = EnquiryService::new(state.db);
    let enquiries = service.list(&pagination, query.search.as_deref()).await?;
    Ok(Json(enquiries))
}

/// Get a single enquiry
pub async fn get_enquiry(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(enquiry_id): Path<String>,
) -> AppResult<Json<Enquiry>> {
    let service = EnquiryService::new(state.db);
    let enquiry = service.get(&enquiry_id).await?;
    Ok(Json(enquiry))
}

/// Create an enquiry
pub async fn create_enquiry(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateEnquiryInput>,
) -> AppResult<Json<Enquiry>> {
    let service = EnquiryService::new(state.db);
    let enquiry = service.create(input).await?;
    Ok(Json(enquiry))
}

/// Append a visit to an enquiry
pub async fn add_visit(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(enquiry_id): Path<String>,
    Json(visit): Json<Visit>,
) -> AppResult<Json<Enquiry>> {
    let service = EnquiryService::new(state.db);
    let enquiry = service.add_visit(&enquiry_id, visit).await?;
    Ok(Json(enquiry))
}

/// Update the journey stage of the latest visit
pub async fn update_journey_stage(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(enquiry_id): Path<String>,
    Json(input): Json<JourneyStageInput>,
) -> AppResult<Json<Enquiry>> {
    let service = EnquiryService::new(state.db);
    let enquiry = service
        .update_journey_stage(&enquiry_id, &input.journey_stage)
        .await?;
    Ok(Json(enquiry))
}
