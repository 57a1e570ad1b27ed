//! Patient enquiry service
//!
//! Enquiries carry their visit history as an embedded document array. The
//! stock engine reads the same documents as its visit-sale source, so
//! visits are append-only here: editing history would silently rewrite
//! derived stock.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Enquiry, Visit};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_phone, validate_serial_number};

/// Patient enquiry service
#[derive(Clone)]
pub struct EnquiryService {
    db: PgPool,
}

/// Input for creating an enquiry
#[derive(Debug, Deserialize)]
pub struct CreateEnquiryInput {
    pub patient_name: String,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub referred_by: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct EnquiryRow {
    id: String,
    patient_name: String,
    phone: Option<String>,
    age: Option<i32>,
    address: Option<String>,
    referred_by: Option<String>,
    visits: Json<Vec<Visit>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EnquiryRow> for Enquiry {
    fn from(r: EnquiryRow) -> Self {
        Enquiry {
            id: r.id,
            patient_name: r.patient_name,
            phone: r.phone,
            age: r.age,
            address: r.address,
            referred_by: r.referred_by,
            visits: r.visits.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const ENQUIRY_COLUMNS: &str =
    "id, patient_name, phone, age, address, referred_by, visits, created_at, updated_at";

impl EnquiryService {
    /// Create a new EnquiryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an enquiry with an empty visit history
    pub async fn create(&self, input: CreateEnquiryInput) -> AppResult<Enquiry> {
        if input.patient_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "patient_name".to_string(),
                message: "Patient name is required".to_string(),
            });
        }
        if let Some(phone) = input.phone.as_deref().filter(|p| !p.is_empty()) {
            validate_phone(phone).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
            })?;
        }

        let id = Uuid::new_v4().to_string();
        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            r#"
            INSERT INTO enquiries (id, patient_name, phone, age, address, referred_by, visits)
            VALUES ($1, $2, $3, $4, $5, $6, '[]'::jsonb)
            RETURNING {}
            "#,
            ENQUIRY_COLUMNS
        ))
        .bind(&id)
        .bind(input.patient_name.trim())
        .bind(&input.phone)
        .bind(input.age)
        .bind(&input.address)
        .bind(&input.referred_by)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List enquiries with pagination and optional patient search
    pub async fn list(
        &self,
        pagination: &Pagination,
        search: Option<&str>,
    ) -> AppResult<PaginatedResponse<Enquiry>> {
        let pattern = search
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let total: i64 = match &pattern {
            Some(p) => sqlx::query_scalar(
                "SELECT COUNT(*) FROM enquiries WHERE patient_name ILIKE $1 OR phone ILIKE $1",
            )
            .bind(p)
            .fetch_one(&self.db)
            .await?,
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM enquiries")
                    .fetch_one(&self.db)
                    .await?
            }
        };

        let rows = match &pattern {
            Some(p) => {
                sqlx::query_as::<_, EnquiryRow>(&format!(
                    r#"
                    SELECT {} FROM enquiries
                    WHERE patient_name ILIKE $1 OR phone ILIKE $1
                    ORDER BY created_at DESC LIMIT $2 OFFSET $3
                    "#,
                    ENQUIRY_COLUMNS
                ))
                .bind(p)
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, EnquiryRow>(&format!(
                    "SELECT {} FROM enquiries ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                    ENQUIRY_COLUMNS
                ))
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(PaginatedResponse {
            data: rows.into_iter().map(Enquiry::from).collect(),
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Get a single enquiry
    pub async fn get(&self, enquiry_id: &str) -> AppResult<Enquiry> {
        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            "SELECT {} FROM enquiries WHERE id = $1",
            ENQUIRY_COLUMNS
        ))
        .bind(enquiry_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Enquiry".to_string()))?;

        Ok(row.into())
    }

    /// Append a visit to an enquiry's history
    pub async fn add_visit(&self, enquiry_id: &str, visit: Visit) -> AppResult<Enquiry> {
        for line in &visit.products {
            for serial in line
                .serial_number
                .iter()
                .chain(line.trial_serial_number.iter())
            {
                validate_serial_number(serial).map_err(|msg| AppError::Validation {
                    field: "serial_number".to_string(),
                    message: msg.to_string(),
                })?;
            }
        }

        let mut enquiry = self.get(enquiry_id).await?;
        enquiry.visits.push(visit);

        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            r#"
            UPDATE enquiries SET visits = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            ENQUIRY_COLUMNS
        ))
        .bind(Json(&enquiry.visits))
        .bind(enquiry_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update the journey stage of the most recent visit
    pub async fn update_journey_stage(&self, enquiry_id: &str, stage: &str) -> AppResult<Enquiry> {
        let mut enquiry = self.get(enquiry_id).await?;
        let Some(last) = enquiry.visits.last_mut() else {
            return Err(AppError::Conflict {
                resource: "enquiry".to_string(),
                message: "Enquiry has no visits yet".to_string(),
            });
        };
        last.journey_stage = Some(stage.to_string());

        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            r#"
            UPDATE enquiries SET visits = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            ENQUIRY_COLUMNS
        ))
        .bind(Json(&enquiry.visits))
        .bind(enquiry_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }
}
