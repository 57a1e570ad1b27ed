//! Party (vendor/customer) service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Party, PartyType};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_email, validate_phone};

/// Party management service
#[derive(Clone)]
pub struct PartyService {
    db: PgPool,
}

/// Input for creating a party
#[derive(Debug, Deserialize)]
pub struct CreatePartyInput {
    pub name: String,
    pub party_type: PartyType,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub gstin: Option<String>,
}

/// Input for updating a party
#[derive(Debug, Deserialize)]
pub struct UpdatePartyInput {
    pub name: Option<String>,
    pub party_type: Option<PartyType>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub gstin: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct PartyRow {
    id: Uuid,
    name: String,
    party_type: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    city: Option<String>,
    gstin: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PartyRow> for Party {
    fn from(r: PartyRow) -> Self {
        Party {
            id: r.id,
            name: r.name,
            party_type: PartyType::parse(&r.party_type).unwrap_or(PartyType::Vendor),
            contact_person: r.contact_person,
            phone: r.phone,
            email: r.email,
            address: r.address,
            city: r.city,
            gstin: r.gstin,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const PARTY_COLUMNS: &str = "id, name, party_type, contact_person, phone, email, address, city, gstin, created_at, updated_at";

impl PartyService {
    /// Create a new PartyService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List parties with pagination and optional name search
    pub async fn list(
        &self,
        pagination: &Pagination,
        search: Option<&str>,
    ) -> AppResult<PaginatedResponse<Party>> {
        let pattern = search
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let total: i64 = match &pattern {
            Some(p) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM parties WHERE name ILIKE $1 OR city ILIKE $1")
                    .bind(p)
                    .fetch_one(&self.db)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM parties")
                    .fetch_one(&self.db)
                    .await?
            }
        };

        let rows = match &pattern {
            Some(p) => {
                sqlx::query_as::<_, PartyRow>(&format!(
                    "SELECT {} FROM parties WHERE name ILIKE $1 OR city ILIKE $1 ORDER BY name LIMIT $2 OFFSET $3",
                    PARTY_COLUMNS
                ))
                .bind(p)
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, PartyRow>(&format!(
                    "SELECT {} FROM parties ORDER BY name LIMIT $1 OFFSET $2",
                    PARTY_COLUMNS
                ))
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(PaginatedResponse {
            data: rows.into_iter().map(Party::from).collect(),
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Get a single party
    pub async fn get(&self, party_id: Uuid) -> AppResult<Party> {
        let row = sqlx::query_as::<_, PartyRow>(&format!(
            "SELECT {} FROM parties WHERE id = $1",
            PARTY_COLUMNS
        ))
        .bind(party_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Party".to_string()))?;

        Ok(row.into())
    }

    /// Create a party
    pub async fn create(&self, input: CreatePartyInput) -> AppResult<Party> {
        validate_contact(&input.phone, &input.email)?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Party name is required".to_string(),
            });
        }

        let row = sqlx::query_as::<_, PartyRow>(&format!(
            r#"
            INSERT INTO parties (name, party_type, contact_person, phone, email, address, city, gstin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PARTY_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(input.party_type.as_str())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.gstin)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a party
    pub async fn update(&self, party_id: Uuid, input: UpdatePartyInput) -> AppResult<Party> {
        let existing = self.get(party_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let party_type = input.party_type.unwrap_or(existing.party_type);
        let contact_person = input.contact_person.or(existing.contact_person);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);
        let address = input.address.or(existing.address);
        let city = input.city.or(existing.city);
        let gstin = input.gstin.or(existing.gstin);

        validate_contact(&phone, &email)?;

        let row = sqlx::query_as::<_, PartyRow>(&format!(
            r#"
            UPDATE parties
            SET name = $1, party_type = $2, contact_person = $3, phone = $4, email = $5,
                address = $6, city = $7, gstin = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            PARTY_COLUMNS
        ))
        .bind(&name)
        .bind(party_type.as_str())
        .bind(&contact_person)
        .bind(&phone)
        .bind(&email)
        .bind(&address)
        .bind(&city)
        .bind(&gstin)
        .bind(party_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a party
    pub async fn delete(&self, party_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM parties WHERE id = $1")
            .bind(party_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Party".to_string()));
        }
        Ok(())
    }
}

fn validate_contact(phone: &Option<String>, email: &Option<String>) -> AppResult<()> {
    if let Some(phone) = phone.as_deref().filter(|p| !p.is_empty()) {
        validate_phone(phone).map_err(|msg| AppError::Validation {
            field: "phone".to_string(),
            message: msg.to_string(),
        })?;
    }
    if let Some(email) = email.as_deref().filter(|e| !e.is_empty()) {
        validate_email(email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
    }
    Ok(())
}
