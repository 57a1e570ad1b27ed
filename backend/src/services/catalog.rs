//! Product catalog service
//!
//! The catalog is reference data: the reconciliation engine reads it for
//! enrichment and the serial-tracked flag, but never writes it. All write
//! operations here touch the catalog only.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::ProductRef;
use shared::validation::{validate_price, validate_price_pair};

/// Product catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Input for creating a catalog entry
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub category: String,
    pub company: String,
    pub mrp: Decimal,
    pub dealer_price: Option<Decimal>,
    pub has_serial_number: bool,
}

/// Input for updating a catalog entry
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub mrp: Option<Decimal>,
    pub dealer_price: Option<Decimal>,
    pub has_serial_number: Option<bool>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    category: String,
    company: String,
    mrp: Decimal,
    dealer_price: Option<Decimal>,
    has_serial_number: bool,
}

impl From<ProductRow> for ProductRef {
    fn from(r: ProductRow) -> Self {
        ProductRef {
            id: r.id,
            name: r.name,
            category: r.category,
            company: r.company,
            mrp: r.mrp,
            dealer_price: r.dealer_price,
            has_serial_number: r.has_serial_number,
        }
    }
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List catalog entries, optionally filtered by a name/company search
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<ProductRef>> {
        let rows = match search {
            Some(term) if !term.is_empty() => {
                let pattern = format!("%{}%", term);
                sqlx::query_as::<_, ProductRow>(
                    r#"
                    SELECT id, name, category, company, mrp, dealer_price, has_serial_number
                    FROM products
                    WHERE name ILIKE $1 OR company ILIKE $1 OR category ILIKE $1
                    ORDER BY name
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.db)
                .await?
            }
            _ => {
                sqlx::query_as::<_, ProductRow>(
                    r#"
                    SELECT id, name, category, company, mrp, dealer_price, has_serial_number
                    FROM products
                    ORDER BY name
                    "#,
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(ProductRef::from).collect())
    }

    /// Get a single catalog entry
    pub async fn get(&self, product_id: &str) -> AppResult<ProductRef> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, category, company, mrp, dealer_price, has_serial_number
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Create a catalog entry
    pub async fn create(&self, input: CreateProductInput) -> AppResult<ProductRef> {
        validate_pricing(input.mrp, input.dealer_price)?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
            });
        }

        let id = Uuid::new_v4().to_string();
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, name, category, company, mrp, dealer_price, has_serial_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, category, company, mrp, dealer_price, has_serial_number
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(&input.company)
        .bind(input.mrp)
        .bind(input.dealer_price)
        .bind(input.has_serial_number)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a catalog entry
    pub async fn update(&self, product_id: &str, input: UpdateProductInput) -> AppResult<ProductRef> {
        let existing = self.get(product_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let category = input.category.unwrap_or(existing.category);
        let company = input.company.unwrap_or(existing.company);
        let mrp = input.mrp.unwrap_or(existing.mrp);
        let dealer_price = input.dealer_price.or(existing.dealer_price);
        let has_serial_number = input.has_serial_number.unwrap_or(existing.has_serial_number);

        validate_pricing(mrp, dealer_price)?;

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = $1, category = $2, company = $3, mrp = $4, dealer_price = $5,
                has_serial_number = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id, name, category, company, mrp, dealer_price, has_serial_number
            "#,
        )
        .bind(&name)
        .bind(&category)
        .bind(&company)
        .bind(mrp)
        .bind(dealer_price)
        .bind(has_serial_number)
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a catalog entry
    pub async fn delete(&self, product_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }
}

fn validate_pricing(mrp: Decimal, dealer_price: Option<Decimal>) -> AppResult<()> {
    match dealer_price {
        Some(dealer) => validate_price_pair(dealer, mrp),
        None => validate_price(mrp),
    }
    .map_err(|msg| AppError::Validation {
        field: "mrp".to_string(),
        message: msg.to_string(),
    })
}
