//! Trade document service
//!
//! Create and list operations for the four event collections the stock
//! engine scans. Documents are immutable once recorded; corrections are
//! entered as new documents, which is what keeps the derived stock view
//! reproducible.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    DispatchStatus, DocumentLine, InwardReceipt, OutwardDispatch, PartyRef, Purchase, SaleRecord,
};
use shared::validation::{validate_quantity, validate_serial_number};

/// Trade document service
#[derive(Clone)]
pub struct DocumentService {
    db: PgPool,
}

/// Input for recording a material inward receipt
#[derive(Debug, Deserialize)]
pub struct CreateInwardInput {
    pub received_date: Option<NaiveDate>,
    pub supplier_name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub challan_number: Option<String>,
    pub products: Vec<DocumentLine>,
}

/// Input for recording a vendor purchase
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub purchase_date: Option<NaiveDate>,
    pub party_name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub invoice_no: Option<String>,
    pub products: Vec<DocumentLine>,
}

/// Input for recording a material outward dispatch
#[derive(Debug, Deserialize)]
pub struct CreateDispatchInput {
    pub status: DispatchStatus,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub dispatch_date: Option<NaiveDate>,
    pub products: Vec<DocumentLine>,
}

/// Input for recording a direct sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub sale_date: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub location: Option<String>,
    pub products: Vec<DocumentLine>,
}

impl DocumentService {
    /// Create a new DocumentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a material inward receipt
    pub async fn create_inward(&self, input: CreateInwardInput) -> AppResult<InwardReceipt> {
        validate_lines(&input.products)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO material_inward
                (id, received_date, supplier_name, company, location, challan_number, products)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&id)
        .bind(input.received_date)
        .bind(&input.supplier_name)
        .bind(&input.company)
        .bind(&input.location)
        .bind(&input.challan_number)
        .bind(Json(&input.products))
        .execute(&self.db)
        .await?;

        Ok(InwardReceipt {
            id,
            received_date: input.received_date,
            supplier: input.supplier_name.map(PartyRef::named),
            company: input.company,
            location: input.location,
            challan_number: input.challan_number,
            products: input.products,
        })
    }

    /// List inward receipts, newest first
    pub async fn list_inward(&self) -> AppResult<Vec<InwardReceipt>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            received_date: Option<NaiveDate>,
            supplier_name: Option<String>,
            company: Option<String>,
            location: Option<String>,
            challan_number: Option<String>,
            products: Json<Vec<DocumentLine>>,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT id, received_date, supplier_name, company, location, challan_number, products
            FROM material_inward
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| InwardReceipt {
                id: r.id,
                received_date: r.received_date,
                supplier: r.supplier_name.map(PartyRef::named),
                company: r.company,
                location: r.location,
                challan_number: r.challan_number,
                products: r.products.0,
            })
            .collect())
    }

    /// Record a vendor purchase
    pub async fn create_purchase(&self, input: CreatePurchaseInput) -> AppResult<Purchase> {
        validate_lines(&input.products)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO purchases
                (id, purchase_date, party_name, company, location, invoice_no, products)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&id)
        .bind(input.purchase_date)
        .bind(&input.party_name)
        .bind(&input.company)
        .bind(&input.location)
        .bind(&input.invoice_no)
        .bind(Json(&input.products))
        .execute(&self.db)
        .await?;

        Ok(Purchase {
            id,
            purchase_date: input.purchase_date,
            party: input.party_name.map(PartyRef::named),
            company: input.company,
            location: input.location,
            invoice_no: input.invoice_no,
            products: input.products,
        })
    }

    /// List purchases, newest first
    pub async fn list_purchases(&self) -> AppResult<Vec<Purchase>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            purchase_date: Option<NaiveDate>,
            party_name: Option<String>,
            company: Option<String>,
            location: Option<String>,
            invoice_no: Option<String>,
            products: Json<Vec<DocumentLine>>,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT id, purchase_date, party_name, company, location, invoice_no, products
            FROM purchases
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Purchase {
                id: r.id,
                purchase_date: r.purchase_date,
                party: r.party_name.map(PartyRef::named),
                company: r.company,
                location: r.location,
                invoice_no: r.invoice_no,
                products: r.products.0,
            })
            .collect())
    }

    /// Record a material outward dispatch
    pub async fn create_dispatch(&self, input: CreateDispatchInput) -> AppResult<OutwardDispatch> {
        validate_lines(&input.products)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO materials_out (id, status, notes, location, dispatch_date, products)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&id)
        .bind(input.status.as_str())
        .bind(&input.notes)
        .bind(&input.location)
        .bind(input.dispatch_date)
        .bind(Json(&input.products))
        .execute(&self.db)
        .await?;

        Ok(OutwardDispatch {
            id,
            status: input.status,
            notes: input.notes,
            location: input.location,
            dispatch_date: input.dispatch_date,
            products: input.products,
        })
    }

    /// List outward dispatches, newest first
    pub async fn list_dispatches(&self) -> AppResult<Vec<OutwardDispatch>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            status: String,
            notes: Option<String>,
            location: Option<String>,
            dispatch_date: Option<NaiveDate>,
            products: Json<Vec<DocumentLine>>,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT id, status, notes, location, dispatch_date, products
            FROM materials_out
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| OutwardDispatch {
                id: r.id,
                status: match r.status.as_str() {
                    "dispatched" => DispatchStatus::Dispatched,
                    _ => DispatchStatus::Pending,
                },
                notes: r.notes,
                location: r.location,
                dispatch_date: r.dispatch_date,
                products: r.products.0,
            })
            .collect())
    }

    /// Mark a pending dispatch as dispatched
    pub async fn mark_dispatched(&self, dispatch_id: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE materials_out SET status = 'dispatched' WHERE id = $1 AND status = 'pending'",
        )
        .bind(dispatch_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pending dispatch".to_string()));
        }
        Ok(())
    }

    /// Record a direct sale
    pub async fn create_sale(&self, input: CreateSaleInput) -> AppResult<SaleRecord> {
        validate_lines(&input.products)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO sales (id, sale_date, customer_name, location, products)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&id)
        .bind(input.sale_date)
        .bind(&input.customer_name)
        .bind(&input.location)
        .bind(Json(&input.products))
        .execute(&self.db)
        .await?;

        Ok(SaleRecord {
            id,
            sale_date: input.sale_date,
            customer: input.customer_name.map(PartyRef::named),
            location: input.location,
            products: input.products,
        })
    }

    /// List sales, newest first
    pub async fn list_sales(&self) -> AppResult<Vec<SaleRecord>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            sale_date: Option<NaiveDate>,
            customer_name: Option<String>,
            location: Option<String>,
            products: Json<Vec<DocumentLine>>,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT id, sale_date, customer_name, location, products
            FROM sales
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SaleRecord {
                id: r.id,
                sale_date: r.sale_date,
                customer: r.customer_name.map(PartyRef::named),
                location: r.location,
                products: r.products.0,
            })
            .collect())
    }
}

/// Validate document lines at the write path
///
/// The engine tolerates anything already stored; new documents are held to
/// a stricter standard so the degraded paths stay legacy-only.
fn validate_lines(lines: &[DocumentLine]) -> AppResult<()> {
    for line in lines {
        if let Some(quantity) = line.quantity {
            validate_quantity(quantity).map_err(|msg| AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
            })?;
        }
        if let Some(serials) = &line.serial_numbers {
            for serial in serials {
                validate_serial_number(serial).map_err(|msg| AppError::Validation {
                    field: "serial_numbers".to_string(),
                    message: msg.to_string(),
                })?;
            }
        }
        if let Some(serial) = &line.serial_number {
            validate_serial_number(serial).map_err(|msg| AppError::Validation {
                field: "serial_number".to_string(),
                message: msg.to_string(),
            })?;
        }
    }
    Ok(())
}
