//! Stock reconciliation service
//!
//! There is no stock table to query. Each request fetches the five source
//! collections concurrently, hands the fully-materialized snapshot to the
//! pure engine in `shared::reconcile`, and serves views over the result.
//! A pass either completes over all five snapshots or is abandoned whole;
//! partial results are never served.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{types::Json, FromRow, PgPool};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::models::{
    DispatchStatus, DocumentLine, Enquiry, InwardReceipt, NonSerialStock, OutwardDispatch,
    PartyRef, ProductRef, Purchase, SaleRecord, StockSummary, StockUnit, Visit,
};
use shared::reconcile::{
    self, filter_non_serial, filter_units, group_by_category, summarize, CategoryGroup,
    Reconciliation, ReconcileOptions, SourceSnapshot, StockFilter,
};

/// Inventory service deriving stock views on demand
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    options: ReconcileOptions,
}

/// A filtered stock view served to clients
#[derive(Debug, Serialize)]
pub struct StockView {
    pub units: Vec<StockUnit>,
    pub non_serial: Vec<NonSerialStock>,
    /// Summary over the filtered view
    pub summary: StockSummary,
    pub reservations: ReservationsView,
}

/// Dispatch reservation sets, sorted for stable output
#[derive(Debug, Serialize)]
pub struct ReservationsView {
    pub pending: Vec<String>,
    pub dispatched: Vec<String>,
}

/// One row of the CSV stock export
#[derive(Debug, Serialize)]
struct StockCsvRow {
    product_name: String,
    category: String,
    company: String,
    location: String,
    serial_number: String,
    status: String,
    quantity: i64,
    dealer_price: Decimal,
    mrp: Decimal,
    purchase_date: Option<NaiveDate>,
    purchase_invoice: String,
    supplier: String,
}

#[derive(Debug, FromRow)]
struct InwardRow {
    id: String,
    received_date: Option<NaiveDate>,
    supplier_name: Option<String>,
    company: Option<String>,
    location: Option<String>,
    challan_number: Option<String>,
    products: Json<Vec<DocumentLine>>,
}

#[derive(Debug, FromRow)]
struct PurchaseRow {
    id: String,
    purchase_date: Option<NaiveDate>,
    party_name: Option<String>,
    company: Option<String>,
    location: Option<String>,
    invoice_no: Option<String>,
    products: Json<Vec<DocumentLine>>,
}

#[derive(Debug, FromRow)]
struct DispatchRow {
    id: String,
    status: String,
    notes: Option<String>,
    location: Option<String>,
    dispatch_date: Option<NaiveDate>,
    products: Json<Vec<DocumentLine>>,
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    sale_date: Option<NaiveDate>,
    customer_name: Option<String>,
    location: Option<String>,
    products: Json<Vec<DocumentLine>>,
}

#[derive(Debug, FromRow)]
struct EnquiryRow {
    id: String,
    patient_name: String,
    phone: Option<String>,
    age: Option<i32>,
    address: Option<String>,
    referred_by: Option<String>,
    visits: Json<Vec<Visit>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    category: String,
    company: String,
    mrp: Decimal,
    dealer_price: Option<Decimal>,
    has_serial_number: bool,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            options: ReconcileOptions {
                head_office_location: config.inventory.head_office_location.clone(),
            },
        }
    }

    /// Run one full reconciliation pass
    pub async fn reconcile(&self) -> AppResult<Reconciliation> {
        let snapshot = self.fetch_snapshot().await.map_err(|e| {
            tracing::error!("Source fetch failed, abandoning reconciliation pass: {}", e);
            AppError::InventoryLoad(e.to_string())
        })?;

        tracing::debug!(
            inward = snapshot.inward_receipts.len(),
            purchases = snapshot.purchases.len(),
            dispatches = snapshot.dispatches.len(),
            sales = snapshot.sales.len(),
            enquiries = snapshot.enquiries.len(),
            "Reconciling stock"
        );

        Ok(reconcile::reconcile(&snapshot, &self.options))
    }

    /// Filtered stock view; filtering is pure and never re-fetches
    pub async fn stock(&self, filter: &StockFilter) -> AppResult<StockView> {
        let result = self.reconcile().await?;
        let units = filter_units(&result.units, filter);
        let non_serial = filter_non_serial(&result.non_serial, filter);
        let summary = if filter.is_empty() {
            result.summary
        } else {
            summarize(&units, &non_serial)
        };

        let mut pending: Vec<String> = result.reservations.pending.into_iter().collect();
        let mut dispatched: Vec<String> = result.reservations.dispatched.into_iter().collect();
        pending.sort();
        dispatched.sort();

        Ok(StockView {
            units,
            non_serial,
            summary,
            reservations: ReservationsView {
                pending,
                dispatched,
            },
        })
    }

    /// Summary statistics over the unfiltered view
    pub async fn summary(&self) -> AppResult<StockSummary> {
        Ok(self.reconcile().await?.summary)
    }

    /// Category -> product -> serial drill-down
    pub async fn grouped(&self) -> AppResult<Vec<CategoryGroup>> {
        let result = self.reconcile().await?;
        Ok(group_by_category(&result.units, &result.non_serial))
    }

    /// Export the filtered stock view as CSV
    pub async fn export_csv(&self, filter: &StockFilter) -> AppResult<String> {
        let result = self.reconcile().await?;
        let units = filter_units(&result.units, filter);
        let non_serial = filter_non_serial(&result.non_serial, filter);

        let rows = units
            .iter()
            .map(|u| StockCsvRow {
                product_name: u.product_name.clone(),
                category: u.category.clone(),
                company: u.company.clone(),
                location: u.location.clone(),
                serial_number: u.serial_number.clone(),
                status: u.status.to_string(),
                quantity: 1,
                dealer_price: u.dealer_price,
                mrp: u.mrp,
                purchase_date: u.purchase_date,
                purchase_invoice: u.purchase_invoice.clone().unwrap_or_default(),
                supplier: u.supplier.clone().unwrap_or_default(),
            })
            .chain(non_serial.iter().map(|l| StockCsvRow {
                product_name: l.product_name.clone(),
                category: l.category.clone(),
                company: l.company.clone(),
                location: l.last_location.clone().unwrap_or_default(),
                serial_number: String::new(),
                status: shared::models::StockStatus::InStock.to_string(),
                quantity: l.quantity,
                dealer_price: l.dealer_price,
                mrp: l.mrp,
                purchase_date: l.last_date,
                purchase_invoice: l.last_invoice.clone().unwrap_or_default(),
                supplier: l.last_supplier.clone().unwrap_or_default(),
            }));

        let mut wtr = csv::Writer::from_writer(vec![]);
        for row in rows {
            wtr.serialize(row)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }

    /// Fetch all source collections concurrently
    ///
    /// The merge only starts once every fetch has completed; there is no
    /// ordering dependency between the fetches themselves.
    async fn fetch_snapshot(&self) -> Result<SourceSnapshot, sqlx::Error> {
        let (products, inward_receipts, purchases, dispatches, sales, enquiries) = tokio::try_join!(
            self.fetch_products(),
            self.fetch_inward_receipts(),
            self.fetch_purchases(),
            self.fetch_dispatches(),
            self.fetch_sales(),
            self.fetch_enquiries(),
        )?;

        Ok(SourceSnapshot {
            products,
            inward_receipts,
            purchases,
            dispatches,
            sales,
            enquiries,
        })
    }

    async fn fetch_products(&self) -> Result<Vec<ProductRef>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, category, company, mrp, dealer_price, has_serial_number
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductRef {
                id: r.id,
                name: r.name,
                category: r.category,
                company: r.company,
                mrp: r.mrp,
                dealer_price: r.dealer_price,
                has_serial_number: r.has_serial_number,
            })
            .collect())
    }

    async fn fetch_inward_receipts(&self) -> Result<Vec<InwardReceipt>, sqlx::Error> {
        let rows = sqlx::query_as::<_, InwardRow>(
            r#"
            SELECT id, received_date, supplier_name, company, location, challan_number, products
            FROM material_inward
            ORDER BY created_at, id
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

    async fn fetch_purchases(&self) -> Result<Vec<Purchase>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, purchase_date, party_name, company, location, invoice_no, products
            FROM purchases
            ORDER BY created_at, id
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

    async fn fetch_dispatches(&self) -> Result<Vec<OutwardDispatch>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DispatchRow>(
            r#"
            SELECT id, status, notes, location, dispatch_date, products
            FROM materials_out
            ORDER BY created_at, id
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

    async fn fetch_sales(&self) -> Result<Vec<SaleRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, sale_date, customer_name, location, products
            FROM sales
            ORDER BY created_at, id
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

    async fn fetch_enquiries(&self) -> Result<Vec<Enquiry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, EnquiryRow>(
            r#"
            SELECT id, patient_name, phone, age, address, referred_by, visits,
                   created_at, updated_at
            FROM enquiries
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Enquiry {
                id: r.id,
                patient_name: r.patient_name,
                phone: r.phone,
                age: r.age,
                address: r.address,
                referred_by: r.referred_by,
                visits: r.visits.0,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }
}
