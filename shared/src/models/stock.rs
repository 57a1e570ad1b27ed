//! Derived stock entities
//!
//! Nothing in this module is stored. Units and non-serial lines are
//! recomputed from the source document collections on every reconciliation
//! pass; see [`crate::reconcile`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status of a serialized unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Sold,
    /// Representable but currently never produced: no source collection
    /// records damage, so counts stay at zero
    Damaged,
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "In Stock"),
            StockStatus::Sold => write!(f, "Sold"),
            StockStatus::Damaged => write!(f, "Damaged"),
        }
    }
}

/// Which inbound collection a unit or ledger line came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockSource {
    Inward,
    Purchase,
}

/// One physical serialized unit, derived per reconciliation pass
///
/// Identity is the `product_id + "|" + serial_number` composite key; two
/// records sharing a key are the same physical unit. Units are created
/// once per pass and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockUnit {
    pub key: String,
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub company: String,
    pub location: String,
    pub serial_number: String,
    pub status: StockStatus,
    pub dealer_price: Decimal,
    pub mrp: Decimal,
    pub purchase_date: Option<NaiveDate>,
    /// Challan number (inward) or invoice number (purchase)
    pub purchase_invoice: Option<String>,
    pub supplier: Option<String>,
    /// Back-reference to the originating document, when linkable
    pub source: Option<StockSource>,
    pub source_doc_id: Option<String>,
}

/// Remaining quantity of a product not tracked by serial numbers
///
/// Materialized only while `quantity > 0` and the catalog does not flag the
/// product as serial-tracked. Provenance fields come from the most recent
/// inbound record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NonSerialStock {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub company: String,
    pub mrp: Decimal,
    pub dealer_price: Decimal,
    pub quantity: i64,
    pub last_supplier: Option<String>,
    pub last_invoice: Option<String>,
    pub last_date: Option<NaiveDate>,
    pub last_location: Option<String>,
    pub last_source: Option<StockSource>,
    pub last_source_doc_id: Option<String>,
}

/// Summary statistics over one reconciled stock view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockSummary {
    /// Serialized units plus non-serial lines
    pub total_items: i64,
    /// Units in stock plus remaining non-serial quantities
    pub in_stock: i64,
    pub sold: i64,
    /// Dealer-price value of everything counted in stock
    pub inventory_value: Decimal,
}
