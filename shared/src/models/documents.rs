//! Trade document models
//!
//! These are the four event collections the stock reconciliation engine
//! scans: material inward receipts, vendor purchases, material outward
//! dispatches, and sales. Line items keep the camelCase field names of the
//! legacy document store, which is also why a product reference may appear
//! under `productId` or `id` depending on the document's age.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Embedded reference to a party inside a trade document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyRef {
    #[serde(default)]
    pub name: String,
}

impl PartyRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One line of a trade document
///
/// Every field is optional: older documents omit whole groups of fields and
/// the engine degrades rather than rejects. Prices may live under
/// `dealerPrice` or `finalPrice`; serialized goods carry `serialNumbers`
/// (trade documents) or a single `serialNumber` (sales and visit lines).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentLine {
    pub product_id: Option<String>,
    /// Legacy alias for the product reference
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub mrp: Option<Decimal>,
    pub dealer_price: Option<Decimal>,
    pub final_price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub serial_numbers: Option<Vec<String>>,
    pub serial_number: Option<String>,
    pub trial_serial_number: Option<String>,
}

/// A warehouse-in document recording goods received against a challan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InwardReceipt {
    pub id: String,
    pub received_date: Option<NaiveDate>,
    pub supplier: Option<PartyRef>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub challan_number: Option<String>,
    #[serde(default)]
    pub products: Vec<DocumentLine>,
}

/// A vendor purchase invoice, the second inbound path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub purchase_date: Option<NaiveDate>,
    pub party: Option<PartyRef>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub invoice_no: Option<String>,
    #[serde(default)]
    pub products: Vec<DocumentLine>,
}

/// A warehouse-out document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutwardDispatch {
    pub id: String,
    pub status: DispatchStatus,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub dispatch_date: Option<NaiveDate>,
    #[serde(default)]
    pub products: Vec<DocumentLine>,
}

/// Reservation state of an outward dispatch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Pending,
    Dispatched,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Pending => "pending",
            DispatchStatus::Dispatched => "dispatched",
        }
    }
}

/// A direct sale document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: String,
    pub sale_date: Option<NaiveDate>,
    pub customer: Option<PartyRef>,
    pub location: Option<String>,
    #[serde(default)]
    pub products: Vec<DocumentLine>,
}
