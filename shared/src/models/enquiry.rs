//! Patient enquiry and visit models
//!
//! An enquiry tracks one patient through the consultation journey. Visits
//! may embed product sales, which makes enquiries the fifth source the
//! stock reconciliation engine scans.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocumentLine;

/// A patient enquiry with its embedded visit history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: String,
    pub patient_name: String,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    /// Doctor or campaign that referred the patient
    pub referred_by: Option<String>,
    pub visits: Vec<Visit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One visit inside an enquiry
///
/// Stored as a legacy camelCase document. Several independent fields can
/// mark a visit as a sale; the reconciliation engine's visit-sale rule
/// interprets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Visit {
    pub visit_date: Option<NaiveDate>,
    pub hearing_aid_sale: Option<bool>,
    pub medical_services: Vec<String>,
    /// Consultation journey stage (e.g., "screening", "trial", "sale")
    pub journey_stage: Option<String>,
    pub hearing_aid_status: Option<String>,
    pub products: Vec<DocumentLine>,
    pub sales_after_tax: Option<Decimal>,
    pub gross_sales_before_tax: Option<Decimal>,
    pub notes: Option<String>,
}
