//! Party (vendor/customer) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A business party: a vendor the clinic buys from or a customer it sells to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: Uuid,
    pub name: String,
    pub party_type: PartyType,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    /// GST identification number for vendors
    pub gstin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role a party plays in trade documents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartyType {
    Vendor,
    Customer,
    Both,
}

impl PartyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyType::Vendor => "vendor",
            PartyType::Customer => "customer",
            PartyType::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "vendor" => Some(PartyType::Vendor),
            "customer" => Some(PartyType::Customer),
            "both" => Some(PartyType::Both),
            _ => None,
        }
    }
}

impl std::fmt::Display for PartyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartyType::Vendor => write!(f, "Vendor"),
            PartyType::Customer => write!(f, "Customer"),
            PartyType::Both => write!(f, "Vendor & Customer"),
        }
    }
}
