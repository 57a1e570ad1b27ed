//! Product catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog entry describing a sellable product
///
/// Catalog data is reference-only for the reconciliation engine: it is used
/// to enrich line items that omit name, category, or pricing fields and to
/// decide whether a product is tracked by serial number. The engine never
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
    /// Product category (e.g., "Hearing Aid", "Battery", "Accessory")
    pub category: String,
    /// Manufacturer / brand
    pub company: String,
    /// Maximum retail price
    pub mrp: Decimal,
    /// Price paid to the dealer, when known
    pub dealer_price: Option<Decimal>,
    /// Whether individual units carry unique serial numbers
    pub has_serial_number: bool,
}

impl ProductRef {
    /// Dealer price with MRP as a last resort for valuation display
    pub fn effective_dealer_price(&self) -> Decimal {
        self.dealer_price.unwrap_or(self.mrp)
    }
}
