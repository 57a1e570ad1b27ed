//! Canonical line items and identity keys
//!
//! Source documents disagree on field names (`productId` vs `id`,
//! `dealerPrice` vs `finalPrice`, serial lists vs a single serial). Each
//! source shape is converted into one canonical [`LineItem`] here, before
//! any merge logic runs, so the merge stages never branch on shape.

use rust_decimal::Decimal;

use crate::models::DocumentLine;

/// Resolve the product id of a line: `productId`, then the legacy `id`,
/// then the empty string
///
/// An empty product id degrades the composite key but is never fatal; the
/// unit surfaces downstream as an unknown-product line.
pub fn line_product_id(line: &DocumentLine) -> String {
    line.product_id
        .clone()
        .or_else(|| line.id.clone())
        .unwrap_or_default()
}

/// Composite identity of one physical serialized unit
///
/// Two records with the same key are the same unit, regardless of which
/// collection they came from.
pub fn stock_key(product_id: &str, serial_number: &str) -> String {
    format!("{}|{}", product_id, serial_number)
}

/// A line item in canonical form
#[derive(Debug, Clone, Default)]
pub struct LineItem {
    /// May be empty when the source line carried no product reference
    pub product_id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub mrp: Option<Decimal>,
    pub dealer_price: Option<Decimal>,
    pub quantity: Option<i64>,
    /// Empty for quantity-only lines
    pub serials: Vec<String>,
}

impl LineItem {
    /// Adapter for inward-receipt lines
    pub fn from_inward(line: &DocumentLine) -> Self {
        Self::from_trade(line)
    }

    /// Adapter for purchase lines
    pub fn from_purchase(line: &DocumentLine) -> Self {
        Self::from_trade(line)
    }

    /// Adapter for outward-dispatch lines
    pub fn from_dispatch(line: &DocumentLine) -> Self {
        Self::from_trade(line)
    }

    /// Adapter for sale lines, which carry at most one serial
    pub fn from_sale(line: &DocumentLine) -> Self {
        let serials = line
            .serial_number
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| vec![s.to_string()])
            .unwrap_or_default();
        Self {
            serials,
            ..Self::from_trade(line)
        }
    }

    /// Adapter for visit product lines: the sold serial, or the trial
    /// serial when the sale closed out of a trial
    pub fn from_visit(line: &DocumentLine) -> Self {
        let serials = line
            .serial_number
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| line.trial_serial_number.as_deref().filter(|s| !s.is_empty()))
            .map(|s| vec![s.to_string()])
            .unwrap_or_default();
        Self {
            serials,
            ..Self::from_trade(line)
        }
    }

    /// Shared shape of the three trade-document line variants
    fn from_trade(line: &DocumentLine) -> Self {
        Self {
            product_id: line_product_id(line),
            name: line.name.clone(),
            category: line.category.clone(),
            mrp: line.mrp,
            dealer_price: line.dealer_price.or(line.final_price),
            quantity: line.quantity,
            serials: line.serial_numbers.clone().unwrap_or_default(),
        }
    }

    /// Whether this line contributes serialized units (as opposed to the
    /// non-serial quantity ledger)
    pub fn is_serialized(&self) -> bool {
        !self.serials.is_empty()
    }

    /// Quantity for ledger accumulation; absent quantities count as one
    pub fn effective_quantity(&self) -> i64 {
        self.quantity.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentLine;
    use rust_decimal::Decimal;

    fn line(product_id: Option<&str>, id: Option<&str>) -> DocumentLine {
        DocumentLine {
            product_id: product_id.map(String::from),
            id: id.map(String::from),
            ..DocumentLine::default()
        }
    }

    #[test]
    fn product_id_prefers_product_id_over_legacy_id() {
        assert_eq!(line_product_id(&line(Some("P1"), Some("P2"))), "P1");
        assert_eq!(line_product_id(&line(None, Some("P2"))), "P2");
        assert_eq!(line_product_id(&line(None, None)), "");
    }

    #[test]
    fn key_is_pipe_joined() {
        assert_eq!(stock_key("P1", "SN1"), "P1|SN1");
        assert_eq!(stock_key("", "SN1"), "|SN1");
    }

    #[test]
    fn sale_adapter_drops_empty_serial() {
        let mut l = line(Some("P1"), None);
        l.serial_number = Some(String::new());
        assert!(LineItem::from_sale(&l).serials.is_empty());
        l.serial_number = Some("SN9".to_string());
        assert_eq!(LineItem::from_sale(&l).serials, vec!["SN9".to_string()]);
    }

    #[test]
    fn visit_adapter_falls_back_to_trial_serial() {
        let mut l = line(Some("P1"), None);
        l.trial_serial_number = Some("TR1".to_string());
        assert_eq!(LineItem::from_visit(&l).serials, vec!["TR1".to_string()]);
        l.serial_number = Some("SN1".to_string());
        assert_eq!(LineItem::from_visit(&l).serials, vec!["SN1".to_string()]);
    }

    #[test]
    fn dealer_price_falls_back_to_final_price() {
        let mut l = line(Some("P1"), None);
        l.final_price = Some(Decimal::new(750, 0));
        assert_eq!(
            LineItem::from_purchase(&l).dealer_price,
            Some(Decimal::new(750, 0))
        );
        l.dealer_price = Some(Decimal::new(800, 0));
        assert_eq!(
            LineItem::from_purchase(&l).dealer_price,
            Some(Decimal::new(800, 0))
        );
    }
}
