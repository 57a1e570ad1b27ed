//! Sold-set resolution
//!
//! A serial counts as sold if it appears in a sale document or in a
//! qualifying patient visit. The union of both sources is the sole
//! determinant of a unit's `Sold` status; no other signal overrides it.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::models::{Enquiry, SaleRecord, Visit};

use super::line::{stock_key, LineItem};

/// Medical-service entry that marks a hearing-aid sale
pub const SALE_SERVICE_MARKER: &str = "Hearing Aid Sale";

/// Journey stage reached when a sale closes
pub const SALE_JOURNEY_STAGE: &str = "sale";

/// Hearing-aid status set when the device is sold
pub const SOLD_HEARING_AID_STATUS: &str = "sold";

/// Decides whether a visit counts as a sale
///
/// Kept as a named strategy so the classification can be tested and
/// replaced without touching the merge engine.
pub trait VisitSaleRule {
    fn is_sale_visit(&self, visit: &Visit) -> bool;
}

/// The rule used in production
///
/// The final clause infers a sale from monetary totals. It can match a
/// visit whose revenue came from services while products were merely
/// trialled; callers that need stricter behavior supply their own rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardVisitSaleRule;

impl VisitSaleRule for StandardVisitSaleRule {
    fn is_sale_visit(&self, visit: &Visit) -> bool {
        if visit.hearing_aid_sale == Some(true) {
            return true;
        }
        if visit
            .medical_services
            .iter()
            .any(|s| s == SALE_SERVICE_MARKER)
        {
            return true;
        }
        if visit.journey_stage.as_deref() == Some(SALE_JOURNEY_STAGE) {
            return true;
        }
        if visit.hearing_aid_status.as_deref() == Some(SOLD_HEARING_AID_STATUS) {
            return true;
        }
        let has_revenue = visit.sales_after_tax.map_or(false, |v| v > Decimal::ZERO)
            || visit
                .gross_sales_before_tax
                .map_or(false, |v| v > Decimal::ZERO);
        !visit.products.is_empty() && has_revenue
    }
}

/// Union of the two "this serial was sold" signal sources
pub fn sold_keys(
    sales: &[SaleRecord],
    enquiries: &[Enquiry],
    rule: &dyn VisitSaleRule,
) -> HashSet<String> {
    let mut keys = HashSet::new();

    for sale in sales {
        for line in &sale.products {
            let item = LineItem::from_sale(line);
            for serial in &item.serials {
                keys.insert(stock_key(&item.product_id, serial));
            }
        }
    }

    for enquiry in enquiries {
        for visit in &enquiry.visits {
            if !rule.is_sale_visit(visit) {
                continue;
            }
            for line in &visit.products {
                let item = LineItem::from_visit(line);
                if item.product_id.is_empty() {
                    continue;
                }
                for serial in &item.serials {
                    keys.insert(stock_key(&item.product_id, serial));
                }
            }
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentLine, Enquiry, Visit};
    use rust_decimal::Decimal;

    fn visit() -> Visit {
        Visit::default()
    }

    fn product_line(product_id: &str, serial: &str) -> DocumentLine {
        DocumentLine {
            product_id: Some(product_id.to_string()),
            serial_number: Some(serial.to_string()),
            ..DocumentLine::default()
        }
    }

    #[test]
    fn explicit_flags_qualify() {
        let rule = StandardVisitSaleRule;

        let mut v = visit();
        v.hearing_aid_sale = Some(true);
        assert!(rule.is_sale_visit(&v));

        let mut v = visit();
        v.medical_services = vec!["Audiometry".to_string(), SALE_SERVICE_MARKER.to_string()];
        assert!(rule.is_sale_visit(&v));

        let mut v = visit();
        v.journey_stage = Some("sale".to_string());
        assert!(rule.is_sale_visit(&v));

        let mut v = visit();
        v.hearing_aid_status = Some("sold".to_string());
        assert!(rule.is_sale_visit(&v));
    }

    #[test]
    fn revenue_heuristic_needs_products_and_totals() {
        let rule = StandardVisitSaleRule;

        let mut v = visit();
        v.sales_after_tax = Some(Decimal::new(12500, 0));
        assert!(!rule.is_sale_visit(&v), "totals without products");

        v.products = vec![product_line("P1", "SN1")];
        assert!(rule.is_sale_visit(&v));

        let mut v = visit();
        v.products = vec![product_line("P1", "SN1")];
        assert!(!rule.is_sale_visit(&v), "products without totals");
    }

    #[test]
    fn visit_lines_need_product_and_serial() {
        let mut v = visit();
        v.hearing_aid_sale = Some(true);
        v.products = vec![
            product_line("P1", "SN1"),
            // no serial: feeds the quantity ledger, not the sold set
            DocumentLine {
                product_id: Some("P2".to_string()),
                ..DocumentLine::default()
            },
            // no product id: unusable for identity
            DocumentLine {
                serial_number: Some("SN2".to_string()),
                ..DocumentLine::default()
            },
        ];
        let enquiry = Enquiry {
            id: "E1".to_string(),
            patient_name: "Asha".to_string(),
            phone: None,
            age: None,
            address: None,
            referred_by: None,
            visits: vec![v],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let keys = sold_keys(&[], &[enquiry], &StandardVisitSaleRule);
        assert_eq!(keys.len(), 1);
        assert!(keys.contains("P1|SN1"));
    }
}
