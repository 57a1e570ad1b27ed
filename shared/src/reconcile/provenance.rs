//! Provenance backfill
//!
//! A unit can end a pass without a source link (its originating document
//! had no usable id). This pass matches the unit's invoice reference
//! against known challan and invoice numbers; a challan match wins, an
//! invoice match is the fallback, and units that still have no match stay
//! unlinked rather than erroring.

use std::collections::HashMap;

use crate::models::{InwardReceipt, Purchase, StockSource, StockUnit};

pub fn backfill_sources(
    units: &mut [StockUnit],
    inward_receipts: &[InwardReceipt],
    purchases: &[Purchase],
) {
    let mut by_challan: HashMap<&str, &str> = HashMap::new();
    for receipt in inward_receipts {
        if receipt.id.is_empty() {
            continue;
        }
        if let Some(challan) = receipt.challan_number.as_deref().filter(|c| !c.is_empty()) {
            // First document with a given challan number wins
            by_challan.entry(challan).or_insert(receipt.id.as_str());
        }
    }

    let mut by_invoice: HashMap<&str, &str> = HashMap::new();
    for purchase in purchases {
        if purchase.id.is_empty() {
            continue;
        }
        if let Some(invoice) = purchase.invoice_no.as_deref().filter(|i| !i.is_empty()) {
            by_invoice.entry(invoice).or_insert(purchase.id.as_str());
        }
    }

    for unit in units.iter_mut() {
        if unit.source.is_some() && unit.source_doc_id.is_some() {
            continue;
        }
        let Some(reference) = unit.purchase_invoice.as_deref().filter(|r| !r.is_empty()) else {
            continue;
        };
        if let Some(doc_id) = by_challan.get(reference) {
            unit.source = Some(StockSource::Inward);
            unit.source_doc_id = Some((*doc_id).to_string());
        } else if let Some(doc_id) = by_invoice.get(reference) {
            unit.source = Some(StockSource::Purchase);
            unit.source_doc_id = Some((*doc_id).to_string());
        }
        // Still unmatched: rendered as "not linkable" downstream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InwardReceipt, Purchase, StockSource, StockStatus, StockUnit};
    use rust_decimal::Decimal;

    fn unlinked_unit(invoice: Option<&str>) -> StockUnit {
        StockUnit {
            key: "P1|SN1".to_string(),
            product_id: "P1".to_string(),
            product_name: String::new(),
            category: String::new(),
            company: String::new(),
            location: "Head Office".to_string(),
            serial_number: "SN1".to_string(),
            status: StockStatus::InStock,
            dealer_price: Decimal::ZERO,
            mrp: Decimal::ZERO,
            purchase_date: None,
            purchase_invoice: invoice.map(String::from),
            supplier: None,
            source: None,
            source_doc_id: None,
        }
    }

    fn receipt(id: &str, challan: &str) -> InwardReceipt {
        InwardReceipt {
            id: id.to_string(),
            received_date: None,
            supplier: None,
            company: None,
            location: None,
            challan_number: Some(challan.to_string()),
            products: vec![],
        }
    }

    fn purchase(id: &str, invoice: &str) -> Purchase {
        Purchase {
            id: id.to_string(),
            purchase_date: None,
            party: None,
            company: None,
            location: None,
            invoice_no: Some(invoice.to_string()),
            products: vec![],
        }
    }

    #[test]
    fn challan_match_beats_invoice_match() {
        let receipts = vec![receipt("R1", "DOC-7")];
        let purchases = vec![purchase("PU1", "DOC-7")];
        let mut units = vec![unlinked_unit(Some("DOC-7"))];
        backfill_sources(&mut units, &receipts, &purchases);
        assert_eq!(units[0].source, Some(StockSource::Inward));
        assert_eq!(units[0].source_doc_id.as_deref(), Some("R1"));
    }

    #[test]
    fn invoice_match_is_the_fallback() {
        let purchases = vec![purchase("PU1", "INV-3")];
        let mut units = vec![unlinked_unit(Some("INV-3"))];
        backfill_sources(&mut units, &[], &purchases);
        assert_eq!(units[0].source, Some(StockSource::Purchase));
        assert_eq!(units[0].source_doc_id.as_deref(), Some("PU1"));
    }

    #[test]
    fn unmatched_units_stay_unlinked() {
        let mut units = vec![unlinked_unit(Some("NOPE")), unlinked_unit(None)];
        backfill_sources(&mut units, &[], &[]);
        assert!(units.iter().all(|u| u.source.is_none()));
    }
}
