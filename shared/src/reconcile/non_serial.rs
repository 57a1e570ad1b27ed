//! Non-serial quantity ledger
//!
//! Products without serial tracking are reconciled as a per-product
//! quantity net: inbound from inward receipts and purchases, outbound from
//! dispatches, sales, and qualifying visit sales. Provenance on the emitted
//! line comes from the most recent inbound record, with ties broken by
//! document id so the result does not depend on iteration order.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    Enquiry, InwardReceipt, NonSerialStock, OutwardDispatch, Purchase, SaleRecord, StockSource,
};

use super::catalog::CatalogIndex;
use super::line::LineItem;
use super::sold::VisitSaleRule;

#[derive(Debug, Default)]
struct LedgerEntry {
    inbound: i64,
    outbound: i64,
    last: Option<LastInbound>,
}

#[derive(Debug, Clone)]
struct LastInbound {
    date: Option<NaiveDate>,
    doc_id: String,
    supplier: Option<String>,
    invoice: Option<String>,
    location: Option<String>,
    source: StockSource,
}

impl LedgerEntry {
    fn record_inbound(&mut self, quantity: i64, candidate: LastInbound) {
        self.inbound += quantity;
        let newer = match &self.last {
            None => true,
            // Later date wins; on equal dates the greater document id wins
            Some(prev) => (candidate.date, candidate.doc_id.as_str())
                > (prev.date, prev.doc_id.as_str()),
        };
        if newer {
            self.last = Some(candidate);
        }
    }
}

/// Net inbound minus outbound per product, floored at zero
///
/// A line is emitted only when quantity remains and the catalog does not
/// track the product by serial; serial-tracked products are assumed to be
/// fully represented by their individual units, even when legacy non-serial
/// records exist for them.
pub fn reconcile_quantities(
    inward_receipts: &[InwardReceipt],
    purchases: &[Purchase],
    dispatches: &[OutwardDispatch],
    sales: &[SaleRecord],
    enquiries: &[Enquiry],
    catalog: &CatalogIndex<'_>,
    rule: &dyn VisitSaleRule,
) -> Vec<NonSerialStock> {
    let mut ledger: HashMap<String, LedgerEntry> = HashMap::new();

    for receipt in inward_receipts {
        for line in &receipt.products {
            let item = LineItem::from_inward(line);
            if item.is_serialized() {
                continue;
            }
            ledger.entry(item.product_id.clone()).or_default().record_inbound(
                item.effective_quantity(),
                LastInbound {
                    date: receipt.received_date,
                    doc_id: receipt.id.clone(),
                    supplier: receipt.supplier.as_ref().map(|p| p.name.clone()),
                    invoice: receipt.challan_number.clone(),
                    location: receipt.location.clone(),
                    source: StockSource::Inward,
                },
            );
        }
    }

    for purchase in purchases {
        for line in &purchase.products {
            let item = LineItem::from_purchase(line);
            if item.is_serialized() {
                continue;
            }
            ledger.entry(item.product_id.clone()).or_default().record_inbound(
                item.effective_quantity(),
                LastInbound {
                    date: purchase.purchase_date,
                    doc_id: purchase.id.clone(),
                    supplier: purchase.party.as_ref().map(|p| p.name.clone()),
                    invoice: purchase.invoice_no.clone(),
                    location: purchase.location.clone(),
                    source: StockSource::Purchase,
                },
            );
        }
    }

    for dispatch in dispatches {
        for line in &dispatch.products {
            let item = LineItem::from_dispatch(line);
            if item.is_serialized() {
                continue;
            }
            ledger.entry(item.product_id.clone()).or_default().outbound +=
                item.effective_quantity();
        }
    }

    for sale in sales {
        for line in &sale.products {
            let item = LineItem::from_sale(line);
            if item.is_serialized() {
                continue;
            }
            ledger.entry(item.product_id.clone()).or_default().outbound +=
                item.effective_quantity();
        }
    }

    for enquiry in enquiries {
        for visit in &enquiry.visits {
            if !rule.is_sale_visit(visit) {
                continue;
            }
            for line in &visit.products {
                let item = LineItem::from_visit(line);
                if item.is_serialized() {
                    continue;
                }
                ledger.entry(item.product_id.clone()).or_default().outbound +=
                    item.effective_quantity();
            }
        }
    }

    let mut lines: Vec<NonSerialStock> = ledger
        .into_iter()
        .filter_map(|(product_id, entry)| {
            let remaining = (entry.inbound - entry.outbound).max(0);
            if remaining == 0 || catalog.is_serial_tracked(&product_id) {
                return None;
            }
            let product = catalog.get(&product_id);
            let last = entry.last;
            Some(NonSerialStock {
                product_name: product.map(|p| p.name.clone()).unwrap_or_default(),
                category: product.map(|p| p.category.clone()).unwrap_or_default(),
                company: product.map(|p| p.company.clone()).unwrap_or_default(),
                mrp: product.map(|p| p.mrp).unwrap_or(Decimal::ZERO),
                dealer_price: product
                    .and_then(|p| p.dealer_price)
                    .unwrap_or(Decimal::ZERO),
                quantity: remaining,
                last_supplier: last.as_ref().and_then(|l| l.supplier.clone()),
                last_invoice: last.as_ref().and_then(|l| l.invoice.clone()),
                last_date: last.as_ref().and_then(|l| l.date),
                last_location: last.as_ref().and_then(|l| l.location.clone()),
                last_source: last.as_ref().map(|l| l.source),
                last_source_doc_id: last.map(|l| l.doc_id),
                product_id,
            })
        })
        .collect();

    // HashMap iteration order is arbitrary; pin the output order
    lines.sort_by(|a, b| a.product_id.cmp(&b.product_id));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentLine, InwardReceipt, PartyRef, ProductRef};
    use crate::reconcile::catalog::CatalogIndex;
    use crate::reconcile::sold::StandardVisitSaleRule;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn qty_line(product_id: &str, quantity: i64) -> DocumentLine {
        DocumentLine {
            product_id: Some(product_id.to_string()),
            quantity: Some(quantity),
            ..DocumentLine::default()
        }
    }

    fn receipt(id: &str, date: (i32, u32, u32), lines: Vec<DocumentLine>) -> InwardReceipt {
        InwardReceipt {
            id: id.to_string(),
            received_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            supplier: Some(PartyRef::named(format!("Supplier-{}", id))),
            company: None,
            location: None,
            challan_number: Some(format!("CH-{}", id)),
            products: lines,
        }
    }

    fn battery_catalog() -> Vec<ProductRef> {
        vec![ProductRef {
            id: "P2".to_string(),
            name: "Battery 312".to_string(),
            category: "Battery".to_string(),
            company: "PowerCell".to_string(),
            mrp: Decimal::new(250, 0),
            dealer_price: Some(Decimal::new(180, 0)),
            has_serial_number: false,
        }]
    }

    #[test]
    fn equal_dates_resolve_by_document_id() {
        let products = battery_catalog();
        let catalog = CatalogIndex::build(&products);
        // Same date in both orders; provenance must land on the greater id
        for (first, second) in [("R1", "R9"), ("R9", "R1")] {
            let receipts = vec![
                receipt(first, (2024, 3, 1), vec![qty_line("P2", 5)]),
                receipt(second, (2024, 3, 1), vec![qty_line("P2", 5)]),
            ];
            let lines =
                reconcile_quantities(&receipts, &[], &[], &[], &[], &catalog, &StandardVisitSaleRule);
            assert_eq!(lines.len(), 1);
            assert_eq!(lines[0].quantity, 10);
            assert_eq!(lines[0].last_source_doc_id.as_deref(), Some("R9"));
        }
    }

    #[test]
    fn dated_record_beats_undated() {
        let products = battery_catalog();
        let catalog = CatalogIndex::build(&products);
        let mut undated = receipt("R5", (2024, 3, 1), vec![qty_line("P2", 3)]);
        undated.received_date = None;
        let receipts = vec![
            undated,
            receipt("R2", (2024, 1, 1), vec![qty_line("P2", 3)]),
        ];
        let lines =
            reconcile_quantities(&receipts, &[], &[], &[], &[], &catalog, &StandardVisitSaleRule);
        assert_eq!(lines[0].last_source_doc_id.as_deref(), Some("R2"));
    }
}
