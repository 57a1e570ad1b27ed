//! Internal stock-transfer detection
//!
//! An internal transfer between locations appears twice: as an outward
//! dispatch at the source location and as an inward receipt at the
//! destination. Counting both would double-book the same physical unit —
//! still reserved "out" at the source while legitimately "in" at the
//! destination — so matched transfer pairs are excluded from the dispatch
//! reservation sets.

use std::collections::HashSet;

use crate::models::{DispatchStatus, InwardReceipt, OutwardDispatch};

use super::line::{stock_key, LineItem};

/// Supplier-name marker stamped on transfer-in receipts
pub const TRANSFER_IN_MARKER: &str = "Stock Transfer from";

/// Notes marker stamped on the matching outward dispatch
pub const TRANSFER_OUT_MARKER: &str = "Stock Transfer:";

/// Serial keys that arrived through an internal transfer-in receipt
pub fn transfer_in_serials(receipts: &[InwardReceipt]) -> HashSet<String> {
    let mut keys = HashSet::new();
    for receipt in receipts {
        let is_transfer_in = receipt
            .supplier
            .as_ref()
            .map(|s| s.name.contains(TRANSFER_IN_MARKER))
            .unwrap_or(false);
        if !is_transfer_in {
            continue;
        }
        for line in &receipt.products {
            let item = LineItem::from_inward(line);
            for serial in &item.serials {
                keys.insert(stock_key(&item.product_id, serial));
            }
        }
    }
    keys
}

/// Serial keys currently reserved by outward dispatches
#[derive(Debug, Clone, Default)]
pub struct DispatchReservations {
    pub pending: HashSet<String>,
    pub dispatched: HashSet<String>,
}

impl DispatchReservations {
    pub fn contains(&self, key: &str) -> bool {
        self.pending.contains(key) || self.dispatched.contains(key)
    }
}

/// Classify outward-dispatch serials into reservation sets
///
/// A dispatch line whose document notes carry the transfer marker and whose
/// key already landed in a transfer-in receipt is a completed internal move,
/// not reserved stock, and is skipped.
pub fn dispatch_reservations(
    dispatches: &[OutwardDispatch],
    transfer_in: &HashSet<String>,
) -> DispatchReservations {
    let mut reservations = DispatchReservations::default();
    for dispatch in dispatches {
        let is_transfer_out = dispatch
            .notes
            .as_deref()
            .map(|n| n.contains(TRANSFER_OUT_MARKER))
            .unwrap_or(false);
        for line in &dispatch.products {
            let item = LineItem::from_dispatch(line);
            for serial in &item.serials {
                let key = stock_key(&item.product_id, serial);
                if is_transfer_out && transfer_in.contains(&key) {
                    continue;
                }
                match dispatch.status {
                    DispatchStatus::Pending => reservations.pending.insert(key),
                    DispatchStatus::Dispatched => reservations.dispatched.insert(key),
                };
            }
        }
    }
    reservations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DispatchStatus, DocumentLine, InwardReceipt, OutwardDispatch, PartyRef,
    };
    use std::collections::HashSet;

    fn serial_line(product_id: &str, serials: &[&str]) -> DocumentLine {
        DocumentLine {
            product_id: Some(product_id.to_string()),
            serial_numbers: Some(serials.iter().map(|s| s.to_string()).collect()),
            ..DocumentLine::default()
        }
    }

    fn receipt(supplier: &str, lines: Vec<DocumentLine>) -> InwardReceipt {
        InwardReceipt {
            id: "R1".to_string(),
            received_date: None,
            supplier: Some(PartyRef::named(supplier)),
            company: None,
            location: None,
            challan_number: None,
            products: lines,
        }
    }

    #[test]
    fn transfer_in_requires_supplier_marker() {
        let plain = receipt("Sonova Distributors", vec![serial_line("P1", &["SN1"])]);
        let transfer = receipt(
            "Stock Transfer from Branch A",
            vec![serial_line("P1", &["SN2"])],
        );
        let keys = transfer_in_serials(&[plain, transfer]);
        assert!(!keys.contains("P1|SN1"));
        assert!(keys.contains("P1|SN2"));
    }

    #[test]
    fn matched_transfer_out_is_not_reserved() {
        let transfer_in: HashSet<String> = ["P1|SN1".to_string()].into_iter().collect();
        let dispatch = OutwardDispatch {
            id: "D1".to_string(),
            status: DispatchStatus::Pending,
            notes: Some("Stock Transfer: to Branch B".to_string()),
            location: None,
            dispatch_date: None,
            products: vec![serial_line("P1", &["SN1", "SN2"])],
        };
        let reservations = dispatch_reservations(&[dispatch], &transfer_in);
        // SN1 completed its transfer; SN2 is genuinely reserved
        assert!(!reservations.contains("P1|SN1"));
        assert!(reservations.pending.contains("P1|SN2"));
    }

    #[test]
    fn unmatched_notes_still_reserve() {
        let transfer_in = HashSet::new();
        let dispatch = OutwardDispatch {
            id: "D2".to_string(),
            status: DispatchStatus::Dispatched,
            notes: Some("Stock Transfer: to Branch B".to_string()),
            location: None,
            dispatch_date: None,
            products: vec![serial_line("P1", &["SN1"])],
        };
        let reservations = dispatch_reservations(&[dispatch], &transfer_in);
        assert!(reservations.dispatched.contains("P1|SN1"));
    }
}
