//! Stock reconciliation tests
//!
//! Tests for the derived stock engine including:
//! - Key uniqueness across the merged unit set
//! - Inward-over-purchase precedence
//! - Idempotence of a reconciliation pass
//! - Non-serial quantity conservation
//! - Transfer exclusion and sold-set precedence

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use shared::models::{
    DispatchStatus, DocumentLine, InwardReceipt, OutwardDispatch, PartyRef, ProductRef, Purchase,
    SaleRecord, StockSource, StockStatus,
};
use shared::reconcile::{reconcile, ReconcileOptions, SourceSnapshot};

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn serial_line(product_id: &str, serials: &[&str]) -> DocumentLine {
    DocumentLine {
        product_id: Some(product_id.to_string()),
        serial_numbers: Some(serials.iter().map(|s| s.to_string()).collect()),
        ..DocumentLine::default()
    }
}

fn qty_line(product_id: &str, quantity: i64) -> DocumentLine {
    DocumentLine {
        product_id: Some(product_id.to_string()),
        quantity: Some(quantity),
        ..DocumentLine::default()
    }
}

fn sale_line(product_id: &str, serial: &str) -> DocumentLine {
    DocumentLine {
        product_id: Some(product_id.to_string()),
        serial_number: Some(serial.to_string()),
        ..DocumentLine::default()
    }
}

fn receipt(id: &str, lines: Vec<DocumentLine>) -> InwardReceipt {
    InwardReceipt {
        id: id.to_string(),
        received_date: date(2024, 1, 10),
        supplier: Some(PartyRef::named("Sonic Distributors")),
        company: Some("Signia".to_string()),
        location: None,
        challan_number: Some(format!("CH-{}", id)),
        products: lines,
    }
}

fn purchase(id: &str, lines: Vec<DocumentLine>) -> Purchase {
    Purchase {
        id: id.to_string(),
        purchase_date: date(2024, 1, 12),
        party: Some(PartyRef::named("Hearing Solutions Pvt Ltd")),
        company: Some("Signia".to_string()),
        location: None,
        invoice_no: Some(format!("INV-{}", id)),
        products: lines,
    }
}

fn sale(id: &str, lines: Vec<DocumentLine>) -> SaleRecord {
    SaleRecord {
        id: id.to_string(),
        sale_date: date(2024, 2, 1),
        customer: None,
        location: None,
        products: lines,
    }
}

fn hearing_aid(id: &str) -> ProductRef {
    ProductRef {
        id: id.to_string(),
        name: format!("Model {}", id),
        category: "Hearing Aid".to_string(),
        company: "Signia".to_string(),
        mrp: dec(50000),
        dealer_price: Some(dec(32000)),
        has_serial_number: true,
    }
}

fn battery(id: &str) -> ProductRef {
    ProductRef {
        id: id.to_string(),
        name: format!("Battery {}", id),
        category: "Battery".to_string(),
        company: "PowerCell".to_string(),
        mrp: dec(250),
        dealer_price: Some(dec(180)),
        has_serial_number: false,
    }
}

fn options() -> ReconcileOptions {
    ReconcileOptions {
        head_office_location: "Head Office".to_string(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn merges_inward_purchase_and_sale_into_one_view() {
    // R1 brings in SN1+SN2, PU1 claims SN2+SN3, S1 sells SN1
    let snapshot = SourceSnapshot {
        products: vec![hearing_aid("P1")],
        inward_receipts: vec![receipt("R1", vec![serial_line("P1", &["SN1", "SN2"])])],
        purchases: vec![purchase("PU1", vec![serial_line("P1", &["SN2", "SN3"])])],
        sales: vec![sale("S1", vec![sale_line("P1", "SN1")])],
        ..SourceSnapshot::default()
    };

    let result = reconcile(&snapshot, &options());

    assert_eq!(result.units.len(), 3);

    let by_key = |key: &str| result.units.iter().find(|u| u.key == key).unwrap();

    let sn1 = by_key("P1|SN1");
    assert_eq!(sn1.status, StockStatus::Sold);
    assert_eq!(sn1.source, Some(StockSource::Inward));

    let sn2 = by_key("P1|SN2");
    assert_eq!(sn2.status, StockStatus::InStock);
    // The receipt wins over the purchase for the same physical unit
    assert_eq!(sn2.source, Some(StockSource::Inward));
    assert_eq!(sn2.source_doc_id.as_deref(), Some("R1"));

    let sn3 = by_key("P1|SN3");
    assert_eq!(sn3.status, StockStatus::InStock);
    assert_eq!(sn3.source, Some(StockSource::Purchase));

    assert_eq!(result.summary.in_stock, 2);
    assert_eq!(result.summary.sold, 1);
    assert_eq!(result.summary.total_items, 3);
}

#[test]
fn non_serial_quantities_net_with_latest_provenance() {
    // 10 in on day 1, 5 in on day 3, 8 out: 7 remain, provenance day 3
    let mut early = receipt("R1", vec![qty_line("P2", 10)]);
    early.received_date = date(2024, 3, 1);
    let mut late = purchase("PU1", vec![qty_line("P2", 5)]);
    late.purchase_date = date(2024, 3, 3);

    let snapshot = SourceSnapshot {
        products: vec![battery("P2")],
        inward_receipts: vec![early],
        purchases: vec![late],
        dispatches: vec![OutwardDispatch {
            id: "D1".to_string(),
            status: DispatchStatus::Dispatched,
            notes: None,
            location: None,
            dispatch_date: date(2024, 3, 5),
            products: vec![qty_line("P2", 8)],
        }],
        ..SourceSnapshot::default()
    };

    let result = reconcile(&snapshot, &options());

    assert_eq!(result.non_serial.len(), 1);
    let line = &result.non_serial[0];
    assert_eq!(line.quantity, 7);
    assert_eq!(line.last_source, Some(StockSource::Purchase));
    assert_eq!(line.last_source_doc_id.as_deref(), Some("PU1"));
    assert_eq!(line.last_date, date(2024, 3, 3));
    assert_eq!(line.last_invoice.as_deref(), Some("INV-PU1"));
}

#[test]
fn serial_tracked_products_never_emit_non_serial_lines() {
    // Legacy quantity record for a serial-tracked product is dropped
    let snapshot = SourceSnapshot {
        products: vec![hearing_aid("P1")],
        inward_receipts: vec![receipt("R1", vec![qty_line("P1", 4)])],
        ..SourceSnapshot::default()
    };

    let result = reconcile(&snapshot, &options());
    assert!(result.units.is_empty());
    assert!(result.non_serial.is_empty());
}

#[test]
fn missing_location_defaults_to_head_office() {
    let with_location = InwardReceipt {
        location: Some("Branch A".to_string()),
        ..receipt("R2", vec![serial_line("P1", &["SN9"])])
    };
    let snapshot = SourceSnapshot {
        products: vec![hearing_aid("P1")],
        inward_receipts: vec![receipt("R1", vec![serial_line("P1", &["SN1"])]), with_location],
        ..SourceSnapshot::default()
    };

    let result = reconcile(&snapshot, &options());
    let locations: Vec<&str> = result.units.iter().map(|u| u.location.as_str()).collect();
    assert_eq!(locations, vec!["Head Office", "Branch A"]);
}

#[test]
fn money_fields_fall_back_line_then_catalog_then_zero() {
    let mut priced = serial_line("P1", &["SN1"]);
    priced.dealer_price = Some(dec(30000));
    priced.mrp = Some(dec(45000));

    let unpriced = serial_line("P1", &["SN2"]);
    let unknown_product = serial_line("P9", &["SN3"]);

    let snapshot = SourceSnapshot {
        products: vec![hearing_aid("P1")],
        inward_receipts: vec![receipt("R1", vec![priced, unpriced, unknown_product])],
        ..SourceSnapshot::default()
    };

    let result = reconcile(&snapshot, &options());

    assert_eq!(result.units[0].dealer_price, dec(30000));
    assert_eq!(result.units[0].mrp, dec(45000));
    // Catalog fallback
    assert_eq!(result.units[1].dealer_price, dec(32000));
    assert_eq!(result.units[1].mrp, dec(50000));
    // No line price, no catalog entry
    assert_eq!(result.units[2].dealer_price, Decimal::ZERO);
    assert_eq!(result.units[2].mrp, Decimal::ZERO);
}

#[test]
fn missing_product_id_degrades_without_error() {
    let orphan = DocumentLine {
        serial_numbers: Some(vec!["SN1".to_string()]),
        ..DocumentLine::default()
    };
    let snapshot = SourceSnapshot {
        inward_receipts: vec![receipt("R1", vec![orphan])],
        ..SourceSnapshot::default()
    };

    let result = reconcile(&snapshot, &options());
    assert_eq!(result.units.len(), 1);
    assert_eq!(result.units[0].key, "|SN1");
    assert_eq!(result.units[0].product_id, "");
}

#[test]
fn transfer_pair_is_excluded_from_reservations() {
    let transfer_in = InwardReceipt {
        supplier: Some(PartyRef::named("Stock Transfer from Head Office")),
        ..receipt("R2", vec![serial_line("P1", &["SN5"])])
    };
    let dispatch = OutwardDispatch {
        id: "D1".to_string(),
        status: DispatchStatus::Pending,
        notes: Some("Stock Transfer: Head Office -> Branch A".to_string()),
        location: None,
        dispatch_date: None,
        products: vec![serial_line("P1", &["SN5", "SN6"])],
    };
    let snapshot = SourceSnapshot {
        products: vec![hearing_aid("P1")],
        inward_receipts: vec![
            receipt("R1", vec![serial_line("P1", &["SN5", "SN6"])]),
            transfer_in,
        ],
        dispatches: vec![dispatch],
        ..SourceSnapshot::default()
    };

    let result = reconcile(&snapshot, &options());

    // The transferred serial is not reserved; its sibling is
    assert!(!result.reservations.pending.contains("P1|SN5"));
    assert!(result.reservations.pending.contains("P1|SN6"));
}

#[test]
fn sold_set_overrides_inbound_status() {
    // The same serial arrives through both inbound paths and is sold once
    let snapshot = SourceSnapshot {
        products: vec![hearing_aid("P1")],
        inward_receipts: vec![receipt("R1", vec![serial_line("P1", &["SN1"])])],
        purchases: vec![purchase("PU1", vec![serial_line("P1", &["SN1"])])],
        sales: vec![sale("S1", vec![sale_line("P1", "SN1")])],
        ..SourceSnapshot::default()
    };

    let result = reconcile(&snapshot, &options());
    assert_eq!(result.units.len(), 1);
    assert_eq!(result.units[0].status, StockStatus::Sold);
    assert_eq!(result.units[0].source, Some(StockSource::Inward));
}

#[test]
fn reconciliation_is_idempotent() {
    let snapshot = SourceSnapshot {
        products: vec![hearing_aid("P1"), battery("P2")],
        inward_receipts: vec![
            receipt("R1", vec![serial_line("P1", &["SN1", "SN2"]), qty_line("P2", 10)]),
            receipt("R2", vec![serial_line("P1", &["SN3"])]),
        ],
        purchases: vec![purchase("PU1", vec![serial_line("P1", &["SN2", "SN4"]), qty_line("P2", 5)])],
        dispatches: vec![OutwardDispatch {
            id: "D1".to_string(),
            status: DispatchStatus::Dispatched,
            notes: None,
            location: None,
            dispatch_date: None,
            products: vec![qty_line("P2", 3)],
        }],
        sales: vec![sale("S1", vec![sale_line("P1", "SN3")])],
        ..SourceSnapshot::default()
    };

    let first = reconcile(&snapshot, &options());
    let second = reconcile(&snapshot, &options());

    assert_eq!(first.units, second.units);
    assert_eq!(first.non_serial, second.non_serial);
    assert_eq!(first.summary, second.summary);

    // Byte-identical when serialized
    let a = serde_json::to_string(&first.units).unwrap();
    let b = serde_json::to_string(&second.units).unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// No two units ever share a (product, serial) key
    #[test]
    fn prop_unit_keys_are_unique(
        receipt_serials in prop::collection::vec(
            (0usize..4, prop::collection::vec(0usize..8, 1..4)),
            1..6
        ),
        purchase_serials in prop::collection::vec(
            (0usize..4, prop::collection::vec(0usize..8, 1..4)),
            0..6
        ),
    ) {
        let product_ids = ["P0", "P1", "P2", "P3"];
        let serial_pool = ["S0", "S1", "S2", "S3", "S4", "S5", "S6", "S7"];

        let receipts: Vec<InwardReceipt> = receipt_serials
            .iter()
            .enumerate()
            .map(|(i, (p, serials))| {
                let serials: Vec<&str> = serials.iter().map(|s| serial_pool[*s]).collect();
                receipt(&format!("R{}", i), vec![serial_line(product_ids[*p], &serials)])
            })
            .collect();
        let purchases: Vec<Purchase> = purchase_serials
            .iter()
            .enumerate()
            .map(|(i, (p, serials))| {
                let serials: Vec<&str> = serials.iter().map(|s| serial_pool[*s]).collect();
                purchase(&format!("PU{}", i), vec![serial_line(product_ids[*p], &serials)])
            })
            .collect();

        let snapshot = SourceSnapshot {
            inward_receipts: receipts,
            purchases,
            ..SourceSnapshot::default()
        };
        let result = reconcile(&snapshot, &options());

        let mut keys: Vec<&str> = result.units.iter().map(|u| u.key.as_str()).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(before, keys.len());
    }

    /// A serial present in any receipt always resolves to the inward source
    #[test]
    fn prop_inward_precedence(extra_purchases in 1usize..5) {
        let receipts = vec![receipt("R1", vec![serial_line("P1", &["SN1"])])];
        let purchases: Vec<Purchase> = (0..extra_purchases)
            .map(|i| purchase(&format!("PU{}", i), vec![serial_line("P1", &["SN1"])]))
            .collect();

        let snapshot = SourceSnapshot {
            inward_receipts: receipts,
            purchases,
            ..SourceSnapshot::default()
        };
        let result = reconcile(&snapshot, &options());

        prop_assert_eq!(result.units.len(), 1);
        prop_assert_eq!(result.units[0].source, Some(StockSource::Inward));
    }

    /// remaining = max(0, inbound - outbound); never negative
    #[test]
    fn prop_non_serial_conservation(
        in_quantities in prop::collection::vec(1i64..100, 1..8),
        out_quantities in prop::collection::vec(1i64..100, 0..8),
    ) {
        let receipts: Vec<InwardReceipt> = in_quantities
            .iter()
            .enumerate()
            .map(|(i, q)| receipt(&format!("R{}", i), vec![qty_line("P2", *q)]))
            .collect();
        let dispatches: Vec<OutwardDispatch> = out_quantities
            .iter()
            .enumerate()
            .map(|(i, q)| OutwardDispatch {
                id: format!("D{}", i),
                status: DispatchStatus::Dispatched,
                notes: None,
                location: None,
                dispatch_date: None,
                products: vec![qty_line("P2", *q)],
            })
            .collect();

        let products = vec![battery("P2")];
        let snapshot = SourceSnapshot {
            products,
            inward_receipts: receipts,
            dispatches,
            ..SourceSnapshot::default()
        };
        let result = reconcile(&snapshot, &options());

        let total_in: i64 = in_quantities.iter().sum();
        let total_out: i64 = out_quantities.iter().sum();
        let expected = (total_in - total_out).max(0);

        if expected == 0 {
            prop_assert!(result.non_serial.is_empty());
        } else {
            prop_assert_eq!(result.non_serial.len(), 1);
            prop_assert_eq!(result.non_serial[0].quantity, expected);
        }
    }

    /// Sold serials count as sold regardless of how often they were received
    #[test]
    fn prop_sold_set_is_sole_status_authority(receipt_count in 1usize..4) {
        let receipts: Vec<InwardReceipt> = (0..receipt_count)
            .map(|i| receipt(&format!("R{}", i), vec![serial_line("P1", &["SN1"])]))
            .collect();
        let snapshot = SourceSnapshot {
            inward_receipts: receipts,
            sales: vec![sale("S1", vec![sale_line("P1", "SN1")])],
            ..SourceSnapshot::default()
        };
        let result = reconcile(&snapshot, &options());

        prop_assert_eq!(result.units.len(), 1);
        prop_assert_eq!(result.units[0].status, StockStatus::Sold);
        prop_assert_eq!(result.summary.sold, 1);
        prop_assert_eq!(result.summary.in_stock, 0);
    }
}
