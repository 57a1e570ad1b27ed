//! Serialized unit merger
//!
//! Inward receipts and purchases are the two inbound paths for serialized
//! goods. A purchase that has since been converted into an inward receipt
//! must not appear twice, so receipts are merged first and a purchase can
//! never displace a unit that already exists under the same key.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{InwardReceipt, Purchase, StockSource, StockStatus, StockUnit};

use super::catalog::CatalogIndex;
use super::line::{stock_key, LineItem};
use super::ReconcileOptions;

/// Document-level fields shared by every line of one inbound document
struct DocMeta {
    date: Option<NaiveDate>,
    supplier: Option<String>,
    invoice: Option<String>,
    company: Option<String>,
    location: Option<String>,
    source: StockSource,
    doc_id: String,
}

/// Merge both inbound collections into unique per-serial units
///
/// First occurrence of a key within the pass wins; iteration order is
/// receipts in source order, then purchases in source order, so the output
/// is deterministic for a given snapshot.
pub fn merge_units(
    inward_receipts: &[InwardReceipt],
    purchases: &[Purchase],
    sold: &HashSet<String>,
    catalog: &CatalogIndex<'_>,
    opts: &ReconcileOptions,
) -> Vec<StockUnit> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut units: Vec<StockUnit> = Vec::new();

    for receipt in inward_receipts {
        let meta = DocMeta {
            date: receipt.received_date,
            supplier: receipt.supplier.as_ref().map(|p| p.name.clone()),
            invoice: receipt.challan_number.clone(),
            company: receipt.company.clone(),
            location: receipt.location.clone(),
            source: StockSource::Inward,
            doc_id: receipt.id.clone(),
        };
        for line in &receipt.products {
            merge_line(
                &LineItem::from_inward(line),
                &meta,
                sold,
                catalog,
                opts,
                &mut seen,
                &mut units,
            );
        }
    }

    for purchase in purchases {
        let meta = DocMeta {
            date: purchase.purchase_date,
            supplier: purchase.party.as_ref().map(|p| p.name.clone()),
            invoice: purchase.invoice_no.clone(),
            company: purchase.company.clone(),
            location: purchase.location.clone(),
            source: StockSource::Purchase,
            doc_id: purchase.id.clone(),
        };
        for line in &purchase.products {
            merge_line(
                &LineItem::from_purchase(line),
                &meta,
                sold,
                catalog,
                opts,
                &mut seen,
                &mut units,
            );
        }
    }

    units
}

fn merge_line(
    item: &LineItem,
    meta: &DocMeta,
    sold: &HashSet<String>,
    catalog: &CatalogIndex<'_>,
    opts: &ReconcileOptions,
    seen: &mut HashSet<String>,
    units: &mut Vec<StockUnit>,
) {
    if !item.is_serialized() {
        return;
    }
    for serial in &item.serials {
        let key = stock_key(&item.product_id, serial);
        if !seen.insert(key.clone()) {
            continue;
        }
        units.push(build_unit(key, item, serial, meta, sold, catalog, opts));
    }
}

fn build_unit(
    key: String,
    item: &LineItem,
    serial: &str,
    meta: &DocMeta,
    sold: &HashSet<String>,
    catalog: &CatalogIndex<'_>,
    opts: &ReconcileOptions,
) -> StockUnit {
    let product = catalog.get(&item.product_id);

    let status = if sold.contains(&key) {
        StockStatus::Sold
    } else {
        StockStatus::InStock
    };

    // Line-item fields win; the catalog fills gaps; everything else
    // degrades to empty/zero rather than rejecting the record.
    let product_name = item
        .name
        .clone()
        .or_else(|| product.map(|p| p.name.clone()))
        .unwrap_or_default();
    let category = item
        .category
        .clone()
        .or_else(|| product.map(|p| p.category.clone()))
        .unwrap_or_default();
    let company = meta
        .company
        .clone()
        .or_else(|| product.map(|p| p.company.clone()))
        .unwrap_or_default();
    let mrp = item
        .mrp
        .or_else(|| product.map(|p| p.mrp))
        .unwrap_or(Decimal::ZERO);
    let dealer_price = item
        .dealer_price
        .or_else(|| product.and_then(|p| p.dealer_price))
        .unwrap_or(Decimal::ZERO);

    // Documents predating multi-location support carry no location
    let location = meta
        .location
        .clone()
        .unwrap_or_else(|| opts.head_office_location.clone());

    let (source, source_doc_id) = if meta.doc_id.is_empty() {
        (None, None)
    } else {
        (Some(meta.source), Some(meta.doc_id.clone()))
    };

    StockUnit {
        key,
        product_id: item.product_id.clone(),
        product_name,
        category,
        company,
        location,
        serial_number: serial.to_string(),
        status,
        dealer_price,
        mrp,
        purchase_date: meta.date,
        purchase_invoice: meta.invoice.clone(),
        supplier: meta.supplier.clone(),
        source,
        source_doc_id,
    }
}
