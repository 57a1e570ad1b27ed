//! Derived-stock reconciliation engine
//!
//! There is no stored "current stock" table. On-hand inventory is derived on
//! every read by scanning five independent document collections (inward
//! receipts, purchases, outward dispatches, sales, and sales embedded in
//! patient visits) and merging them into one deduplicated, status-tagged
//! view with provenance links back to the source documents.
//!
//! Every function here is pure: a pass is a function of the snapshot it is
//! given, holds no state between calls, and produces a self-contained result
//! that simply replaces the previous one. Re-running a pass over unchanged
//! snapshots yields an identical result.

pub mod catalog;
pub mod filter;
pub mod line;
pub mod non_serial;
pub mod provenance;
pub mod serialized;
pub mod sold;
pub mod transfers;

pub use catalog::CatalogIndex;
pub use filter::{
    filter_non_serial, filter_units, group_by_category, summarize, CategoryGroup, ProductGroup,
    SerialEntry, StockFilter,
};
pub use line::{line_product_id, stock_key, LineItem};
pub use sold::{StandardVisitSaleRule, VisitSaleRule};
pub use transfers::DispatchReservations;

use crate::models::{
    Enquiry, InwardReceipt, NonSerialStock, OutwardDispatch, ProductRef, Purchase, SaleRecord,
    StockSummary, StockUnit,
};

/// Immutable snapshot of the five source collections, fetched once per pass
#[derive(Debug, Clone, Default)]
pub struct SourceSnapshot {
    pub products: Vec<ProductRef>,
    pub inward_receipts: Vec<InwardReceipt>,
    pub purchases: Vec<Purchase>,
    pub dispatches: Vec<OutwardDispatch>,
    pub sales: Vec<SaleRecord>,
    pub enquiries: Vec<Enquiry>,
}

/// Knobs injected by the caller
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Location assigned to documents that predate multi-location support
    /// and carry no explicit location
    pub head_office_location: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            head_office_location: "Head Office".to_string(),
        }
    }
}

/// Result of one reconciliation pass
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Serialized units in source order: inward receipts first, then
    /// purchases, first occurrence of each key wins
    pub units: Vec<StockUnit>,
    /// Non-serial quantity lines, sorted by product id
    pub non_serial: Vec<NonSerialStock>,
    /// Serial keys reserved by outward dispatches, transfer-outs excluded
    pub reservations: DispatchReservations,
    pub summary: StockSummary,
}

/// Run a reconciliation pass with the standard visit-sale rule
pub fn reconcile(snapshot: &SourceSnapshot, opts: &ReconcileOptions) -> Reconciliation {
    reconcile_with(snapshot, opts, &StandardVisitSaleRule)
}

/// Run a reconciliation pass with a caller-supplied visit-sale rule
pub fn reconcile_with(
    snapshot: &SourceSnapshot,
    opts: &ReconcileOptions,
    rule: &dyn VisitSaleRule,
) -> Reconciliation {
    let catalog = CatalogIndex::build(&snapshot.products);
    let transfer_in = transfers::transfer_in_serials(&snapshot.inward_receipts);
    let sold = sold::sold_keys(&snapshot.sales, &snapshot.enquiries, rule);
    let reservations = transfers::dispatch_reservations(&snapshot.dispatches, &transfer_in);

    let mut units = serialized::merge_units(
        &snapshot.inward_receipts,
        &snapshot.purchases,
        &sold,
        &catalog,
        opts,
    );
    provenance::backfill_sources(&mut units, &snapshot.inward_receipts, &snapshot.purchases);

    let non_serial = non_serial::reconcile_quantities(
        &snapshot.inward_receipts,
        &snapshot.purchases,
        &snapshot.dispatches,
        &snapshot.sales,
        &snapshot.enquiries,
        &catalog,
        rule,
    );

    let summary = summarize(&units, &non_serial);

    Reconciliation {
        units,
        non_serial,
        reservations,
        summary,
    }
}
