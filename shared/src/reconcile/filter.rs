//! Aggregate and filter layer
//!
//! Pure functions over an already-reconciled result set. Filtering and
//! grouping never re-trigger reconciliation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{NonSerialStock, StockStatus, StockSummary, StockUnit};

/// Query-time filter over the reconciled stock view
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockFilter {
    pub status: Option<StockStatus>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    /// Case-insensitive substring match over product name, serial,
    /// company, and supplier
    pub search: Option<String>,
}

impl StockFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.category.is_none()
            && self.location.is_none()
            && self.company.is_none()
            && self.search.is_none()
    }

    pub fn matches_unit(&self, unit: &StockUnit) -> bool {
        if let Some(status) = self.status {
            if unit.status != status {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &unit.category != category {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if &unit.location != location {
                return false;
            }
        }
        if let Some(company) = &self.company {
            if &unit.company != company {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let haystacks = [
                unit.product_name.as_str(),
                unit.serial_number.as_str(),
                unit.company.as_str(),
                unit.supplier.as_deref().unwrap_or(""),
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }

    /// Non-serial lines are implicitly in stock, so any other status filter
    /// excludes them
    pub fn matches_non_serial(&self, line: &NonSerialStock) -> bool {
        if let Some(status) = self.status {
            if status != StockStatus::InStock {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &line.category != category {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if line.last_location.as_deref() != Some(location.as_str()) {
                return false;
            }
        }
        if let Some(company) = &self.company {
            if &line.company != company {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let haystacks = [
                line.product_name.as_str(),
                line.company.as_str(),
                line.last_supplier.as_deref().unwrap_or(""),
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }
}

/// Filter serialized units
pub fn filter_units(units: &[StockUnit], filter: &StockFilter) -> Vec<StockUnit> {
    units
        .iter()
        .filter(|u| filter.matches_unit(u))
        .cloned()
        .collect()
}

/// Filter non-serial lines
pub fn filter_non_serial(lines: &[NonSerialStock], filter: &StockFilter) -> Vec<NonSerialStock> {
    lines
        .iter()
        .filter(|l| filter.matches_non_serial(l))
        .cloned()
        .collect()
}

/// Summary statistics over one reconciled view
pub fn summarize(units: &[StockUnit], non_serial: &[NonSerialStock]) -> StockSummary {
    let units_in_stock = units
        .iter()
        .filter(|u| u.status == StockStatus::InStock)
        .count() as i64;
    let non_serial_quantity: i64 = non_serial.iter().map(|l| l.quantity).sum();
    let sold = units.iter().filter(|u| u.status == StockStatus::Sold).count() as i64;

    let unit_value: Decimal = units
        .iter()
        .filter(|u| u.status == StockStatus::InStock)
        .map(|u| u.dealer_price)
        .sum();
    let non_serial_value: Decimal = non_serial
        .iter()
        .map(|l| l.dealer_price * Decimal::from(l.quantity))
        .sum();

    StockSummary {
        total_items: (units.len() + non_serial.len()) as i64,
        in_stock: units_in_stock + non_serial_quantity,
        sold,
        inventory_value: unit_value + non_serial_value,
    }
}

/// One serial inside a drill-down group
#[derive(Debug, Clone, Serialize)]
pub struct SerialEntry {
    pub serial_number: String,
    pub status: StockStatus,
    pub location: String,
}

/// One product inside a category group
#[derive(Debug, Clone, Serialize)]
pub struct ProductGroup {
    pub product_id: String,
    pub product_name: String,
    pub serials: Vec<SerialEntry>,
    pub non_serial_quantity: i64,
}

/// Category -> product -> serial drill-down view
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub products: Vec<ProductGroup>,
}

/// Group the reconciled view by category, then product, then serial list
pub fn group_by_category(units: &[StockUnit], non_serial: &[NonSerialStock]) -> Vec<CategoryGroup> {
    // category -> product id -> group; BTreeMap keeps the output ordered
    let mut tree: BTreeMap<String, BTreeMap<String, ProductGroup>> = BTreeMap::new();

    for unit in units {
        let group = tree
            .entry(unit.category.clone())
            .or_default()
            .entry(unit.product_id.clone())
            .or_insert_with(|| ProductGroup {
                product_id: unit.product_id.clone(),
                product_name: unit.product_name.clone(),
                serials: Vec::new(),
                non_serial_quantity: 0,
            });
        group.serials.push(SerialEntry {
            serial_number: unit.serial_number.clone(),
            status: unit.status,
            location: unit.location.clone(),
        });
    }

    for line in non_serial {
        let group = tree
            .entry(line.category.clone())
            .or_default()
            .entry(line.product_id.clone())
            .or_insert_with(|| ProductGroup {
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                serials: Vec::new(),
                non_serial_quantity: 0,
            });
        group.non_serial_quantity += line.quantity;
    }

    tree.into_iter()
        .map(|(category, products)| CategoryGroup {
            category,
            products: products.into_values().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NonSerialStock, StockStatus, StockUnit};
    use rust_decimal::Decimal;

    fn unit(name: &str, serial: &str, status: StockStatus, price: i64) -> StockUnit {
        StockUnit {
            key: format!("P|{}", serial),
            product_id: "P".to_string(),
            product_name: name.to_string(),
            category: "Hearing Aid".to_string(),
            company: "Signia".to_string(),
            location: "Head Office".to_string(),
            serial_number: serial.to_string(),
            status,
            dealer_price: Decimal::new(price, 0),
            mrp: Decimal::new(price * 2, 0),
            purchase_date: None,
            purchase_invoice: None,
            supplier: Some("Acme Distributors".to_string()),
            source: None,
            source_doc_id: None,
        }
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let units = vec![unit("Pure 312X", "SN-77", StockStatus::InStock, 100)];
        for needle in ["pure", "sn-77", "signia", "acme"] {
            let filter = StockFilter {
                search: Some(needle.to_string()),
                ..StockFilter::default()
            };
            assert_eq!(filter_units(&units, &filter).len(), 1, "needle {needle}");
        }
        let filter = StockFilter {
            search: Some("phonak".to_string()),
            ..StockFilter::default()
        };
        assert!(filter_units(&units, &filter).is_empty());
    }

    #[test]
    fn summary_counts_and_value() {
        let units = vec![
            unit("A", "S1", StockStatus::InStock, 100),
            unit("A", "S2", StockStatus::Sold, 100),
        ];
        let non_serial = vec![NonSerialStock {
            product_id: "P2".to_string(),
            product_name: "Battery".to_string(),
            category: "Battery".to_string(),
            company: "PowerCell".to_string(),
            mrp: Decimal::new(30, 0),
            dealer_price: Decimal::new(20, 0),
            quantity: 5,
            last_supplier: None,
            last_invoice: None,
            last_date: None,
            last_location: None,
            last_source: None,
            last_source_doc_id: None,
        }];
        let summary = summarize(&units, &non_serial);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.in_stock, 6); // one unit + five batteries
        assert_eq!(summary.sold, 1);
        assert_eq!(summary.inventory_value, Decimal::new(200, 0)); // 100 + 5*20
    }

    #[test]
    fn status_filter_excludes_non_serial_unless_in_stock() {
        let non_serial = vec![NonSerialStock {
            product_id: "P2".to_string(),
            product_name: "Battery".to_string(),
            category: "Battery".to_string(),
            company: "PowerCell".to_string(),
            mrp: Decimal::ZERO,
            dealer_price: Decimal::ZERO,
            quantity: 5,
            last_supplier: None,
            last_invoice: None,
            last_date: None,
            last_location: None,
            last_source: None,
            last_source_doc_id: None,
        }];
        let sold_filter = StockFilter {
            status: Some(StockStatus::Sold),
            ..StockFilter::default()
        };
        assert!(filter_non_serial(&non_serial, &sold_filter).is_empty());
        let in_stock_filter = StockFilter {
            status: Some(StockStatus::InStock),
            ..StockFilter::default()
        };
        assert_eq!(filter_non_serial(&non_serial, &in_stock_filter).len(), 1);
    }
}
