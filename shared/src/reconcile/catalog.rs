//! Product catalog index

use std::collections::HashMap;

use crate::models::ProductRef;

/// Id-keyed view over the product catalog
///
/// Built once per reconciliation pass; O(n) build, O(1) lookup. Used only
/// for enrichment when a line item omits name, category, or pricing, and
/// for the serial-tracked flag.
#[derive(Debug)]
pub struct CatalogIndex<'a> {
    by_id: HashMap<&'a str, &'a ProductRef>,
}

impl<'a> CatalogIndex<'a> {
    pub fn build(products: &'a [ProductRef]) -> Self {
        let mut by_id = HashMap::with_capacity(products.len());
        for product in products {
            // First entry wins on duplicate ids
            by_id.entry(product.id.as_str()).or_insert(product);
        }
        Self { by_id }
    }

    pub fn get(&self, product_id: &str) -> Option<&'a ProductRef> {
        self.by_id.get(product_id).copied()
    }

    /// Whether the catalog flags this product as serial-tracked.
    /// Unknown products are treated as not serial-tracked.
    pub fn is_serial_tracked(&self, product_id: &str) -> bool {
        self.get(product_id).map(|p| p.has_serial_number).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
