//! Catalog item records and search

use serde::{Deserialize, Serialize};

/// Maximum number of search results returned when no limit is configured
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// An everyday purchase item with a typical price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique item identifier
    pub id: u32,

    pub name: String,

    /// Optional grouping ("Food & Drink", "Subscriptions", ...)
    pub category: Option<String>,

    /// Typical price per purchase
    pub unit_price: f64,
}

impl CatalogItem {
    /// Case-insensitive substring match on name or category
    ///
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(needle))
    }
}

/// In-memory item catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// Items whose name or category contains `query`, in catalog order
    ///
    /// A blank query yields no results.
    pub fn search(&self, query: &str, limit: usize) -> Vec<CatalogItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.items
            .iter()
            .filter(|item| item.matches(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Look up an item by id
    pub fn get(&self, id: u32) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
