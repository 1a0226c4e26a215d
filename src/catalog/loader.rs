//! Load the item catalog from CSV

use super::{Catalog, CatalogItem};
use crate::error::CatalogError;
use csv::Reader;
use std::path::Path;

/// Default path to the catalog file
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.csv";

/// Raw CSV row matching catalog.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: u32,
    name: String,
    category: Option<String>,
    unit_price: f64,
}

impl CsvRow {
    fn into_item(self) -> Result<CatalogItem, CatalogError> {
        if !self.unit_price.is_finite() || self.unit_price <= 0.0 {
            return Err(CatalogError::InvalidRow {
                id: self.id,
                reason: format!("unit_price must be positive, got {}", self.unit_price),
            });
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::InvalidRow {
                id: self.id,
                reason: "name is empty".to_string(),
            });
        }

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(CatalogItem {
            id: self.id,
            name,
            category,
            unit_price: self.unit_price,
        })
    }
}

/// Load a catalog from a CSV file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let reader = Reader::from_path(path)?;
    let catalog = read_rows(reader)?;
    log::info!("loaded {} catalog items from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Load a catalog from any reader (e.g., string buffer, network stream)
pub fn load_catalog_from_reader<R: std::io::Read>(reader: R) -> Result<Catalog, CatalogError> {
    read_rows(Reader::from_reader(reader))
}

/// Load the catalog from the default data/catalog.csv location
pub fn load_default_catalog() -> Result<Catalog, CatalogError> {
    load_catalog(DEFAULT_CATALOG_PATH)
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Catalog, CatalogError> {
    let mut items = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        items.push(row.into_item()?);
    }

    Ok(Catalog::new(items))
}
