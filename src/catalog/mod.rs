//! Item catalog and text search

mod data;
pub mod loader;

pub use data::{Catalog, CatalogItem, DEFAULT_SEARCH_LIMIT};
pub use loader::{
    load_catalog, load_catalog_from_reader, load_default_catalog, DEFAULT_CATALOG_PATH,
};
