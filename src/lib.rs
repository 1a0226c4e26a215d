//! Save Now, Earn Later - what everyday recurring purchases would be worth if invested
//!
//! This library provides:
//! - Closed-form growth projections for a recurring contribution
//! - Milestone summaries (value, contributions, returns, return %)
//! - An item catalog with text search
//! - Saved scenarios with per-user storage and batch projection
//! - A request-handling service used by the CLI and HTTP handler

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod expense;
pub mod projection;
pub mod scenario;
pub mod service;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogItem};
pub use config::AppConfig;
pub use error::{ProjectionError, ServiceError};
pub use expense::{Frequency, RecurringExpense};
pub use projection::{
    MilestoneSummary, ProjectionConfig, ProjectionEngine, ProjectionResult, YearlyProjectionPoint,
};
pub use scenario::ScenarioRunner;
pub use service::AppService;
