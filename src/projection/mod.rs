//! Growth projection engine for recurring expenses

mod engine;
mod series;

pub use engine::{
    compute_annual_contribution, project_series, summarize_milestones, ProjectionConfig,
    ProjectionEngine, DEFAULT_MAX_YEARS, DEFAULT_MILESTONE_YEARS, MAX_PROJECTION_YEARS,
};
pub use series::{MilestoneSummary, ProjectionResult, YearlyProjectionPoint};
