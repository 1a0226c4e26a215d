//! Closed-form growth projection for a recurring contribution
//!
//! Contributions are made once a year and compound annually at a fixed rate,
//! so the value after `y` years is the future value of an ordinary annuity:
//! `A * ((1 + r)^y - 1) / r`.

use crate::error::ProjectionError;
use crate::expense::RecurringExpense;
use super::series::{MilestoneSummary, ProjectionResult, YearlyProjectionPoint};
use serde::{Deserialize, Serialize};

/// Default projection horizon in years
pub const DEFAULT_MAX_YEARS: u32 = 30;

/// Longest horizon a projection may cover
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Default milestone years reported in summaries
pub const DEFAULT_MILESTONE_YEARS: [u32; 4] = [5, 10, 15, 30];

/// Annual amount spent on a recurring purchase
pub fn compute_annual_contribution(
    unit_price: f64,
    occurrences_per_year: f64,
) -> Result<f64, ProjectionError> {
    if !unit_price.is_finite() || unit_price <= 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "unit price must be a positive number, got {}",
            unit_price
        )));
    }
    if !occurrences_per_year.is_finite() || occurrences_per_year <= 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "occurrences per year must be a positive number, got {}",
            occurrences_per_year
        )));
    }

    Ok(unit_price * occurrences_per_year)
}

/// Project the value of `annual_amount` contributed every year for `max_years` years
///
/// Returns exactly `max_years` points ordered by year. Values are unrounded.
pub fn project_series(
    annual_amount: f64,
    annual_return_rate: f64,
    max_years: u32,
) -> Result<Vec<YearlyProjectionPoint>, ProjectionError> {
    if !annual_amount.is_finite() || annual_amount < 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "annual amount must be a non-negative number, got {}",
            annual_amount
        )));
    }
    if max_years < 1 {
        return Err(ProjectionError::InvalidInput(
            "projection must cover at least one year".to_string(),
        ));
    }
    if max_years > MAX_PROJECTION_YEARS {
        return Err(ProjectionError::InvalidInput(format!(
            "projection may cover at most {} years, got {}",
            MAX_PROJECTION_YEARS, max_years
        )));
    }
    // (1 + r) must stay positive for the growth factor to be meaningful
    if !annual_return_rate.is_finite() || annual_return_rate <= -1.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "annual return rate must be greater than -1, got {}",
            annual_return_rate
        )));
    }

    let growth = 1.0 + annual_return_rate;

    let series = (1..=max_years)
        .map(|year| {
            let total_contributed = annual_amount * year as f64;
            let projected_value = if annual_return_rate == 0.0 {
                total_contributed
            } else {
                annual_amount * (growth.powi(year as i32) - 1.0) / annual_return_rate
            };

            YearlyProjectionPoint {
                year,
                projected_value,
                total_contributed,
                total_returns: projected_value - total_contributed,
            }
        })
        .collect();

    Ok(series)
}

/// Pick the series points at each milestone year and compute return percentages
///
/// Milestones must be strictly ascending.
pub fn summarize_milestones(
    series: &[YearlyProjectionPoint],
    milestone_years: &[u32],
) -> Result<Vec<MilestoneSummary>, ProjectionError> {
    if milestone_years.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(ProjectionError::InvalidInput(format!(
            "milestone years must be strictly ascending, got {:?}",
            milestone_years
        )));
    }

    let max_year = series.last().map(|p| p.year).unwrap_or(0);

    milestone_years
        .iter()
        .map(|&year| {
            series
                .iter()
                .find(|p| p.year == year)
                .map(MilestoneSummary::from_point)
                .ok_or(ProjectionError::MilestoneOutOfRange { year, max_year })
        })
        .collect()
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Number of years to project
    pub max_years: u32,

    /// Years at which summaries are reported (ascending, each <= max_years)
    pub milestone_years: Vec<u32>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_years: DEFAULT_MAX_YEARS,
            milestone_years: DEFAULT_MILESTONE_YEARS.to_vec(),
        }
    }
}

/// Projection engine bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the full projection for a single recurring expense
    pub fn project(&self, expense: &RecurringExpense) -> Result<ProjectionResult, ProjectionError> {
        let annual_amount =
            compute_annual_contribution(expense.unit_price, expense.occurrences_per_year)?;
        self.project_annual_amount(annual_amount, expense.annual_return_rate)
    }

    /// Run the projection for an already-computed annual amount
    pub fn project_annual_amount(
        &self,
        annual_amount: f64,
        annual_return_rate: f64,
    ) -> Result<ProjectionResult, ProjectionError> {
        let series = project_series(annual_amount, annual_return_rate, self.config.max_years)?;
        let milestones = summarize_milestones(&series, &self.config.milestone_years)?;

        log::debug!(
            "projected {:.2}/yr at {:.4} over {} years",
            annual_amount,
            annual_return_rate,
            self.config.max_years
        );

        Ok(ProjectionResult {
            annual_amount,
            series,
            milestones,
        })
    }
}
