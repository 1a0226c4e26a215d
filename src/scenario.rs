//! Saved scenarios and batch projection over their items
//!
//! A scenario is a user-named set of recurring purchases. Persistence sits
//! behind [`ScenarioStore`] so the request layer does not care where
//! scenarios live; [`ScenarioRunner`] projects every item of a scenario with
//! one engine configuration.

use crate::error::ProjectionError;
use crate::expense::RecurringExpense;
use crate::projection::{
    project_series, summarize_milestones, MilestoneSummary, ProjectionEngine, ProjectionResult,
    YearlyProjectionPoint,
};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// One recurring purchase inside a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioItem {
    /// Catalog item, when the purchase was picked from the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<u32>,

    /// Free-form name, when the purchase is not in the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,

    pub price: f64,

    /// Days between purchases
    pub frequency_days: f64,
}

impl ScenarioItem {
    /// Expense to project for this item at the given annual return
    pub fn to_expense(&self, annual_return_rate: f64) -> RecurringExpense {
        RecurringExpense::from_frequency_days(self.price, self.frequency_days)
            .with_annual_return(annual_return_rate)
    }
}

/// Scenario as submitted by a user, before it is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScenario {
    pub title: String,
    pub items: Vec<ScenarioItem>,
}

/// A persisted scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: u64,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ScenarioItem>,
}

/// Persistence for saved scenarios
pub trait ScenarioStore: Send + Sync {
    /// Persist a scenario for `user_id` and return the stored record
    fn insert(&self, user_id: &str, scenario: NewScenario) -> Scenario;

    /// All scenarios belonging to `user_id`, newest first
    fn list_for_user(&self, user_id: &str) -> Vec<Scenario>;
}

/// Scenario store kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryScenarioStore {
    scenarios: RwLock<Vec<Scenario>>,
}

impl InMemoryScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_at(
        &self,
        user_id: &str,
        scenario: NewScenario,
        created_at: DateTime<Utc>,
    ) -> Scenario {
        let mut scenarios = self.scenarios.write().unwrap_or_else(|e| e.into_inner());
        let record = Scenario {
            id: scenarios.len() as u64 + 1,
            user_id: user_id.to_string(),
            title: scenario.title,
            created_at,
            items: scenario.items,
        };
        scenarios.push(record.clone());
        record
    }
}

impl ScenarioStore for InMemoryScenarioStore {
    fn insert(&self, user_id: &str, scenario: NewScenario) -> Scenario {
        self.insert_at(user_id, scenario, Utc::now())
    }

    fn list_for_user(&self, user_id: &str) -> Vec<Scenario> {
        let scenarios = self.scenarios.read().unwrap_or_else(|e| e.into_inner());
        let mut owned: Vec<Scenario> = scenarios
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        owned
    }
}

/// Projection of every item in a scenario plus the combined total
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProjection {
    /// Per-item results, in scenario item order
    pub items: Vec<ProjectionResult>,

    /// Sum of all items, year by year
    pub combined: ProjectionResult,
}

impl ScenarioProjection {
    /// Copy with every amount rounded to whole currency units
    pub fn rounded(&self) -> Self {
        Self {
            items: self.items.iter().map(ProjectionResult::rounded).collect(),
            combined: self.combined.rounded(),
        }
    }
}

/// Projects scenarios with a shared engine configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(ProjectionEngine::default());
/// let projection = runner.run(&scenario, 0.10)?;
/// println!("{:?}", projection.combined.final_point());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new(engine: ProjectionEngine) -> Self {
        Self { engine }
    }

    /// Project every item of a scenario in parallel and combine the results
    pub fn run(
        &self,
        scenario: &Scenario,
        annual_return_rate: f64,
    ) -> Result<ScenarioProjection, ProjectionError> {
        let items: Vec<ProjectionResult> = scenario
            .items
            .par_iter()
            .map(|item| self.engine.project(&item.to_expense(annual_return_rate)))
            .collect::<Result<_, _>>()?;

        let combined = self.combine(&items, annual_return_rate)?;
        Ok(ScenarioProjection { items, combined })
    }

    /// Run several scenarios with the same return assumption
    pub fn run_batch(
        &self,
        scenarios: &[Scenario],
        annual_return_rate: f64,
    ) -> Result<Vec<ScenarioProjection>, ProjectionError> {
        scenarios
            .iter()
            .map(|scenario| self.run(scenario, annual_return_rate))
            .collect()
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    fn combine(
        &self,
        items: &[ProjectionResult],
        annual_return_rate: f64,
    ) -> Result<ProjectionResult, ProjectionError> {
        let config = self.engine.config();
        // Start from an all-zero series so an empty scenario still has every year
        let mut series: Vec<YearlyProjectionPoint> =
            project_series(0.0, annual_return_rate, config.max_years)?;

        for result in items {
            for (total, point) in series.iter_mut().zip(&result.series) {
                total.projected_value += point.projected_value;
                total.total_contributed += point.total_contributed;
                total.total_returns = total.projected_value - total.total_contributed;
            }
        }

        let milestones: Vec<MilestoneSummary> =
            summarize_milestones(&series, &config.milestone_years)?;

        Ok(ProjectionResult {
            annual_amount: items.iter().map(|r| r.annual_amount).sum(),
            series,
            milestones,
        })
    }
}
