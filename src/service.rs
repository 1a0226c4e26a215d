//! Request-handling layer
//!
//! Validates boundary inputs, resolves the caller's identity and wires the
//! catalog, scenario store and projection engine together. Every operation
//! returns plain serializable values so any transport (CLI, HTTP) can sit on
//! top.

use crate::auth::{Authenticator, Session, User};
use crate::catalog::{Catalog, CatalogItem};
use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::expense::{Frequency, RecurringExpense};
use crate::projection::{MilestoneSummary, ProjectionEngine, YearlyProjectionPoint};
use crate::scenario::{
    NewScenario, Scenario, ScenarioItem, ScenarioProjection, ScenarioRunner, ScenarioStore,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input for a growth projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthProjectionRequest {
    /// Price per purchase
    pub price: f64,

    /// Days between purchases
    #[serde(default)]
    pub frequency_days: Option<f64>,

    /// Frequency keyword ("daily", "weekly", "monthly", "yearly")
    #[serde(default)]
    pub frequency: Option<String>,

    /// Assumed annual return; the configured default applies when absent
    #[serde(default)]
    pub annual_return: Option<f64>,
}

/// Projection as returned to the caller, amounts rounded to whole units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthProjectionResponse {
    pub annual_amount: f64,
    pub series: Vec<YearlyProjectionPoint>,
    pub milestones: Vec<MilestoneSummary>,
}

/// Scenario submitted for saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveScenarioRequest {
    pub title: String,
    #[serde(default)]
    pub items: Vec<ScenarioItem>,
}

/// Saved scenario item with its catalog record attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedScenarioItem {
    #[serde(flatten)]
    pub entry: ScenarioItem,

    /// Catalog record for `item_id`, when the item came from the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<CatalogItem>,
}

/// Saved scenario as listed back to its owner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedScenario {
    pub id: u64,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ListedScenarioItem>,
}

/// A saved scenario together with its projection, amounts rounded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedScenario {
    pub scenario: ListedScenario,
    pub projection: ScenarioProjection,
}

/// The application's request-handling service
pub struct AppService {
    catalog: Catalog,
    scenarios: Arc<dyn ScenarioStore>,
    auth: Arc<dyn Authenticator>,
    runner: ScenarioRunner,
    search_limit: usize,
    default_annual_return: f64,
}

impl AppService {
    pub fn new(
        config: &AppConfig,
        catalog: Catalog,
        scenarios: Arc<dyn ScenarioStore>,
        auth: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            catalog,
            scenarios,
            auth,
            runner: ScenarioRunner::new(ProjectionEngine::new(config.projection.clone())),
            search_limit: config.search_limit,
            default_annual_return: config.default_annual_return,
        }
    }

    /// Catalog items matching `query` by name or category
    pub fn search_items(&self, query: &str) -> Result<Vec<CatalogItem>, ServiceError> {
        if query.trim().is_empty() {
            return Err(ServiceError::Validation("query must not be empty".to_string()));
        }
        let items = self.catalog.search(query, self.search_limit);
        log::debug!("search {:?} matched {} items", query, items.len());
        Ok(items)
    }

    /// Yearly growth projection for a single recurring purchase
    pub fn growth_projections(
        &self,
        request: &GrowthProjectionRequest,
    ) -> Result<GrowthProjectionResponse, ServiceError> {
        let expense = self.expense_from_request(request)?;
        let result = self.runner.engine().project(&expense)?;

        Ok(GrowthProjectionResponse {
            annual_amount: result.annual_amount,
            series: result.rounded_series(),
            milestones: result.rounded_milestones(),
        })
    }

    /// Persist a scenario for the signed-in caller
    pub fn save_scenario(
        &self,
        token: Option<&str>,
        request: SaveScenarioRequest,
    ) -> Result<Scenario, ServiceError> {
        let user = self.require_user(token)?;

        let title = request.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("title must not be empty".to_string()));
        }
        for (idx, item) in request.items.iter().enumerate() {
            self.validate_scenario_item(item).map_err(|reason| {
                ServiceError::Validation(format!("item {}: {}", idx + 1, reason))
            })?;
        }

        let scenario = self.scenarios.insert(
            &user.id,
            NewScenario {
                title: title.to_string(),
                items: request.items,
            },
        );
        log::info!("saved scenario {} for user {}", scenario.id, user.id);
        Ok(scenario)
    }

    /// Scenarios saved by the signed-in caller, newest first
    pub fn user_scenarios(&self, token: Option<&str>) -> Result<Vec<ListedScenario>, ServiceError> {
        let user = self.require_user(token)?;
        Ok(self
            .scenarios
            .list_for_user(&user.id)
            .into_iter()
            .map(|scenario| self.listed(scenario))
            .collect())
    }

    /// Saved scenarios with each one's projection at `annual_return` (or the default)
    pub fn project_user_scenarios(
        &self,
        token: Option<&str>,
        annual_return: Option<f64>,
    ) -> Result<Vec<ProjectedScenario>, ServiceError> {
        let user = self.require_user(token)?;
        let scenarios = self.scenarios.list_for_user(&user.id);
        let rate = annual_return.unwrap_or(self.default_annual_return);
        let projections = self.runner.run_batch(&scenarios, rate)?;

        Ok(scenarios
            .into_iter()
            .zip(projections)
            .map(|(scenario, projection)| ProjectedScenario {
                scenario: self.listed(scenario),
                projection: projection.rounded(),
            })
            .collect())
    }

    /// Complete the sign-in handshake
    pub fn exchange_code(&self, code: &str) -> Result<Session, ServiceError> {
        if code.trim().is_empty() {
            return Err(ServiceError::InvalidAuthCode);
        }
        self.auth.exchange_code(code)
    }

    /// Signed-in user for a session token
    pub fn current_user(&self, token: Option<&str>) -> Option<User> {
        token.and_then(|t| self.auth.current_user(t))
    }

    fn require_user(&self, token: Option<&str>) -> Result<User, ServiceError> {
        self.current_user(token).ok_or_else(|| {
            log::warn!("rejected unauthenticated request");
            ServiceError::NotAuthenticated
        })
    }

    fn listed(&self, scenario: Scenario) -> ListedScenario {
        let items = scenario
            .items
            .into_iter()
            .map(|entry| ListedScenarioItem {
                item: entry.item_id.and_then(|id| self.catalog.get(id)).cloned(),
                entry,
            })
            .collect();

        ListedScenario {
            id: scenario.id,
            user_id: scenario.user_id,
            title: scenario.title,
            created_at: scenario.created_at,
            items,
        }
    }

    fn expense_from_request(
        &self,
        request: &GrowthProjectionRequest,
    ) -> Result<RecurringExpense, ServiceError> {
        if !request.price.is_finite() || request.price <= 0.0 {
            return Err(ServiceError::Validation(format!(
                "price must be positive, got {}",
                request.price
            )));
        }

        let frequency = match (request.frequency_days, request.frequency.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(ServiceError::Validation(
                    "give either frequencyDays or frequency, not both".to_string(),
                ))
            }
            (Some(days), None) => {
                if !days.is_finite() || days <= 0.0 {
                    return Err(ServiceError::Validation(format!(
                        "frequencyDays must be positive, got {}",
                        days
                    )));
                }
                Frequency::EveryDays(days)
            }
            (None, Some(keyword)) => {
                keyword.parse::<Frequency>().map_err(ServiceError::Validation)?
            }
            (None, None) => {
                return Err(ServiceError::Validation(
                    "frequencyDays or frequency is required".to_string(),
                ))
            }
        };

        let rate = request.annual_return.unwrap_or(self.default_annual_return);
        Ok(RecurringExpense::new(request.price, frequency).with_annual_return(rate))
    }

    fn validate_scenario_item(&self, item: &ScenarioItem) -> Result<(), String> {
        if !item.price.is_finite() || item.price <= 0.0 {
            return Err(format!("price must be positive, got {}", item.price));
        }
        if !item.frequency_days.is_finite() || item.frequency_days <= 0.0 {
            return Err(format!("frequencyDays must be positive, got {}", item.frequency_days));
        }

        match (item.item_id, item.custom_name.as_deref()) {
            (Some(id), _) if self.catalog.get(id).is_none() => {
                Err(format!("unknown item id {}", id))
            }
            (Some(_), _) => Ok(()),
            (None, Some(name)) if !name.trim().is_empty() => Ok(()),
            (None, _) => Err("either itemId or customName is required".to_string()),
        }
    }
}
