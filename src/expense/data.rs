//! Recurring expense data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Assumed annual return when the caller does not supply one (~long-run S&P 500 average)
pub const DEFAULT_ANNUAL_RETURN_RATE: f64 = 0.10;

/// Days used to convert a frequency in days into occurrences per year
pub const DAYS_PER_YEAR: f64 = 365.0;

/// How often a purchase happens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Once every N days (N > 0, may be fractional)
    EveryDays(f64),
}

impl Frequency {
    /// Normalised number of occurrences per year
    pub fn occurrences_per_year(&self) -> f64 {
        match self {
            Frequency::Daily => 365.0,
            Frequency::Weekly => 52.0,
            Frequency::Monthly => 12.0,
            Frequency::Yearly => 1.0,
            Frequency::EveryDays(days) => DAYS_PER_YEAR / days,
        }
    }

    /// Human readable label ("daily", "every 3 days", ...)
    pub fn label(&self) -> String {
        match self {
            Frequency::Daily => "daily".to_string(),
            Frequency::Weekly => "weekly".to_string(),
            Frequency::Monthly => "monthly".to_string(),
            Frequency::Yearly => "yearly".to_string(),
            Frequency::EveryDays(days) if *days == 1.0 => "every day".to_string(),
            Frequency::EveryDays(days) => format!("every {} days", days),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" | "annually" => Ok(Frequency::Yearly),
            other => Err(format!("Unknown frequency: {}", other)),
        }
    }
}

/// A single recurring purchase to be projected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    /// Currency amount per occurrence
    pub unit_price: f64,

    /// Occurrences per year (365 / frequency_days, or a keyword's fixed count)
    pub occurrences_per_year: f64,

    /// Assumed annual compounding rate, must be greater than -1
    pub annual_return_rate: f64,
}

impl RecurringExpense {
    /// Create an expense at the default 10% annual return
    pub fn new(unit_price: f64, frequency: Frequency) -> Self {
        Self {
            unit_price,
            occurrences_per_year: frequency.occurrences_per_year(),
            annual_return_rate: DEFAULT_ANNUAL_RETURN_RATE,
        }
    }

    /// Create an expense from a frequency expressed in days between purchases
    pub fn from_frequency_days(unit_price: f64, frequency_days: f64) -> Self {
        Self::new(unit_price, Frequency::EveryDays(frequency_days))
    }

    /// Override the assumed annual return
    pub fn with_annual_return(mut self, annual_return_rate: f64) -> Self {
        self.annual_return_rate = annual_return_rate;
        self
    }
}
