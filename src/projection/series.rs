//! Projection output structures

use serde::{Deserialize, Serialize};

/// Projected value of all contributions made through one elapsed year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjectionPoint {
    /// Elapsed year (1-indexed)
    pub year: u32,

    /// Future value of contributions through this year, compounded annually
    pub projected_value: f64,

    /// Nominal sum of contributions through this year
    pub total_contributed: f64,

    /// projected_value - total_contributed
    pub total_returns: f64,
}

impl YearlyProjectionPoint {
    /// Copy with every amount rounded to whole currency units for display
    pub fn rounded(&self) -> Self {
        Self {
            year: self.year,
            projected_value: self.projected_value.round(),
            total_contributed: self.total_contributed.round(),
            total_returns: self.total_returns.round(),
        }
    }
}

/// Summary statistics at a milestone year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSummary {
    pub year: u32,
    pub projected_value: f64,
    pub total_contributed: f64,
    pub total_returns: f64,

    /// round(total_returns / total_contributed * 100), 0 when nothing was contributed
    pub return_percentage: i64,
}

impl MilestoneSummary {
    /// Build a summary from the series point for the milestone year
    pub fn from_point(point: &YearlyProjectionPoint) -> Self {
        let return_percentage = if point.total_contributed == 0.0 {
            0
        } else {
            (point.total_returns / point.total_contributed * 100.0).round() as i64
        };

        Self {
            year: point.year,
            projected_value: point.projected_value,
            total_contributed: point.total_contributed,
            total_returns: point.total_returns,
            return_percentage,
        }
    }

    /// Copy with amounts rounded to whole currency units
    pub fn rounded(&self) -> Self {
        Self {
            projected_value: self.projected_value.round(),
            total_contributed: self.total_contributed.round(),
            total_returns: self.total_returns.round(),
            ..*self
        }
    }
}

/// Complete projection for one recurring expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// unit_price * occurrences_per_year
    pub annual_amount: f64,

    /// One point per year, ascending
    pub series: Vec<YearlyProjectionPoint>,

    /// One summary per configured milestone, ascending
    pub milestones: Vec<MilestoneSummary>,
}

impl ProjectionResult {
    /// Series rounded for display
    pub fn rounded_series(&self) -> Vec<YearlyProjectionPoint> {
        self.series.iter().map(YearlyProjectionPoint::rounded).collect()
    }

    /// Milestones rounded for display
    pub fn rounded_milestones(&self) -> Vec<MilestoneSummary> {
        self.milestones.iter().map(MilestoneSummary::rounded).collect()
    }

    /// Copy with series and milestones rounded for display
    pub fn rounded(&self) -> Self {
        Self {
            annual_amount: self.annual_amount,
            series: self.rounded_series(),
            milestones: self.rounded_milestones(),
        }
    }

    /// Last projected year, if any
    pub fn final_point(&self) -> Option<&YearlyProjectionPoint> {
        self.series.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: u32, projected_value: f64, total_contributed: f64) -> YearlyProjectionPoint {
        YearlyProjectionPoint {
            year,
            projected_value,
            total_contributed,
            total_returns: projected_value - total_contributed,
        }
    }

    #[test]
    fn test_rounded_point() {
        let rounded = point(5, 879.1344, 720.0).rounded();
        assert_eq!(rounded.projected_value, 879.0);
        assert_eq!(rounded.total_contributed, 720.0);
        assert_eq!(rounded.total_returns, 159.0);
        assert_eq!(rounded.year, 5);
    }

    #[test]
    fn test_return_percentage() {
        let summary = MilestoneSummary::from_point(&point(5, 879.1344, 720.0));
        // 159.1344 / 720 = 22.1%
        assert_eq!(summary.return_percentage, 22);
    }

    #[test]
    fn test_return_percentage_zero_contribution() {
        let summary = MilestoneSummary::from_point(&point(10, 0.0, 0.0));
        assert_eq!(summary.return_percentage, 0);
    }

    #[test]
    fn test_negative_return_percentage() {
        let summary = MilestoneSummary::from_point(&point(1, 90.0, 100.0));
        assert_eq!(summary.return_percentage, -10);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(point(1, 1825.0, 1825.0)).unwrap();
        assert_eq!(json["year"], 1);
        assert_eq!(json["projectedValue"], 1825.0);
        assert_eq!(json["totalContributed"], 1825.0);
        assert_eq!(json["totalReturns"], 0.0);
    }
}
