//! Pricing scenario under evaluation
//!
//! The assumption set describes the world; a scenario describes the pricing
//! decision being tested against it. Scenarios are plain serde structs so
//! the CLI can load overrides from JSON.

use serde::{Deserialize, Serialize};

use crate::assumptions::MarketAssumptions;
use crate::error::{ModelError, ModelResult};

/// Decision variables for one pricing scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Fraction of the appliance price absorbed as upfront subsidy
    #[serde(default = "default_subsidy")]
    pub subsidy_percent: f64,

    /// Program tenure in months (simulation and firm-side checks)
    #[serde(default = "default_tenure")]
    pub tenure_months: u32,

    /// Horizon for customer-side comparisons against alternatives
    #[serde(default = "default_horizon")]
    pub comparison_horizon_months: u32,

    /// Efficiency score assumed in closed-form checks
    #[serde(default = "default_score")]
    pub expected_efficiency_score: f64,

    /// Financing tenure used for the EMI comparison
    #[serde(default = "default_emi_tenure")]
    pub emi_tenure_months: u32,

    /// Monthly amount a segment may save by gaming plan choice before the
    /// moral hazard check fails
    #[serde(default = "default_tolerance")]
    pub moral_hazard_tolerance: f64,

    /// Fraction of customers who pick a plan other than their intended one
    #[serde(default = "default_mismatch")]
    pub plan_mismatch_rate: f64,
}

fn default_subsidy() -> f64 {
    0.50
}
fn default_tenure() -> u32 {
    60
}
fn default_horizon() -> u32 {
    24
}
fn default_score() -> f64 {
    75.0
}
fn default_emi_tenure() -> u32 {
    12
}
fn default_tolerance() -> f64 {
    25.0
}
fn default_mismatch() -> f64 {
    0.05
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            subsidy_percent: default_subsidy(),
            tenure_months: default_tenure(),
            comparison_horizon_months: default_horizon(),
            expected_efficiency_score: default_score(),
            emi_tenure_months: default_emi_tenure(),
            moral_hazard_tolerance: default_tolerance(),
            plan_mismatch_rate: default_mismatch(),
        }
    }
}

impl ScenarioParams {
    /// Upfront price the customer is quoted, pre-tax. The MRP is quoted
    /// tax-inclusive, so the subsidy applies to its pre-tax base.
    pub fn upfront_price_pre_tax(&self, market: &MarketAssumptions) -> f64 {
        market.mrp / (1.0 + market.tax_rate) * (1.0 - self.subsidy_percent)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.tenure_months == 0 || self.comparison_horizon_months == 0 {
            return Err(ModelError::config("scenario tenures must be at least one month"));
        }
        if !(0.0..1.0).contains(&self.subsidy_percent) {
            return Err(ModelError::config("subsidy percent must be in [0, 1)"));
        }
        if !(0.0..=100.0).contains(&self.expected_efficiency_score) {
            return Err(ModelError::config("expected efficiency score must be in [0, 100]"));
        }
        if self.emi_tenure_months == 0 || self.emi_tenure_months > self.comparison_horizon_months {
            return Err(ModelError::config(
                "EMI tenure must be within the comparison horizon",
            ));
        }
        if self.moral_hazard_tolerance < 0.0 {
            return Err(ModelError::config("moral hazard tolerance must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.plan_mismatch_rate) {
            return Err(ModelError::config("plan mismatch rate must be in [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_scenario_valid() {
        assert!(ScenarioParams::default().validate().is_ok());
    }

    #[test]
    fn test_upfront_price() {
        let market = MarketAssumptions::default();
        let scenario = ScenarioParams::default();
        // 45,000 / 1.18 * 0.5; customer then pays this plus GST, which is
        // exactly half the sticker price
        let pre_tax = scenario.upfront_price_pre_tax(&market);
        assert_relative_eq!(pre_tax * 1.18, 22_500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_tenure_rejected() {
        let scenario = ScenarioParams {
            tenure_months: 0,
            ..Default::default()
        };
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_emi_tenure_must_fit_horizon() {
        let scenario = ScenarioParams {
            emi_tenure_months: 36,
            comparison_horizon_months: 24,
            ..Default::default()
        };
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        // Partial JSON fills the rest from defaults
        let scenario: ScenarioParams =
            serde_json::from_str(r#"{"subsidy_percent": 0.65}"#).unwrap();
        assert_eq!(scenario.subsidy_percent, 0.65);
        assert_eq!(scenario.tenure_months, 60);
        assert!(scenario.validate().is_ok());
    }
}
