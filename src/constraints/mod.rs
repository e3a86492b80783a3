//! Economic constraint checkers
//!
//! Five checks gate a pricing scenario: participation, profitability, cash
//! flow, incentive compatibility, and moral hazard. Each checker is a pure
//! function returning a structured result with a signed slack; a failing
//! constraint is a normal outcome for the caller to present, never an
//! error. Checkers raise only on malformed input.

mod boundary;
mod cash_flow;
mod incentive;
mod participation;
mod profitability;

pub use boundary::{find_max_standard_fee, find_min_subsidy, BoundaryOutcome, SearchBounds};
pub use cash_flow::{check_cash_flow, projected_net_cash, trace_cash_flow, CashFlowTrace};
pub use incentive::{
    check_incentive_compatibility, check_moral_hazard, plan_utility, IncentiveOutcome,
    PlanDefection,
};
pub use participation::check_participation;
pub use profitability::{check_profitability, check_profitability_simulated};

use serde::Serialize;

use crate::assumptions::{Assumptions, Plan, Segment};
use crate::billing::overage_charge;

/// Outcome of a single constraint evaluation
#[derive(Debug, Clone, Serialize)]
pub struct ConstraintResult {
    pub constraint: String,

    pub satisfied: bool,

    /// Signed distance from the threshold. Positive means satisfied with
    /// room to spare, negative quantifies the shortfall.
    pub slack: f64,

    /// Intermediate values the verdict was computed from, for display
    pub supporting: Vec<(String, f64)>,
}

impl ConstraintResult {
    pub fn new(constraint: impl Into<String>, slack: f64) -> Self {
        Self {
            constraint: constraint.into(),
            satisfied: slack >= 0.0,
            slack,
            supporting: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.supporting.push((name.into(), value));
        self
    }

    pub fn status_str(&self) -> &'static str {
        if self.satisfied {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

/// Expected pre-tax monthly bill for a segment on a plan, using the
/// segment's expected hours against the plan's annual-average quota.
///
/// Shared by the participation, incentive, and moral hazard checks so plan
/// comparison is computed one way everywhere.
pub(crate) fn expected_monthly_pre_tax(
    segment: Segment,
    plan: &Plan,
    assumptions: &Assumptions,
    efficiency_score: f64,
) -> f64 {
    let expected_hours = assumptions.segments.get(segment).expected_hours;
    let included = plan.included.annual_average();
    let overage = overage_charge(
        expected_hours,
        included,
        plan.overage_rate_per_hour,
        plan.overage_cap,
    );
    let discount = plan.monthly_fee * assumptions.tiers.discount_for(efficiency_score);
    (plan.monthly_fee + overage - discount).max(0.0)
}

/// Tax-inclusive version of [`expected_monthly_pre_tax`].
pub(crate) fn expected_monthly_cost(
    segment: Segment,
    plan: &Plan,
    assumptions: &Assumptions,
    efficiency_score: f64,
) -> f64 {
    expected_monthly_pre_tax(segment, plan, assumptions, efficiency_score)
        * (1.0 + assumptions.market.tax_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::PlanId;
    use approx::assert_relative_eq;

    #[test]
    fn test_slack_sign_sets_satisfied() {
        assert!(ConstraintResult::new("x", 0.0).satisfied);
        assert!(ConstraintResult::new("x", 12.5).satisfied);
        assert!(!ConstraintResult::new("x", -0.1).satisfied);
    }

    #[test]
    fn test_expected_monthly_cost_components() {
        let assumptions = Assumptions::default_pricing();
        let standard = assumptions.plans.get(PlanId::Standard);

        // Moderate segment, 200 expected hours on a ~176.7 average quota,
        // star-tier score
        let pre_tax = expected_monthly_pre_tax(Segment::Moderate, standard, &assumptions, 75.0);
        let included = standard.included.annual_average();
        let expected =
            599.0 + (200.0 - included) * 5.0 - 599.0 * 0.12;
        assert_relative_eq!(pre_tax, expected, epsilon = 1e-9);

        let with_tax = expected_monthly_cost(Segment::Moderate, standard, &assumptions, 75.0);
        assert_relative_eq!(with_tax, expected * 1.18, epsilon = 1e-9);
    }
}
