//! Profitability constraint
//!
//! Firm-side test: the present value of revenue must cover the present
//! value of cost with the target margin on top, both discounted at the firm
//! rate. Revenue streams are built from tax-exclusive amounts throughout;
//! GST collected from the customer is a pass-through to the government, and
//! counting it as revenue overstates every scenario by the tax rate.

use log::debug;

use crate::assumptions::{Assumptions, Segment};
use crate::error::ModelResult;
use crate::finance::present_value;
use crate::scenario::ScenarioParams;
use crate::simulation::MonthlyFlows;

use super::{expected_monthly_pre_tax, ConstraintResult};

/// Closed-form projected profitability over the scenario tenure.
pub fn check_profitability(
    assumptions: &Assumptions,
    scenario: &ScenarioParams,
) -> ModelResult<ConstraintResult> {
    scenario.validate()?;

    // Mix-weighted net monthly revenue per subscriber
    let mut weighted_monthly = 0.0;
    for &segment in &Segment::ALL {
        let plan = assumptions.plans.get(assumptions.plans.intended_plan(segment));
        let monthly = expected_monthly_pre_tax(
            segment,
            plan,
            assumptions,
            scenario.expected_efficiency_score,
        );
        weighted_monthly += monthly * assumptions.segments.get(segment).proportion;
    }

    let upfront_net = scenario.upfront_price_pre_tax(&assumptions.market);
    let costs = &assumptions.costs;

    let mut revenue_flows: Vec<(u32, f64)> =
        vec![(0, upfront_net + costs.bank_cac_subsidy)];
    let mut cost_flows: Vec<(u32, f64)> = vec![(0, costs.upfront_cost())];
    for month in 0..scenario.tenure_months {
        revenue_flows.push((month, weighted_monthly));
        cost_flows.push((month, costs.monthly_recurring_cost));
    }

    let firm_rate = assumptions.rates.firm_annual;
    let revenue_pv = present_value(&revenue_flows, firm_rate);
    let cost_pv = present_value(&cost_flows, firm_rate);
    debug!(
        "projected profitability: revenue_pv={revenue_pv:.0} cost_pv={cost_pv:.0} over {} months",
        scenario.tenure_months
    );

    Ok(build_result(
        "profitability_projected",
        revenue_pv,
        cost_pv,
        costs.target_margin,
    ))
}

/// Profitability evaluated on a simulated portfolio's monthly flows,
/// normalized per customer so the slack is comparable with the projection.
pub fn check_profitability_simulated(
    flows: &MonthlyFlows,
    assumptions: &Assumptions,
    n_customers: u32,
) -> ModelResult<ConstraintResult> {
    let firm_rate = assumptions.rates.firm_annual;
    let scale = 1.0 / n_customers.max(1) as f64;

    let revenue_flows: Vec<(u32, f64)> = flows
        .revenue
        .iter()
        .enumerate()
        .map(|(t, &v)| (t as u32, v * scale))
        .collect();
    let cost_flows: Vec<(u32, f64)> = flows
        .cost
        .iter()
        .enumerate()
        .map(|(t, &v)| (t as u32, v * scale))
        .collect();

    let revenue_pv = present_value(&revenue_flows, firm_rate);
    let cost_pv = present_value(&cost_flows, firm_rate);

    Ok(build_result(
        "profitability_simulated",
        revenue_pv,
        cost_pv,
        assumptions.costs.target_margin,
    ))
}

fn build_result(name: &str, revenue_pv: f64, cost_pv: f64, target_margin: f64) -> ConstraintResult {
    let required = cost_pv * (1.0 + target_margin);
    let margin_percent = if cost_pv > 0.0 {
        (revenue_pv / cost_pv - 1.0) * 100.0
    } else {
        0.0
    };
    ConstraintResult::new(name, revenue_pv - required)
        .with("revenue_pv", revenue_pv)
        .with("cost_pv", cost_pv)
        .with("required_pv", required)
        .with("target_margin_percent", target_margin * 100.0)
        .with("achieved_margin_percent", margin_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generous_pricing_is_profitable() {
        let mut assumptions = Assumptions::default_pricing();
        // Strip the cost side down to make the revenue test unambiguous
        assumptions.costs.manufacturing_cost = 5_000.0;
        assumptions.costs.monthly_recurring_cost = 50.0;
        let scenario = ScenarioParams {
            subsidy_percent: 0.10,
            ..Default::default()
        };
        let result = check_profitability(&assumptions, &scenario).unwrap();
        assert!(result.satisfied);
    }

    #[test]
    fn test_deep_subsidy_short_tenure_unprofitable() {
        let assumptions = Assumptions::default_pricing();
        let scenario = ScenarioParams {
            subsidy_percent: 0.80,
            tenure_months: 12,
            ..Default::default()
        };
        let result = check_profitability(&assumptions, &scenario).unwrap();
        assert!(!result.satisfied);
        assert!(result.slack < 0.0);
    }

    #[test]
    fn test_target_margin_raises_the_bar() {
        let mut assumptions = Assumptions::default_pricing();
        let scenario = ScenarioParams::default();
        let base = check_profitability(&assumptions, &scenario).unwrap();
        assumptions.costs.target_margin = 0.25;
        let strict = check_profitability(&assumptions, &scenario).unwrap();
        assert!(strict.slack < base.slack);
    }

    #[test]
    fn test_revenue_excludes_tax() {
        let assumptions = Assumptions::default_pricing();
        let result =
            check_profitability(&assumptions, &ScenarioParams::default()).unwrap();
        let revenue_pv = result
            .supporting
            .iter()
            .find(|(n, _)| n == "revenue_pv")
            .unwrap()
            .1;
        // A tax-inclusive revenue build would come in 18% higher; the net
        // upfront receipt alone bounds the check from above.
        let gross_upfront = 45_000.0 * 0.5;
        assert!(revenue_pv < gross_upfront * 1.18 + 700.0 * 60.0);
    }
}
