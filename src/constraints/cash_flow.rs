//! Cash flow constraint
//!
//! Walks the monthly net cash series, tracking the running total, its
//! deepest point, and the first month the cumulative position turns
//! non-negative. The scenario fails if the trough breaches the configured
//! floor: a plan that is profitable in PV terms can still sink the program
//! if the hole in the middle is deeper than the firm can finance.

use crate::assumptions::{Assumptions, Segment};
use crate::error::{ModelError, ModelResult};
use crate::scenario::ScenarioParams;

use super::{expected_monthly_pre_tax, ConstraintResult};

/// Running cash position over a monthly series
#[derive(Debug, Clone)]
pub struct CashFlowTrace {
    /// Deepest cumulative position
    pub running_minimum: f64,

    /// Month the minimum occurred (0-based)
    pub min_month: u32,

    /// First month the cumulative position is non-negative, if reached
    pub breakeven_month: Option<u32>,

    /// Cumulative position after the final month
    pub final_position: f64,
}

/// Accumulate a net cash series into its trace.
pub fn trace_cash_flow(monthly_net: &[f64]) -> ModelResult<CashFlowTrace> {
    if monthly_net.is_empty() {
        return Err(ModelError::config("cash flow series is empty"));
    }

    let mut running = 0.0;
    let mut running_minimum = f64::MAX;
    let mut min_month = 0;
    let mut breakeven_month = None;

    for (month, &net) in monthly_net.iter().enumerate() {
        running += net;
        if running < running_minimum {
            running_minimum = running;
            min_month = month as u32;
        }
        if breakeven_month.is_none() && running >= 0.0 {
            breakeven_month = Some(month as u32);
        }
    }

    Ok(CashFlowTrace {
        running_minimum,
        min_month,
        breakeven_month,
        final_position: running,
    })
}

/// Check the series against the floor. Slack is the distance between the
/// trough and the floor.
pub fn check_cash_flow(monthly_net: &[f64], floor: f64) -> ModelResult<ConstraintResult> {
    let trace = trace_cash_flow(monthly_net)?;

    let mut result = ConstraintResult::new("cash_flow", trace.running_minimum - floor)
        .with("running_minimum", trace.running_minimum)
        .with("min_month", trace.min_month as f64)
        .with("floor", floor)
        .with("final_position", trace.final_position);
    match trace.breakeven_month {
        Some(month) => {
            result = result
                .with("breakeven_reached", 1.0)
                .with("breakeven_month", month as f64);
        }
        None => {
            result = result.with("breakeven_reached", 0.0);
        }
    }
    Ok(result)
}

/// Per-customer projected net cash series for a scenario: upfront receipts
/// and outlays land in month 0, then the mix-weighted net fee against the
/// recurring cost each month.
pub fn projected_net_cash(
    assumptions: &Assumptions,
    scenario: &ScenarioParams,
) -> ModelResult<Vec<f64>> {
    scenario.validate()?;

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

    let costs = &assumptions.costs;
    let monthly_net = weighted_monthly - costs.monthly_recurring_cost;

    let mut series = Vec::with_capacity(scenario.tenure_months as usize);
    for month in 0..scenario.tenure_months {
        let mut net = monthly_net;
        if month == 0 {
            net += scenario.upfront_price_pre_tax(&assumptions.market) + costs.bank_cac_subsidy
                - costs.upfront_cost();
        }
        series.push(net);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trace_breakeven_and_minimum() {
        // Deficit of 100, then +30 per month: trough at month 0, cumulative
        // turns non-negative at month 4 (-100, -70, -40, -10, +20)
        let series = [-100.0, 30.0, 30.0, 30.0, 30.0, 30.0];
        let trace = trace_cash_flow(&series).unwrap();
        assert_relative_eq!(trace.running_minimum, -100.0, epsilon = 1e-12);
        assert_eq!(trace.min_month, 0);
        assert_eq!(trace.breakeven_month, Some(4));
        assert_relative_eq!(trace.final_position, 50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_breakeven_not_reached() {
        let series = [-100.0, 10.0, 10.0];
        let trace = trace_cash_flow(&series).unwrap();
        assert_eq!(trace.breakeven_month, None);
        assert!(trace.final_position < 0.0);
    }

    #[test]
    fn test_floor_breach_fails() {
        let series = [-100.0, 30.0, 30.0, 30.0, 30.0];
        let ok = check_cash_flow(&series, -150.0).unwrap();
        assert!(ok.satisfied);
        assert_relative_eq!(ok.slack, 50.0, epsilon = 1e-12);

        let breach = check_cash_flow(&series, -50.0).unwrap();
        assert!(!breach.satisfied);
        assert_relative_eq!(breach.slack, -50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_positive_series_breaks_even_immediately() {
        let trace = trace_cash_flow(&[10.0, 10.0]).unwrap();
        assert_eq!(trace.breakeven_month, Some(0));
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(trace_cash_flow(&[]).is_err());
    }

    #[test]
    fn test_projected_series_shape() {
        let assumptions = crate::assumptions::Assumptions::default_pricing();
        let scenario = ScenarioParams::default();
        let series = projected_net_cash(&assumptions, &scenario).unwrap();
        assert_eq!(series.len(), 60);
        // Month 0 carries the upfront deficit
        assert!(series[0] < series[1]);
        // Steady months are identical
        assert_relative_eq!(series[1], series[59], epsilon = 1e-12);
    }

    #[test]
    fn test_default_scenario_recovers_within_tenure() {
        let assumptions = crate::assumptions::Assumptions::default_pricing();
        let scenario = ScenarioParams::default();
        let series = projected_net_cash(&assumptions, &scenario).unwrap();
        let trace = trace_cash_flow(&series).unwrap();
        assert!(trace.breakeven_month.is_some());
        let result = check_cash_flow(&series, assumptions.costs.cash_floor).unwrap();
        assert!(result.satisfied);
    }
}
