//! Participation constraint
//!
//! The customer's rational-choice test: the subscription must undercut
//! buying the appliance outright by at least the segment's savings
//! threshold, with both sides valued at the CUSTOMER's discount rate. The
//! firm's rate has no business here; a cash-constrained household does not
//! discount at the firm's WACC, and valuing their payments as if they did
//! overstates the subscription's appeal by a wide margin.

use crate::alternatives::{purchase_cost, subscription_cost, validate_tax_consistency};
use crate::assumptions::{Assumptions, Segment};
use crate::error::ModelResult;
use crate::scenario::ScenarioParams;

use super::{expected_monthly_pre_tax, ConstraintResult};

/// Check participation for one segment: subscription NPV must come in below
/// purchase NPV times (1 - threshold).
pub fn check_participation(
    assumptions: &Assumptions,
    scenario: &ScenarioParams,
    segment: Segment,
) -> ModelResult<ConstraintResult> {
    scenario.validate()?;

    let rate = assumptions.customer_rate(segment);
    let horizon = scenario.comparison_horizon_months;
    let threshold = assumptions.segments.get(segment).participation_threshold;

    let purchase = purchase_cost(&assumptions.market, horizon, rate)?;

    let plan_id = assumptions.plans.intended_plan(segment);
    let plan = assumptions.plans.get(plan_id);
    let monthly_pre_tax =
        expected_monthly_pre_tax(segment, plan, assumptions, scenario.expected_efficiency_score);
    let subscription = subscription_cost(
        scenario.upfront_price_pre_tax(&assumptions.market),
        monthly_pre_tax,
        &assumptions.market,
        horizon,
        rate,
    )?;

    // Both breakdowns must carry tax the same way before the comparison
    // means anything.
    validate_tax_consistency(&[&purchase, &subscription])?;

    let purchase_npv = purchase.total_npv();
    let subscription_npv = subscription.total_npv();
    let target_npv = purchase_npv * (1.0 - threshold);
    let savings_percent = if purchase_npv > 0.0 {
        (purchase_npv - subscription_npv) / purchase_npv * 100.0
    } else {
        0.0
    };

    Ok(
        ConstraintResult::new(format!("participation_{}", segment.as_str()), target_npv - subscription_npv)
            .with("subscription_npv", subscription_npv)
            .with("purchase_npv", purchase_npv)
            .with("target_npv", target_npv)
            .with("threshold_percent", threshold * 100.0)
            .with("savings_percent", savings_percent),
    )
}
