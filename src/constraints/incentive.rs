//! Incentive compatibility and moral hazard
//!
//! A tiered catalog only works if each segment's cheapest rational choice
//! is the tier designed for it. The incentive check verifies that per
//! (segment, plan) utility; the moral hazard check asks the sharper
//! question of whether a cheaper plan plus its capped overage undercuts the
//! intended plan outright. Both report the specific defections, because a
//! pricing designer needs to know WHICH plan a segment would walk to, not
//! just that one exists.

use serde::Serialize;

use crate::assumptions::{Assumptions, Plan, PlanId, Segment};
use crate::error::ModelResult;

use super::{expected_monthly_cost, ConstraintResult};

/// A segment that would rationally pick a plan other than its intended one
#[derive(Debug, Clone, Serialize)]
pub struct PlanDefection {
    pub segment: Segment,
    pub intended: PlanId,
    pub preferred: PlanId,

    /// Utility advantage of the preferred plan
    pub utility_gap: f64,

    /// Monthly amount the segment saves by defecting
    pub monthly_saving: f64,
}

/// Constraint verdict plus the defections behind it
#[derive(Debug, Clone, Serialize)]
pub struct IncentiveOutcome {
    pub result: ConstraintResult,
    pub defections: Vec<PlanDefection>,
}

/// Utility of a plan for a segment: perceived service value minus the
/// expected tax-inclusive monthly cost.
pub fn plan_utility(
    segment: Segment,
    plan: &Plan,
    assumptions: &Assumptions,
    efficiency_score: f64,
) -> f64 {
    let sa = assumptions.segments.get(segment);
    let service_value = assumptions.market.service_value_base * sa.service_value_multiplier;
    service_value - expected_monthly_cost(segment, plan, assumptions, efficiency_score)
}

/// Verify every segment's utility is maximized at its intended plan.
///
/// Slack is the smallest margin by which an intended plan beats the best
/// alternative across segments; negative means at least one segment
/// defects.
pub fn check_incentive_compatibility(
    assumptions: &Assumptions,
    efficiency_score: f64,
) -> ModelResult<IncentiveOutcome> {
    let mut defections = Vec::new();
    let mut worst_margin = f64::MAX;
    let mut result = ConstraintResult::new("incentive_compatibility", 0.0);

    for &segment in &Segment::ALL {
        let intended_id = assumptions.plans.intended_plan(segment);
        let intended_utility = plan_utility(
            segment,
            assumptions.plans.get(intended_id),
            assumptions,
            efficiency_score,
        );

        let mut best_alternative: Option<(PlanId, f64)> = None;
        for plan in assumptions.plans.iter() {
            if plan.id == intended_id {
                continue;
            }
            let utility = plan_utility(segment, plan, assumptions, efficiency_score);
            result.supporting.push((
                format!("utility_{}_{}", segment.as_str(), plan.id.as_str()),
                utility,
            ));
            if best_alternative.map(|(_, u)| utility > u).unwrap_or(true) {
                best_alternative = Some((plan.id, utility));
            }
        }
        result.supporting.push((
            format!("utility_{}_{}", segment.as_str(), intended_id.as_str()),
            intended_utility,
        ));

        let (best_id, best_utility) =
            best_alternative.expect("catalog always carries three tiers");
        let margin = intended_utility - best_utility;
        worst_margin = worst_margin.min(margin);

        if margin < 0.0 {
            let intended_cost = expected_monthly_cost(
                segment,
                assumptions.plans.get(intended_id),
                assumptions,
                efficiency_score,
            );
            let preferred_cost = expected_monthly_cost(
                segment,
                assumptions.plans.get(best_id),
                assumptions,
                efficiency_score,
            );
            defections.push(PlanDefection {
                segment,
                intended: intended_id,
                preferred: best_id,
                utility_gap: -margin,
                monthly_saving: intended_cost - preferred_cost,
            });
        }
    }

    result.slack = worst_margin;
    result.satisfied = worst_margin >= 0.0;
    Ok(IncentiveOutcome { result, defections })
}

/// Verify gaming a cheaper plan and absorbing its capped overage never
/// beats the intended plan by more than the tolerance.
pub fn check_moral_hazard(
    assumptions: &Assumptions,
    efficiency_score: f64,
    tolerance: f64,
) -> ModelResult<IncentiveOutcome> {
    let mut defections = Vec::new();
    let mut worst_saving: f64 = 0.0;
    let mut result = ConstraintResult::new("moral_hazard", 0.0).with("tolerance", tolerance);

    for &segment in &Segment::ALL {
        let intended_id = assumptions.plans.intended_plan(segment);
        let intended_fee = assumptions.plans.get(intended_id).monthly_fee;
        let intended_cost = expected_monthly_cost(
            segment,
            assumptions.plans.get(intended_id),
            assumptions,
            efficiency_score,
        );

        for plan in assumptions.plans.iter() {
            if plan.id == intended_id || plan.monthly_fee >= intended_fee {
                continue;
            }
            // Cost of downgrading: cheaper base fee, capped overage absorbed
            let gamed_cost = expected_monthly_cost(segment, plan, assumptions, efficiency_score);
            let saving = intended_cost - gamed_cost;
            result.supporting.push((
                format!("gaming_saving_{}_{}", segment.as_str(), plan.id.as_str()),
                saving,
            ));
            if saving > worst_saving {
                worst_saving = saving;
            }
            if saving > tolerance {
                defections.push(PlanDefection {
                    segment,
                    intended: intended_id,
                    preferred: plan.id,
                    utility_gap: saving - tolerance,
                    monthly_saving: saving,
                });
            }
        }
    }

    result.slack = tolerance - worst_saving;
    result.satisfied = defections.is_empty();
    Ok(IncentiveOutcome { result, defections })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rigged_catalog_reports_heavy_defection() {
        let mut assumptions = Assumptions::default_pricing();
        // Price the top tier out of reach: heavy users then do better on
        // the standard plan's capped overage.
        assumptions.plans = assumptions.plans.with_fee(PlanId::Premium, 1_400.0);

        let outcome = check_incentive_compatibility(&assumptions, 75.0).unwrap();
        assert!(!outcome.result.satisfied);
        let defection = outcome
            .defections
            .iter()
            .find(|d| d.segment == Segment::Heavy)
            .expect("heavy segment must defect from a 1400 premium fee");
        assert_eq!(defection.intended, PlanId::Premium);
        assert!(defection.monthly_saving > 0.0);
        assert!(defection.utility_gap > 0.0);
    }

    #[test]
    fn test_defection_pairs_name_the_preferred_plan() {
        let mut assumptions = Assumptions::default_pricing();
        assumptions.plans = assumptions.plans.with_fee(PlanId::Premium, 1_400.0);
        let outcome = check_incentive_compatibility(&assumptions, 75.0).unwrap();
        for defection in &outcome.defections {
            assert_ne!(defection.preferred, defection.intended);
        }
    }

    #[test]
    fn test_moral_hazard_shares_cost_model_with_ic() {
        let assumptions = Assumptions::default_pricing();
        let score = 75.0;
        // The gaming saving reported for heavy-on-standard must equal the
        // cost difference the IC utilities imply.
        let premium = assumptions.plans.get(PlanId::Premium);
        let standard = assumptions.plans.get(PlanId::Standard);
        let direct = expected_monthly_cost(Segment::Heavy, premium, &assumptions, score)
            - expected_monthly_cost(Segment::Heavy, standard, &assumptions, score);

        let outcome = check_moral_hazard(&assumptions, score, 25.0).unwrap();
        let reported = outcome
            .result
            .supporting
            .iter()
            .find(|(n, _)| n == "gaming_saving_heavy_standard")
            .unwrap()
            .1;
        assert_relative_eq!(reported, direct, epsilon = 1e-9);
    }

    #[test]
    fn test_moral_hazard_tolerance_boundary() {
        let assumptions = Assumptions::default_pricing();
        // With an enormous tolerance nothing can fail
        let lenient = check_moral_hazard(&assumptions, 75.0, 1.0e9).unwrap();
        assert!(lenient.result.satisfied);
        assert!(lenient.defections.is_empty());

        // With zero tolerance, any positive gaming saving fails
        let strict = check_moral_hazard(&assumptions, 75.0, 0.0).unwrap();
        assert_eq!(strict.result.satisfied, strict.defections.is_empty());
    }

    #[test]
    fn test_gaming_absorbs_capped_overage() {
        let assumptions = Assumptions::default_pricing();
        // Heavy usage on the standard plan pays the full overage cap
        let standard = assumptions.plans.get(PlanId::Standard);
        let cost = expected_monthly_cost(Segment::Heavy, standard, &assumptions, 75.0);
        let expected =
            (599.0 + 200.0 - 599.0 * 0.12) * 1.18;
        assert_relative_eq!(cost, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_utilities_reported_for_all_pairs() {
        let assumptions = Assumptions::default_pricing();
        let outcome = check_incentive_compatibility(&assumptions, 75.0).unwrap();
        // 3 segments x 3 plans
        let utility_entries = outcome
            .result
            .supporting
            .iter()
            .filter(|(n, _)| n.starts_with("utility_"))
            .count();
        assert_eq!(utility_entries, 9);
    }
}
