//! Synthetic customer population generator

use rand::Rng;
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use crate::assumptions::{Assumptions, ChurnCategory, PlanId, Region, Segment};
use crate::error::{ModelError, ModelResult};

use super::rng::derived_stream;

/// One synthetic subscriber. Attributes are drawn once at creation and
/// never mutated; the simulator only reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub customer_id: u32,
    pub segment: Segment,
    pub region: Region,
    pub assigned_plan: PlanId,

    /// Multiplicative deviation from the segment baseline, fixed for life
    pub usage_factor: f64,

    /// Base behavior score; months wiggle around it
    pub efficiency_base: f64,

    pub churn_category: ChurnCategory,

    /// Monthly churn hazard probability
    pub churn_hazard: f64,

    /// Calendar month of signup (0 = Jan), start of the seasonality cycle
    pub signup_month: u32,

    /// Customer picked a plan other than the intended one
    pub mismatched_plan: bool,
}

/// Generate `n` customers from the configured segment and region mixes.
/// Identical seeds produce identical populations.
pub fn generate_customers(
    n: u32,
    assumptions: &Assumptions,
    plan_mismatch_rate: f64,
    seed: u64,
) -> ModelResult<Vec<Customer>> {
    if n == 0 {
        return Err(ModelError::config("population size must be at least 1"));
    }
    if !(0.0..=1.0).contains(&plan_mismatch_rate) {
        return Err(ModelError::config("plan mismatch rate must be in [0, 1]"));
    }
    assumptions.validate()?;

    let mut rng = derived_stream(seed, 0);
    let mut customers = Vec::with_capacity(n as usize);

    let segment_weights: Vec<(Segment, f64)> = Segment::ALL
        .iter()
        .map(|&s| (s, assumptions.segments.get(s).proportion))
        .collect();
    let region_weights: Vec<(Region, f64)> = Region::ALL
        .iter()
        .map(|&r| (r, assumptions.regions.get(r)))
        .collect();
    let churn_categories = [ChurnCategory::Low, ChurnCategory::Medium, ChurnCategory::High];

    for customer_id in 1..=n {
        let segment = pick_weighted(&mut rng, &segment_weights);
        let region = pick_weighted(&mut rng, &region_weights);
        let sa = assumptions.segments.get(segment);

        let intended = assumptions.plans.intended_plan(segment);
        let mismatched = rng.gen::<f64>() < plan_mismatch_rate;
        let assigned_plan = if mismatched {
            let others: Vec<PlanId> = PlanId::ALL
                .iter()
                .copied()
                .filter(|&p| p != intended)
                .collect();
            others[rng.gen_range(0..others.len())]
        } else {
            intended
        };

        let (uf_lo, uf_hi) = sa.usage_factor_range;
        let usage_factor = rng.gen_range(uf_lo..uf_hi);
        let (eff_lo, eff_hi) = sa.efficiency_base_range;
        let efficiency_base = rng.gen_range(eff_lo..eff_hi);

        let churn_weights: Vec<(ChurnCategory, f64)> = churn_categories
            .iter()
            .copied()
            .zip(sa.churn_weights.iter().copied())
            .collect();
        let churn_category = pick_weighted(&mut rng, &churn_weights);
        let churn_hazard = assumptions.segments.churn_hazards.for_category(churn_category);

        customers.push(Customer {
            customer_id,
            segment,
            region,
            assigned_plan,
            usage_factor,
            efficiency_base,
            churn_category,
            churn_hazard,
            signup_month: rng.gen_range(0..12u32),
            mismatched_plan: mismatched,
        });
    }

    Ok(customers)
}

fn pick_weighted<T: Copy>(rng: &mut Pcg64Mcg, weighted: &[(T, f64)]) -> T {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for &(item, weight) in weighted {
        cumulative += weight;
        if roll < cumulative {
            return item;
        }
    }
    // Weights sum to 1.0 by validation; rounding can leave a sliver
    weighted.last().expect("weights are never empty").0
}
