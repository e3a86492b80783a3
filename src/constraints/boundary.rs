//! Boundary search over pricing parameters
//!
//! Bisection over a monotone satisfied/unsatisfied predicate. The outcome
//! is tri-state so a caller can tell "the search converged inside the
//! range" apart from "the constraint only flips outside the configured
//! bounds", which earlier tooling conflated into a bare pass/fail.

use log::debug;

use crate::assumptions::{Assumptions, Segment};
use crate::error::{ModelError, ModelResult};
use crate::scenario::ScenarioParams;

use super::participation::check_participation;

/// Result of a boundary search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryOutcome {
    /// The boundary lies inside the range
    Converged(f64),

    /// Satisfied through the lower bound; the true boundary is below it
    ClampedLow(f64),

    /// Not satisfiable anywhere in the range, including the upper bound
    ClampedHigh(f64),
}

impl BoundaryOutcome {
    /// The boundary value if the search converged.
    pub fn converged_value(&self) -> Option<f64> {
        match self {
            BoundaryOutcome::Converged(v) => Some(*v),
            _ => None,
        }
    }
}

/// Search range and stopping criteria
#[derive(Debug, Clone, Copy)]
pub struct SearchBounds {
    pub lo: f64,
    pub hi: f64,

    /// Stop once the bracket is narrower than this
    pub tolerance: f64,

    pub max_iterations: u32,
}

impl SearchBounds {
    pub fn new(lo: f64, hi: f64, tolerance: f64) -> Self {
        Self {
            lo,
            hi,
            tolerance,
            max_iterations: 60,
        }
    }

    fn validate(&self) -> ModelResult<()> {
        if !(self.lo < self.hi) || self.tolerance <= 0.0 {
            return Err(ModelError::config(format!(
                "search bounds [{}, {}] with tolerance {} are malformed",
                self.lo, self.hi, self.tolerance
            )));
        }
        Ok(())
    }
}

/// Largest monthly fee on a segment's intended plan that still satisfies
/// participation for that segment. The predicate is decreasing in the fee.
pub fn find_max_standard_fee(
    assumptions: &Assumptions,
    scenario: &ScenarioParams,
    segment: Segment,
    bounds: SearchBounds,
) -> ModelResult<BoundaryOutcome> {
    bounds.validate()?;
    let plan_id = assumptions.plans.intended_plan(segment);

    let satisfied_at = |fee: f64| -> ModelResult<bool> {
        let mut trial = assumptions.clone();
        trial.plans = trial.plans.with_fee(plan_id, fee);
        Ok(check_participation(&trial, scenario, segment)?.satisfied)
    };

    if !satisfied_at(bounds.lo)? {
        return Ok(BoundaryOutcome::ClampedHigh(bounds.lo));
    }
    if satisfied_at(bounds.hi)? {
        return Ok(BoundaryOutcome::ClampedLow(bounds.hi));
    }

    // Invariant: lo satisfied, hi not
    let (mut lo, mut hi) = (bounds.lo, bounds.hi);
    for iteration in 0..bounds.max_iterations {
        if hi - lo < bounds.tolerance {
            debug!("fee boundary converged after {iteration} iterations");
            break;
        }
        let mid = (lo + hi) / 2.0;
        if satisfied_at(mid)? {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(BoundaryOutcome::Converged(lo))
}

/// Smallest subsidy percent that satisfies participation for a segment.
/// The predicate is increasing in the subsidy.
pub fn find_min_subsidy(
    assumptions: &Assumptions,
    scenario: &ScenarioParams,
    segment: Segment,
    bounds: SearchBounds,
) -> ModelResult<BoundaryOutcome> {
    bounds.validate()?;

    let satisfied_at = |subsidy: f64| -> ModelResult<bool> {
        let trial = ScenarioParams {
            subsidy_percent: subsidy,
            ..scenario.clone()
        };
        Ok(check_participation(assumptions, &trial, segment)?.satisfied)
    };

    if satisfied_at(bounds.lo)? {
        return Ok(BoundaryOutcome::ClampedLow(bounds.lo));
    }
    if !satisfied_at(bounds.hi)? {
        return Ok(BoundaryOutcome::ClampedHigh(bounds.hi));
    }

    // Invariant: lo not satisfied, hi satisfied
    let (mut lo, mut hi) = (bounds.lo, bounds.hi);
    for iteration in 0..bounds.max_iterations {
        if hi - lo < bounds.tolerance {
            debug!("subsidy boundary converged after {iteration} iterations");
            break;
        }
        let mid = (lo + hi) / 2.0;
        if satisfied_at(mid)? {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(BoundaryOutcome::Converged(hi))
}
