//! Immutable configuration for the pricing model
//!
//! Every component takes the pieces it needs from this aggregate explicitly.
//! Nothing reads module-level state, so any test can run against a synthetic
//! configuration without touching the defaults.

mod market;
mod plans;
mod scoring;
mod seasonality;
mod segments;

pub use market::{CostAssumptions, MarketAssumptions, TerminalValueTable};
pub use plans::{
    EfficiencyTier, EfficiencyTierTable, IncludedHours, Plan, PlanAdjustments, PlanCatalog, PlanId,
};
pub use scoring::ScoringConfig;
pub use seasonality::{Region, RegionMix, Season, SeasonCalendar, SeasonalityProfiles};
pub use segments::{ChurnCategory, ChurnHazards, Segment, SegmentAssumptions, SegmentTable};

use crate::error::ModelResult;
use crate::finance::DiscountRates;

/// The full assumption set for a pricing run
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub plans: PlanCatalog,
    pub tiers: EfficiencyTierTable,
    pub scoring: ScoringConfig,
    pub segments: SegmentTable,
    pub regions: RegionMix,
    pub seasonality: SeasonalityProfiles,
    pub calendar: SeasonCalendar,
    pub market: MarketAssumptions,
    pub costs: CostAssumptions,
    pub rates: DiscountRates,
}

impl Assumptions {
    /// Standard pricing assumptions.
    pub fn default_pricing() -> Self {
        Self {
            plans: PlanCatalog::default_pricing(),
            tiers: EfficiencyTierTable::default(),
            scoring: ScoringConfig::default(),
            segments: SegmentTable::default_pricing(),
            regions: RegionMix::default(),
            seasonality: SeasonalityProfiles::default(),
            calendar: SeasonCalendar::default(),
            market: MarketAssumptions::default(),
            costs: CostAssumptions::default(),
            rates: DiscountRates::default(),
        }
    }

    /// Fail-fast validation of the whole configuration. Run once at the
    /// boundary before generation, simulation, or constraint checking.
    pub fn validate(&self) -> ModelResult<()> {
        self.plans.validate()?;
        self.tiers.validate()?;
        self.scoring.validate()?;
        self.segments.validate()?;
        self.regions.validate()?;
        self.market.validate()?;
        self.costs.validate()?;
        Ok(())
    }

    /// Customer annual discount rate for a segment, from the rate profile.
    pub fn customer_rate(&self, segment: Segment) -> f64 {
        self.rates.customer_annual(segment)
    }
}
