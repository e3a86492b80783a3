//! Subscription plan catalog, efficiency discount tiers, and scenario
//! adjustments
//!
//! Plans charge for access (runtime hours), never for electricity. Each tier
//! grants a quota of included hours, seasonal for the standard catalog, with
//! metered overage beyond the quota capped to bound bill volatility.

use serde::{Deserialize, Serialize};

use super::seasonality::Season;
use super::segments::Segment;
use crate::error::{ModelError, ModelResult};

/// Plan identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanId {
    Lite,
    Standard,
    Premium,
}

impl PlanId {
    pub const ALL: [PlanId; 3] = [PlanId::Lite, PlanId::Standard, PlanId::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Lite => "lite",
            PlanId::Standard => "standard",
            PlanId::Premium => "premium",
        }
    }
}

/// Included hour quota, either flat per month or allocated by season.
///
/// Seasonal allocation matches hours to expected usage so the quota acts as
/// a budget nudge instead of a single annual average nobody relates to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IncludedHours {
    Flat(f64),
    Seasonal {
        winter: f64,
        shoulder: f64,
        summer: f64,
    },
}

impl IncludedHours {
    /// Hours included for a given season.
    pub fn for_season(&self, season: Season) -> f64 {
        match self {
            IncludedHours::Flat(hours) => *hours,
            IncludedHours::Seasonal {
                winter,
                shoulder,
                summer,
            } => match season {
                Season::Winter => *winter,
                Season::Shoulder => *shoulder,
                Season::Summer => *summer,
            },
        }
    }

    /// Annual average monthly hours (4 months of each season).
    pub fn annual_average(&self) -> f64 {
        match self {
            IncludedHours::Flat(hours) => *hours,
            IncludedHours::Seasonal {
                winter,
                shoulder,
                summer,
            } => (winter + shoulder + summer) / 3.0,
        }
    }
}

/// A subscription tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,

    /// Monthly base fee, pre-tax
    pub monthly_fee: f64,

    /// Included runtime hour quota
    pub included: IncludedHours,

    /// Charge per hour beyond the quota
    pub overage_rate_per_hour: f64,

    /// Maximum overage charge per month. Zero together with a zero rate
    /// means the plan is effectively unlimited.
    pub overage_cap: f64,

    /// Segment this tier is designed for (label only, never enforced)
    pub target_segment: Segment,
}

/// The full plan catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    /// Standard three-tier catalog.
    pub fn default_pricing() -> Self {
        Self {
            plans: vec![
                Plan {
                    id: PlanId::Lite,
                    monthly_fee: 449.0,
                    included: IncludedHours::Seasonal {
                        winter: 35.0,
                        shoulder: 90.0,
                        summer: 140.0,
                    },
                    overage_rate_per_hour: 6.0,
                    overage_cap: 150.0,
                    target_segment: Segment::Light,
                },
                Plan {
                    id: PlanId::Standard,
                    monthly_fee: 599.0,
                    included: IncludedHours::Seasonal {
                        winter: 70.0,
                        shoulder: 180.0,
                        summer: 280.0,
                    },
                    overage_rate_per_hour: 5.0,
                    overage_cap: 200.0,
                    target_segment: Segment::Moderate,
                },
                Plan {
                    id: PlanId::Premium,
                    monthly_fee: 799.0,
                    included: IncludedHours::Seasonal {
                        winter: 120.0,
                        shoulder: 320.0,
                        summer: 480.0,
                    },
                    overage_rate_per_hour: 0.0, // unlimited
                    overage_cap: 0.0,
                    target_segment: Segment::Heavy,
                },
            ],
        }
    }

    pub fn get(&self, id: PlanId) -> &Plan {
        self.plans
            .iter()
            .find(|p| p.id == id)
            .unwrap_or_else(|| panic!("plan catalog is missing {}", id.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter()
    }

    /// The tier a segment is intended to self-select into.
    pub fn intended_plan(&self, segment: Segment) -> PlanId {
        match segment {
            Segment::Light => PlanId::Lite,
            Segment::Moderate => PlanId::Standard,
            Segment::Heavy => PlanId::Premium,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        for id in PlanId::ALL {
            if !self.plans.iter().any(|p| p.id == id) {
                return Err(ModelError::config(format!(
                    "plan catalog is missing the {} tier",
                    id.as_str()
                )));
            }
        }
        for plan in &self.plans {
            if plan.monthly_fee <= 0.0 {
                return Err(ModelError::config(format!(
                    "plan {} monthly fee must be positive",
                    plan.id.as_str()
                )));
            }
            if plan.overage_rate_per_hour < 0.0 || plan.overage_cap < 0.0 {
                return Err(ModelError::config(format!(
                    "plan {} overage terms must be non-negative",
                    plan.id.as_str()
                )));
            }
            if plan.included.annual_average() <= 0.0 {
                return Err(ModelError::config(format!(
                    "plan {} must include a positive hour quota",
                    plan.id.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Apply scenario adjustments, returning a new catalog.
    pub fn adjusted(&self, params: &PlanAdjustments) -> Self {
        let plans = self
            .plans
            .iter()
            .map(|plan| {
                let included = match &plan.included {
                    IncludedHours::Flat(h) => IncludedHours::Flat(h * params.included_hours_mult),
                    IncludedHours::Seasonal {
                        winter,
                        shoulder,
                        summer,
                    } => IncludedHours::Seasonal {
                        winter: winter * params.included_hours_mult,
                        shoulder: shoulder * params.included_hours_mult,
                        summer: summer * params.included_hours_mult,
                    },
                };
                Plan {
                    id: plan.id,
                    monthly_fee: plan.monthly_fee * params.fee_mult,
                    included,
                    overage_rate_per_hour: plan.overage_rate_per_hour,
                    overage_cap: plan.overage_cap * params.overage_cap_mult,
                    target_segment: plan.target_segment,
                }
            })
            .collect();
        Self { plans }
    }

    /// Replace a single plan's monthly fee, returning a new catalog. Used by
    /// the fee boundary search.
    pub fn with_fee(&self, id: PlanId, monthly_fee: f64) -> Self {
        let plans = self
            .plans
            .iter()
            .map(|plan| {
                let mut plan = plan.clone();
                if plan.id == id {
                    plan.monthly_fee = monthly_fee;
                }
                plan
            })
            .collect();
        Self { plans }
    }
}

/// Multipliers applied to the catalog for sensitivity scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanAdjustments {
    /// Multiplier on every monthly fee (1.0 = no change)
    #[serde(default = "default_one")]
    pub fee_mult: f64,

    /// Multiplier on every overage cap (1.0 = no change)
    #[serde(default = "default_one")]
    pub overage_cap_mult: f64,

    /// Multiplier on included hour quotas (1.0 = no change)
    #[serde(default = "default_one")]
    pub included_hours_mult: f64,
}

fn default_one() -> f64 {
    1.0
}

impl Default for PlanAdjustments {
    fn default() -> Self {
        Self {
            fee_mult: 1.0,
            overage_cap_mult: 1.0,
            included_hours_mult: 1.0,
        }
    }
}

/// One efficiency discount tier: inclusive lower score bound and the
/// discount applied to the base fee
#[derive(Debug, Clone)]
pub struct EfficiencyTier {
    pub threshold: f64,
    pub discount: f64,
    pub label: &'static str,
}

/// Ordered discount tier table, highest threshold first
#[derive(Debug, Clone)]
pub struct EfficiencyTierTable {
    tiers: Vec<EfficiencyTier>,
}

impl Default for EfficiencyTierTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                EfficiencyTier { threshold: 90.0, discount: 0.20, label: "champion" },
                EfficiencyTier { threshold: 75.0, discount: 0.12, label: "star" },
                EfficiencyTier { threshold: 60.0, discount: 0.05, label: "aware" },
                EfficiencyTier { threshold: 0.0, discount: 0.00, label: "improving" },
            ],
        }
    }
}

impl EfficiencyTierTable {
    /// Discount rate and tier label for a score. Thresholds are inclusive
    /// lower bounds.
    pub fn tier_for(&self, score: f64) -> &EfficiencyTier {
        self.tiers
            .iter()
            .find(|t| score >= t.threshold)
            .unwrap_or_else(|| self.tiers.last().expect("tier table is never empty"))
    }

    pub fn discount_for(&self, score: f64) -> f64 {
        self.tier_for(score).discount
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.label).collect()
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.tiers.is_empty() {
            return Err(ModelError::config("efficiency tier table is empty"));
        }
        let mut prev = f64::MAX;
        for tier in &self.tiers {
            if tier.threshold >= prev {
                return Err(ModelError::config(
                    "efficiency tiers must be ordered by descending threshold",
                ));
            }
            if !(0.0..1.0).contains(&tier.discount) {
                return Err(ModelError::config(format!(
                    "tier {} discount must be in [0, 1)",
                    tier.label
                )));
            }
            prev = tier.threshold;
        }
        if self.tiers.last().map(|t| t.threshold) != Some(0.0) {
            return Err(ModelError::config(
                "the lowest efficiency tier must start at score 0",
            ));
        }
        Ok(())
    }
}
