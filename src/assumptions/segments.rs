//! Customer segment definitions and per-segment behavioral assumptions

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Usage segment a customer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Light,
    Moderate,
    Heavy,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Light, Segment::Moderate, Segment::Heavy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Light => "light",
            Segment::Moderate => "moderate",
            Segment::Heavy => "heavy",
        }
    }
}

/// Churn risk category assigned at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnCategory {
    Low,
    Medium,
    High,
}

/// Monthly churn hazard by risk category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnHazards {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for ChurnHazards {
    fn default() -> Self {
        Self {
            low: 0.004,    // ~21% cumulative over 60 months
            medium: 0.010, // ~45%
            high: 0.025,   // ~78%
        }
    }
}

impl ChurnHazards {
    pub fn for_category(&self, category: ChurnCategory) -> f64 {
        match category {
            ChurnCategory::Low => self.low,
            ChurnCategory::Medium => self.medium,
            ChurnCategory::High => self.high,
        }
    }
}

/// Assumptions for a single customer segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAssumptions {
    /// Share of the customer population
    pub proportion: f64,

    /// Baseline monthly runtime hours before seasonality
    pub base_hours: f64,

    /// Per-customer multiplicative deviation from the baseline, drawn once
    /// at signup from this uniform range
    pub usage_factor_range: (f64, f64),

    /// Per-customer base efficiency score range (behavior quality, not
    /// usage volume)
    pub efficiency_base_range: (f64, f64),

    /// Expected monthly hours used by the closed-form constraint checks
    pub expected_hours: f64,

    /// Churn category weights at signup: low / medium / high
    pub churn_weights: [f64; 3],

    /// Minimum savings vs outright purchase required for participation
    pub participation_threshold: f64,

    /// Perceived service value multiplier relative to the base value.
    /// Heavier users rely on the service more.
    pub service_value_multiplier: f64,
}

/// Per-segment assumption table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentTable {
    pub light: SegmentAssumptions,
    pub moderate: SegmentAssumptions,
    pub heavy: SegmentAssumptions,
    pub churn_hazards: ChurnHazards,
}

impl SegmentTable {
    /// Standard pricing assumptions
    pub fn default_pricing() -> Self {
        Self {
            light: SegmentAssumptions {
                proportion: 0.30,
                base_hours: 100.0,
                usage_factor_range: (0.7, 1.1),
                efficiency_base_range: (55.0, 95.0),
                expected_hours: 120.0,
                churn_weights: [0.5, 0.4, 0.1],
                participation_threshold: 0.12,
                service_value_multiplier: 1.0,
            },
            moderate: SegmentAssumptions {
                proportion: 0.50,
                base_hours: 200.0,
                usage_factor_range: (0.85, 1.15),
                efficiency_base_range: (50.0, 90.0),
                expected_hours: 200.0,
                churn_weights: [0.6, 0.35, 0.05],
                participation_threshold: 0.10,
                service_value_multiplier: 1.1,
            },
            heavy: SegmentAssumptions {
                proportion: 0.20,
                base_hours: 350.0,
                usage_factor_range: (0.9, 1.3),
                efficiency_base_range: (40.0, 85.0),
                expected_hours: 320.0,
                churn_weights: [0.7, 0.25, 0.05],
                participation_threshold: 0.08,
                service_value_multiplier: 1.2,
            },
            churn_hazards: ChurnHazards::default(),
        }
    }

    pub fn get(&self, segment: Segment) -> &SegmentAssumptions {
        match segment {
            Segment::Light => &self.light,
            Segment::Moderate => &self.moderate,
            Segment::Heavy => &self.heavy,
        }
    }

    /// Validate the segment mix and per-segment parameters.
    pub fn validate(&self) -> ModelResult<()> {
        let mix_sum: f64 = Segment::ALL.iter().map(|&s| self.get(s).proportion).sum();
        if (mix_sum - 1.0).abs() > 1e-6 {
            return Err(ModelError::config(format!(
                "segment proportions must sum to 1.0, got {mix_sum:.6}"
            )));
        }
        for &segment in &Segment::ALL {
            let sa = self.get(segment);
            if sa.base_hours <= 0.0 {
                return Err(ModelError::config(format!(
                    "segment {} base_hours must be positive",
                    segment.as_str()
                )));
            }
            if sa.usage_factor_range.0 <= 0.0 || sa.usage_factor_range.1 < sa.usage_factor_range.0 {
                return Err(ModelError::config(format!(
                    "segment {} usage_factor_range is malformed",
                    segment.as_str()
                )));
            }
            let weight_sum: f64 = sa.churn_weights.iter().sum();
            if (weight_sum - 1.0).abs() > 1e-6 {
                return Err(ModelError::config(format!(
                    "segment {} churn weights must sum to 1.0, got {weight_sum:.6}",
                    segment.as_str()
                )));
            }
            if !(0.0..1.0).contains(&sa.participation_threshold) {
                return Err(ModelError::config(format!(
                    "segment {} participation threshold must be in [0, 1)",
                    segment.as_str()
                )));
            }
        }
        Ok(())
    }
}
