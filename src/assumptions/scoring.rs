//! Behavior scoring configuration
//!
//! The efficiency score rewards HOW the appliance is used, not how much. A
//! family running the unit ten hours a day at 24 degrees with timers set is
//! scored well above one blasting 16 degrees for two hours. Usage volume is
//! the billing engine's concern, never the score's.

use crate::error::{ModelError, ModelResult};

/// Weights and sub-score parameters for the efficiency score
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Temperature discipline weight
    pub temperature_weight: f64,

    /// Timer/schedule discipline weight
    pub schedule_weight: f64,

    /// Anomaly avoidance weight
    pub behavior_weight: f64,

    /// Temperature breakpoints as (minimum set temperature, sub-score),
    /// ordered by descending temperature. Higher set temperature means
    /// less compressor load and a higher score.
    pub temperature_breakpoints: Vec<(f64, f64)>,

    /// Multiplier on timer usage percent before the 100 cap. Above 1.0 it
    /// rewards partial timer adoption generously.
    pub timer_multiplier: f64,

    /// Score penalty per wasteful anomaly event (door open while running,
    /// short-cycling, etc.)
    pub anomaly_penalty_per_event: f64,

    /// Trial baseline: cap as a multiple of the segment default
    pub baseline_cap_ratio: f64,

    /// Trial baseline: manual-review flag as a multiple of the segment
    /// default
    pub baseline_anomaly_ratio: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            temperature_weight: 0.60,
            schedule_weight: 0.25,
            behavior_weight: 0.15,
            temperature_breakpoints: vec![
                (24.0, 100.0),
                (22.0, 80.0),
                (20.0, 50.0),
                (18.0, 25.0),
            ],
            timer_multiplier: 1.2,
            anomaly_penalty_per_event: 3.0,
            baseline_cap_ratio: 1.20,
            baseline_anomaly_ratio: 1.50,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> ModelResult<()> {
        let weight_sum = self.temperature_weight + self.schedule_weight + self.behavior_weight;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(ModelError::config(format!(
                "scoring weights must sum to 1.0, got {weight_sum:.6}"
            )));
        }
        let mut prev = f64::MAX;
        for &(temp, score) in &self.temperature_breakpoints {
            if temp >= prev {
                return Err(ModelError::config(
                    "temperature breakpoints must be ordered by descending temperature",
                ));
            }
            if !(0.0..=100.0).contains(&score) {
                return Err(ModelError::config(
                    "temperature sub-scores must be within [0, 100]",
                ));
            }
            prev = temp;
        }
        if self.timer_multiplier <= 0.0 || self.anomaly_penalty_per_event < 0.0 {
            return Err(ModelError::config("scoring parameters must be positive"));
        }
        if self.baseline_cap_ratio < 1.0 || self.baseline_anomaly_ratio < self.baseline_cap_ratio {
            return Err(ModelError::config(
                "baseline ratios must satisfy 1.0 <= cap <= anomaly flag",
            ));
        }
        Ok(())
    }
}
