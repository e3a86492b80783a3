//! Behavior-based efficiency scoring
//!
//! Maps raw telemetry (set temperature, timer adoption, wasteful-behavior
//! events) to a 0-100 score. The score feeds the discount tier table; it is
//! framed to the customer as a reward, never a penalty.

use serde::{Deserialize, Serialize};

use crate::assumptions::ScoringConfig;

/// One month of behavior telemetry for a customer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Average set temperature in Celsius
    pub avg_set_temperature: f64,

    /// Share of runtime under timer or schedule control, 0-100
    pub timer_usage_percent: f64,

    /// Count of wasteful anomaly events (door open while running, etc.)
    pub anomaly_event_count: u32,
}

/// Compute the efficiency score for a telemetry sample.
///
/// Sub-scores:
/// - temperature: step function over the configured breakpoints
/// - schedule: `min(100, timer_percent * multiplier)`
/// - behavior: `max(0, 100 - events * penalty)`; zero events scores a
///   full 100, there is no penalty to "not apply"
///
/// The weighted sum is clamped to [0, 100] to guard against weight
/// misconfiguration.
pub fn efficiency_score(sample: &TelemetrySample, config: &ScoringConfig) -> f64 {
    let temp_score = temperature_sub_score(sample.avg_set_temperature, config);
    let timer_score = (sample.timer_usage_percent * config.timer_multiplier).min(100.0);
    let behavior_score =
        (100.0 - sample.anomaly_event_count as f64 * config.anomaly_penalty_per_event).max(0.0);

    let score = temp_score * config.temperature_weight
        + timer_score * config.schedule_weight
        + behavior_score * config.behavior_weight;

    score.clamp(0.0, 100.0)
}

fn temperature_sub_score(avg_set_temperature: f64, config: &ScoringConfig) -> f64 {
    for &(min_temp, score) in &config.temperature_breakpoints {
        if avg_set_temperature >= min_temp {
            return score;
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(temp: f64, timer: f64, anomalies: u32) -> TelemetrySample {
        TelemetrySample {
            avg_set_temperature: temp,
            timer_usage_percent: timer,
            anomaly_event_count: anomalies,
        }
    }

    #[test]
    fn test_anchor_value() {
        // 24C, no timer, no anomalies: 100*0.60 + 0*0.25 + 100*0.15 = 75.0
        let config = ScoringConfig::default();
        let score = efficiency_score(&sample(24.0, 0.0, 0), &config);
        assert_relative_eq!(score, 75.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_anomalies_scores_full_behavior() {
        // The behavior sub-score with zero events is 100, not 0.
        let config = ScoringConfig::default();
        let clean = efficiency_score(&sample(16.0, 0.0, 0), &config);
        assert_relative_eq!(clean, 100.0 * 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_temperature_breakpoints() {
        let config = ScoringConfig::default();
        assert_eq!(temperature_sub_score(26.0, &config), 100.0);
        assert_eq!(temperature_sub_score(24.0, &config), 100.0);
        assert_eq!(temperature_sub_score(23.0, &config), 80.0);
        assert_eq!(temperature_sub_score(20.0, &config), 50.0);
        assert_eq!(temperature_sub_score(18.5, &config), 25.0);
        assert_eq!(temperature_sub_score(16.0, &config), 0.0);
    }

    #[test]
    fn test_timer_multiplier_caps_at_100() {
        let config = ScoringConfig::default();
        // 90% * 1.2 = 108, capped at 100
        let score = efficiency_score(&sample(24.0, 90.0, 0), &config);
        assert_relative_eq!(score, 100.0 * 0.60 + 100.0 * 0.25 + 100.0 * 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_anomaly_floor_at_zero() {
        let config = ScoringConfig::default();
        // 50 events * 3 = 150 penalty, floored at behavior score 0
        let score = efficiency_score(&sample(24.0, 0.0, 50), &config);
        assert_relative_eq!(score, 100.0 * 0.60, epsilon = 1e-12);
    }

    #[test]
    fn test_worked_example() {
        // 24C (100), timer 80 (96), 2 anomalies (94):
        // 100*0.6 + 96*0.25 + 94*0.15 = 60 + 24 + 14.1 = 98.1
        let config = ScoringConfig::default();
        let score = efficiency_score(&sample(24.0, 80.0, 2), &config);
        assert_relative_eq!(score, 98.1, epsilon = 1e-9);
    }

    #[test]
    fn test_output_clamped() {
        let mut config = ScoringConfig::default();
        // Deliberately broken weights still produce a bounded score
        config.temperature_weight = 2.0;
        let score = efficiency_score(&sample(30.0, 100.0, 0), &config);
        assert_eq!(score, 100.0);
    }
}
