//! Trial-period usage baseline, hardened against gaming
//!
//! The baseline anchors rewards and comparisons, so a customer who inflates
//! early usage would otherwise bank an inflated reference forever. Month 1
//! is excluded as settling noise, the estimate is the median of months 2 and
//! 3, and a hard ceiling of 1.2x the segment default caps whatever remains.
//! A mean over all three trial months would be gameable by one inflated
//! month; this shape is a business rule, not a style choice.

use serde::{Deserialize, Serialize};

use crate::assumptions::ScoringConfig;
use crate::error::{ModelError, ModelResult};

/// Result of a baseline estimation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaselineEstimate {
    /// Median of the two post-settling trial months
    pub raw: f64,

    /// The baseline to actually use: raw, capped at the segment ceiling
    pub capped: f64,

    /// Whether the ceiling was applied
    pub was_capped: bool,

    /// Raw estimate exceeded the review threshold. Routes the account to
    /// manual review; computation proceeds with the capped value.
    pub anomaly_flag: bool,
}

/// Estimate a customer's usage baseline from trial months 2 and 3.
pub fn estimate_baseline(
    month2_hours: f64,
    month3_hours: f64,
    segment_default: f64,
    config: &ScoringConfig,
) -> ModelResult<BaselineEstimate> {
    if segment_default <= 0.0 {
        return Err(ModelError::config(format!(
            "segment default baseline must be positive, got {segment_default}"
        )));
    }
    if month2_hours < 0.0 || month3_hours < 0.0 {
        return Err(ModelError::invalid_usage(format!(
            "trial usage hours cannot be negative: ({month2_hours}, {month3_hours})"
        )));
    }

    // Median of two samples is their midpoint.
    let raw = (month2_hours + month3_hours) / 2.0;
    let ceiling = segment_default * config.baseline_cap_ratio;
    let capped = raw.min(ceiling);

    Ok(BaselineEstimate {
        raw,
        capped,
        was_capped: raw > ceiling,
        anomaly_flag: raw > segment_default * config.baseline_anomaly_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaming_attempt_capped_and_flagged() {
        let config = ScoringConfig::default();
        let estimate = estimate_baseline(250.0, 90.0, 100.0, &config).unwrap();
        assert_relative_eq!(estimate.raw, 170.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.capped, 120.0, epsilon = 1e-12);
        assert!(estimate.was_capped);
        // raw 170 > 100 * 1.5
        assert!(estimate.anomaly_flag);
    }

    #[test]
    fn test_normal_usage_untouched() {
        let config = ScoringConfig::default();
        let estimate = estimate_baseline(95.0, 105.0, 100.0, &config).unwrap();
        assert_relative_eq!(estimate.raw, 100.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.capped, 100.0, epsilon = 1e-12);
        assert!(!estimate.was_capped);
        assert!(!estimate.anomaly_flag);
    }

    #[test]
    fn test_capped_without_review_flag() {
        let config = ScoringConfig::default();
        // raw 130: above the 1.2x cap, below the 1.5x review threshold
        let estimate = estimate_baseline(130.0, 130.0, 100.0, &config).unwrap();
        assert!(estimate.was_capped);
        assert!(!estimate.anomaly_flag);
        assert_relative_eq!(estimate.capped, 120.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_default_rejected() {
        let config = ScoringConfig::default();
        let err = estimate_baseline(100.0, 100.0, 0.0, &config).unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn test_negative_sample_rejected() {
        let config = ScoringConfig::default();
        let err = estimate_baseline(-5.0, 100.0, 100.0, &config).unwrap_err();
        assert!(matches!(err, ModelError::InvalidUsage(_)));
    }
}
