//! Billing engine, behavior scoring, and the trial-period baseline

mod baseline;
mod efficiency;
mod engine;

pub use baseline::{estimate_baseline, BaselineEstimate};
pub use efficiency::{efficiency_score, TelemetrySample};
pub use engine::{overage_charge, Bill, BillingEngine};
