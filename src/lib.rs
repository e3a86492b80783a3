//! Pricing simulation and constraint validation engine for a
//! subscription-based appliance program
//!
//! The model answers two questions about a pricing scenario: does it hold
//! up economically, and what does a portfolio of real-ish customers do to
//! it over time. The first is the job of five constraint checkers
//! (participation, profitability, cash flow, incentive compatibility,
//! moral hazard); the second is a seeded customer x month simulation with
//! seasonal usage, bucket-plan billing, behavior discounts, and churn.
//!
//! # Layout
//!
//! - [`assumptions`]: immutable configuration (plans, segments, regions,
//!   market and cost parameters), injected everywhere
//! - [`finance`]: discounting primitives and the two rate profiles
//! - [`billing`]: the monthly billing engine, behavior scoring, and the
//!   anti-gaming trial baseline
//! - [`alternatives`]: purchase / EMI / rental / subscription cost
//!   breakdowns with tax-consistency validation
//! - [`constraints`]: the five checkers and tri-state boundary search
//! - [`simulation`]: population generator, portfolio simulator, aggregates
//!
//! Constraint violations are results, not errors: the core never decides
//! for a caller that a failing check is fatal.

pub mod alternatives;
pub mod assumptions;
pub mod billing;
pub mod constraints;
pub mod error;
pub mod finance;
pub mod scenario;
pub mod simulation;

pub use assumptions::Assumptions;
pub use error::{ModelError, ModelResult};
pub use scenario::ScenarioParams;
