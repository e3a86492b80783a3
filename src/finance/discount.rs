//! Discounting and present-value helpers
//!
//! Monthly payment streams use the simple conversion `annual / 12`. That is
//! the single convention for the whole model: every stream NPV in billing,
//! constraints, and alternative-cost comparison goes through this module.
//! One-off events that land on year boundaries (repairs, terminal value,
//! deposit refunds) discount with annual compounding instead.

use serde::{Deserialize, Serialize};

use crate::assumptions::Segment;

/// Convert an annual rate to the per-month rate used for payment streams.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 12.0
}

/// Present value of a `(period_index, amount)` cash-flow stream at an annual
/// rate. Period 0 is undiscounted. An empty stream has a present value of
/// exactly 0.
pub fn present_value(cash_flows: &[(u32, f64)], annual_rate: f64) -> f64 {
    let r = monthly_rate(annual_rate);
    cash_flows
        .iter()
        .map(|&(t, cf)| cf / (1.0 + r).powi(t as i32))
        .sum()
}

/// Present value of a level monthly payment over `months`, first payment at
/// period 0.
pub fn present_value_level(amount: f64, months: u32, annual_rate: f64) -> f64 {
    let r = monthly_rate(annual_rate);
    if r == 0.0 {
        return amount * months as f64;
    }
    let mut pv = 0.0;
    for t in 0..months {
        pv += amount / (1.0 + r).powi(t as i32);
    }
    pv
}

/// Present value of a single amount falling `years` from now, discounted
/// with annual compounding.
pub fn present_value_at_years(amount: f64, years: f64, annual_rate: f64) -> f64 {
    amount / (1.0 + annual_rate).powf(years)
}

/// The two rate profiles the model works with.
///
/// The firm discounts at its cost of capital. Customers discount much more
/// steeply, and cash-constrained light users steepest of all; that spread is
/// what makes the subsidized-upfront structure viable in the first place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRates {
    /// Firm WACC, annual
    pub firm_annual: f64,

    /// Customer annual rates by segment
    pub light_annual: f64,
    pub moderate_annual: f64,
    pub heavy_annual: f64,
}

impl Default for DiscountRates {
    fn default() -> Self {
        Self {
            firm_annual: 0.12,     // 12% WACC
            light_annual: 0.28,    // cash-constrained
            moderate_annual: 0.22,
            heavy_annual: 0.16,
        }
    }
}

impl DiscountRates {
    /// Annual discount rate from the customer's perspective.
    pub fn customer_annual(&self, segment: Segment) -> f64 {
        match segment {
            Segment::Light => self.light_annual,
            Segment::Moderate => self.moderate_annual,
            Segment::Heavy => self.heavy_annual,
        }
    }
}
