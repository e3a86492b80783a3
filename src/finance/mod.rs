//! Time-value-of-money primitives used across billing, constraints, and
//! alternative-cost comparison

mod discount;

pub use discount::{
    monthly_rate, present_value, present_value_at_years, present_value_level, DiscountRates,
};
