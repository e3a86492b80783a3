//! Monthly bill computation
//!
//! Bill = (base fee + capped overage - efficiency discount) with GST on top.
//! Overage is hours-based: the program charges for access and wear, never
//! for electricity, which the customer pays their utility directly.

use serde::Serialize;

use crate::assumptions::{EfficiencyTierTable, Plan, Region, SeasonCalendar};
use crate::error::{ModelError, ModelResult};

/// One month's bill for a single customer
#[derive(Debug, Clone, Serialize)]
pub struct Bill {
    pub base_fee: f64,
    pub overage_charge: f64,
    pub efficiency_discount: f64,

    /// base fee + overage - discount, clamped at zero
    pub pre_tax_total: f64,

    /// pre-tax total with GST applied
    pub tax_inclusive_total: f64,

    /// Discount tier the score landed in
    pub tier_label: &'static str,
}

/// Assembles bills from plan terms, usage, and the efficiency score
#[derive(Debug, Clone)]
pub struct BillingEngine {
    tiers: EfficiencyTierTable,
    calendar: SeasonCalendar,
    tax_rate: f64,
}

impl BillingEngine {
    pub fn new(tiers: EfficiencyTierTable, calendar: SeasonCalendar, tax_rate: f64) -> Self {
        Self {
            tiers,
            calendar,
            tax_rate,
        }
    }

    /// Hours included for a plan in a given month of year, resolving
    /// seasonal quotas through the region's calendar.
    pub fn included_hours_for(&self, plan: &Plan, month_of_year: u32, region: Region) -> f64 {
        let season = self.calendar.season_for(region, month_of_year);
        plan.included.for_season(season)
    }

    /// Compute the bill for one customer-month.
    ///
    /// Negative `actual_hours` is rejected: usage is produced upstream and a
    /// negative value means the producer is broken, not that the customer
    /// used negative hours.
    pub fn compute_bill(
        &self,
        plan: &Plan,
        month_of_year: u32,
        region: Region,
        actual_hours: f64,
        efficiency_score: f64,
    ) -> ModelResult<Bill> {
        if actual_hours < 0.0 {
            return Err(ModelError::invalid_usage(format!(
                "actual_hours must be non-negative, got {actual_hours}"
            )));
        }

        let included = self.included_hours_for(plan, month_of_year, region);
        let overage = overage_charge(
            actual_hours,
            included,
            plan.overage_rate_per_hour,
            plan.overage_cap,
        );

        let tier = self.tiers.tier_for(efficiency_score);
        let efficiency_discount = plan.monthly_fee * tier.discount;
        assert!(
            efficiency_discount <= plan.monthly_fee,
            "efficiency discount {efficiency_discount} exceeds base fee {}",
            plan.monthly_fee
        );

        let pre_tax_total = (plan.monthly_fee + overage - efficiency_discount).max(0.0);
        let tax_inclusive_total = pre_tax_total * (1.0 + self.tax_rate);

        Ok(Bill {
            base_fee: plan.monthly_fee,
            overage_charge: overage,
            efficiency_discount,
            pre_tax_total,
            tax_inclusive_total,
            tier_label: tier.label,
        })
    }
}

/// Overage charge: `min(max(0, actual - included) * rate, cap)`.
/// Never negative, and the cap binds exactly.
pub fn overage_charge(actual_hours: f64, included_hours: f64, rate: f64, cap: f64) -> f64 {
    let excess = (actual_hours - included_hours).max(0.0);
    (excess * rate).min(cap)
}
