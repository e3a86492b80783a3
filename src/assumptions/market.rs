//! Market parameters and per-unit cost assumptions
//!
//! Everything here is configuration supplied before any core function runs.
//! Amounts are INR. The MRP is quoted tax-inclusive, as printed on the box;
//! service charges (AMC, repairs, fees, rent) are quoted pre-tax with GST
//! applied at billing time.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Resale value of the appliance by ownership tenure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalValueTable {
    /// (tenure_years, resale value), ascending by year
    points: Vec<(u32, f64)>,
}

impl Default for TerminalValueTable {
    fn default() -> Self {
        Self {
            points: vec![
                (3, 12_000.0),
                (5, 5_000.0),
                (7, 2_500.0),
                (10, 1_500.0),
            ],
        }
    }
}

impl TerminalValueTable {
    pub fn from_points(points: Vec<(u32, f64)>) -> Self {
        Self { points }
    }

    /// Resale value after `tenure_years` of ownership. Uses the largest
    /// tabulated year at or below the tenure; tenures shorter than the first
    /// entry take the first (highest) value.
    pub fn value_at(&self, tenure_years: u32) -> f64 {
        let mut value = self.points.first().map(|&(_, v)| v).unwrap_or(0.0);
        for &(year, v) in &self.points {
            if year <= tenure_years {
                value = v;
            }
        }
        value
    }
}

/// Market-side assumptions shared by the alternative-cost calculators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAssumptions {
    /// GST rate applied to every service charge
    pub tax_rate: f64,

    /// Appliance MRP, tax-inclusive
    pub mrp: f64,

    /// Annual maintenance contract, pre-tax
    pub amc_annual: f64,

    /// Probability of a billable repair in any ownership year
    pub repair_probability_per_year: f64,

    /// Average repair invoice, pre-tax
    pub avg_repair_cost: f64,

    /// Resale values by ownership tenure
    pub terminal_values: TerminalValueTable,

    /// Consumer financing annual interest rate
    pub emi_annual_rate: f64,

    /// Financing processing fee as a fraction of MRP
    pub emi_processing_fee_pct: f64,

    /// Market rental rate per month, pre-tax
    pub rental_monthly: f64,

    /// Rental security deposit in months of rent, refunded at end
    pub rental_deposit_months: u32,

    /// Subscription security deposit, refunded at end
    pub security_deposit: f64,

    /// Perceived monthly value of the bundled service (maintenance,
    /// warranty, IoT monitoring) before the segment multiplier. Feeds the
    /// plan-choice utility in the incentive checks.
    pub service_value_base: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            tax_rate: 0.18,
            mrp: 45_000.0,
            amc_annual: 2_500.0,
            repair_probability_per_year: 0.25,
            avg_repair_cost: 2_400.0,
            terminal_values: TerminalValueTable::default(),
            emi_annual_rate: 0.14,
            emi_processing_fee_pct: 0.02,
            rental_monthly: 1_500.0,
            rental_deposit_months: 2,
            security_deposit: 5_000.0,
            service_value_base: 500.0,
        }
    }
}

impl MarketAssumptions {
    pub fn validate(&self) -> ModelResult<()> {
        if !(0.0..1.0).contains(&self.tax_rate) {
            return Err(ModelError::config("tax rate must be in [0, 1)"));
        }
        if self.mrp <= 0.0 {
            return Err(ModelError::config("MRP must be positive"));
        }
        if !(0.0..=1.0).contains(&self.repair_probability_per_year) {
            return Err(ModelError::config(
                "repair probability must be a probability",
            ));
        }
        if self.emi_annual_rate < 0.0 {
            return Err(ModelError::config("rates must be non-negative"));
        }
        Ok(())
    }
}

/// Per-unit cost structure of running the subscription program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAssumptions {
    /// Fraction of MRP absorbed as an upfront subsidy
    pub subsidy_percent: f64,

    /// Manufacturing cost per unit
    pub manufacturing_cost: f64,

    /// IoT hardware per unit
    pub iot_hardware: f64,

    /// Installation per unit
    pub installation_cost: f64,

    /// Customer acquisition cost
    pub cac: f64,

    /// Warranty reserve per unit
    pub warranty_reserve: f64,

    /// CAC co-funding from the card-partner bank, received at signup
    pub bank_cac_subsidy: f64,

    /// Monthly recurring cost per active subscriber (IoT service plus
    /// scheduled maintenance)
    pub monthly_recurring_cost: f64,

    /// Required margin over cost PV for the profitability check
    pub target_margin: f64,

    /// Deepest tolerated cumulative cash position per customer
    pub cash_floor: f64,
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self {
            subsidy_percent: 0.50,
            manufacturing_cost: 30_000.0,
            iot_hardware: 1_500.0,
            installation_cost: 2_500.0,
            cac: 2_000.0,
            warranty_reserve: 2_000.0,
            bank_cac_subsidy: 2_000.0,
            monthly_recurring_cost: 192.0,
            target_margin: 0.0,
            cash_floor: -25_000.0,
        }
    }
}

impl CostAssumptions {
    /// Total upfront outlay per unit, before the bank subsidy.
    pub fn upfront_cost(&self) -> f64 {
        self.manufacturing_cost
            + self.iot_hardware
            + self.installation_cost
            + self.cac
            + self.warranty_reserve
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !(0.0..1.0).contains(&self.subsidy_percent) {
            return Err(ModelError::config("subsidy percent must be in [0, 1)"));
        }
        if self.upfront_cost() <= 0.0 {
            return Err(ModelError::config("upfront costs must be positive"));
        }
        if self.monthly_recurring_cost < 0.0 {
            return Err(ModelError::config(
                "monthly recurring cost must be non-negative",
            ));
        }
        if self.cash_floor > 0.0 {
            return Err(ModelError::config("cash floor must not be positive"));
        }
        Ok(())
    }
}
