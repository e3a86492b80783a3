//! Alternative acquisition cost calculators
//!
//! Computes what the same appliance costs the customer over a horizon under
//! each acquisition route: outright purchase, financed purchase, rental, and
//! the subscription. All four produce NPV breakdowns at the customer's
//! discount rate so the participation check compares like with like.
//!
//! GST discipline is the failure mode to guard here. Applying tax to one
//! route's service charges and not another's silently skews the comparison
//! by the full tax rate, so every component declares its treatment and
//! `validate_tax_consistency` is run before any comparison is trusted.

use serde::Serialize;

use crate::assumptions::MarketAssumptions;
use crate::error::{ModelError, ModelResult};
use crate::finance::{present_value_at_years, present_value_level};

/// Whether a component's present value carries GST
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaxTreatment {
    /// A real service or product charge; GST applied exactly once
    TaxInclusive,
    /// No taxable event (deposits, resale value)
    TaxFree,
}

/// What a component represents in cash-flow terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    /// Money the customer pays for goods or services
    Charge,
    /// A cash-flow reversal: refunded deposit, resale proceeds
    Reversal,
}

/// One line of a cost breakdown, in present-value terms
#[derive(Debug, Clone, Serialize)]
pub struct CostComponent {
    pub label: &'static str,
    pub present_value: f64,
    pub kind: ComponentKind,
    pub tax: TaxTreatment,
}

impl CostComponent {
    pub fn charge(label: &'static str, present_value: f64) -> Self {
        Self {
            label,
            present_value,
            kind: ComponentKind::Charge,
            tax: TaxTreatment::TaxInclusive,
        }
    }

    /// A charge deliberately built without tax. Exists so consistency
    /// violations can be constructed and detected; production calculators
    /// never use it.
    pub fn charge_untaxed(label: &'static str, present_value: f64) -> Self {
        Self {
            label,
            present_value,
            kind: ComponentKind::Charge,
            tax: TaxTreatment::TaxFree,
        }
    }

    pub fn reversal(label: &'static str, present_value: f64) -> Self {
        Self {
            label,
            present_value: -present_value.abs(),
            kind: ComponentKind::Reversal,
            tax: TaxTreatment::TaxFree,
        }
    }
}

/// Full cost of one acquisition route over the comparison horizon
#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    pub method: &'static str,
    pub components: Vec<CostComponent>,
}

impl CostBreakdown {
    pub fn total_npv(&self) -> f64 {
        self.components.iter().map(|c| c.present_value).sum()
    }

    pub fn component(&self, label: &str) -> Option<&CostComponent> {
        self.components.iter().find(|c| c.label == label)
    }
}

/// Verify tax treatment is coherent across a set of breakdowns: every charge
/// carries GST, every reversal is tax-free. Run this before trusting any
/// cross-method comparison.
pub fn validate_tax_consistency(breakdowns: &[&CostBreakdown]) -> ModelResult<()> {
    let mut issues = Vec::new();
    for breakdown in breakdowns {
        for component in &breakdown.components {
            match (component.kind, component.tax) {
                (ComponentKind::Charge, TaxTreatment::TaxFree) => {
                    issues.push(format!(
                        "{}: charge '{}' is missing tax",
                        breakdown.method, component.label
                    ));
                }
                (ComponentKind::Reversal, TaxTreatment::TaxInclusive) => {
                    issues.push(format!(
                        "{}: reversal '{}' must not be taxed",
                        breakdown.method, component.label
                    ));
                }
                _ => {}
            }
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ModelError::config(format!(
            "inconsistent tax treatment: {}",
            issues.join("; ")
        )))
    }
}

/// Standard amortized monthly installment. Zero-rate loans divide evenly.
pub fn emi_payment(principal: f64, annual_rate: f64, tenure_months: u32) -> f64 {
    let n = tenure_months as f64;
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powi(tenure_months as i32);
    principal * r * growth / (growth - 1.0)
}

fn validate_tenure(tenure_months: u32) -> ModelResult<()> {
    if tenure_months == 0 {
        return Err(ModelError::config("tenure must be at least one month"));
    }
    Ok(())
}

/// Outright purchase: MRP now, AMC and expected repairs along the way, the
/// resale value coming back at the end.
pub fn purchase_cost(
    market: &MarketAssumptions,
    tenure_months: u32,
    customer_rate: f64,
) -> ModelResult<CostBreakdown> {
    validate_tenure(tenure_months)?;
    let tenure_years = tenure_months / 12;

    let mut components = vec![CostComponent::charge("appliance", market.mrp)];

    let amc_monthly = (market.amc_annual / 12.0) * (1.0 + market.tax_rate);
    components.push(CostComponent::charge(
        "maintenance contract",
        present_value_level(amc_monthly, tenure_months, customer_rate),
    ));

    let expected_repair =
        market.repair_probability_per_year * market.avg_repair_cost * (1.0 + market.tax_rate);
    let mut repairs_pv = 0.0;
    for year in 1..=tenure_years {
        repairs_pv += present_value_at_years(expected_repair, year as f64, customer_rate);
    }
    components.push(CostComponent::charge("expected repairs", repairs_pv));

    let terminal = market.terminal_values.value_at(tenure_years.max(1));
    components.push(CostComponent::reversal(
        "resale value",
        present_value_at_years(terminal, tenure_months as f64 / 12.0, customer_rate),
    ));

    Ok(CostBreakdown {
        method: "purchase",
        components,
    })
}

/// Financed purchase: processing fee plus the EMI stream, then the same
/// ownership costs and resale value as buying outright.
pub fn emi_cost(
    market: &MarketAssumptions,
    emi_tenure_months: u32,
    horizon_months: u32,
    customer_rate: f64,
) -> ModelResult<CostBreakdown> {
    validate_tenure(horizon_months)?;
    if emi_tenure_months == 0 || emi_tenure_months > horizon_months {
        return Err(ModelError::config(format!(
            "EMI tenure {emi_tenure_months} must be within the {horizon_months}-month horizon"
        )));
    }

    let mut components = vec![CostComponent::charge(
        "processing fee",
        market.mrp * market.emi_processing_fee_pct,
    )];

    let payment = emi_payment(market.mrp, market.emi_annual_rate, emi_tenure_months);
    components.push(CostComponent::charge(
        "installments",
        present_value_level(payment, emi_tenure_months, customer_rate),
    ));

    let tenure_years = horizon_months / 12;
    let amc_monthly = (market.amc_annual / 12.0) * (1.0 + market.tax_rate);
    components.push(CostComponent::charge(
        "maintenance contract",
        present_value_level(amc_monthly, horizon_months, customer_rate),
    ));

    let expected_repair =
        market.repair_probability_per_year * market.avg_repair_cost * (1.0 + market.tax_rate);
    let mut repairs_pv = 0.0;
    for year in 1..=tenure_years {
        repairs_pv += present_value_at_years(expected_repair, year as f64, customer_rate);
    }
    components.push(CostComponent::charge("expected repairs", repairs_pv));

    let terminal = market.terminal_values.value_at(tenure_years.max(1));
    components.push(CostComponent::reversal(
        "resale value",
        present_value_at_years(terminal, horizon_months as f64 / 12.0, customer_rate),
    ));

    Ok(CostBreakdown {
        method: "emi",
        components,
    })
}

/// Rental: deposit out at signing, rent every month, deposit back at the
/// end. Maintenance is the landlord's problem and there is no resale value.
/// The total is net of the refunded deposit; only its time cost remains.
pub fn rental_cost(
    market: &MarketAssumptions,
    tenure_months: u32,
    customer_rate: f64,
) -> ModelResult<CostBreakdown> {
    validate_tenure(tenure_months)?;

    let deposit = market.rental_monthly * market.rental_deposit_months as f64;
    let rent_monthly = market.rental_monthly * (1.0 + market.tax_rate);
    let tenure_years = tenure_months as f64 / 12.0;

    Ok(CostBreakdown {
        method: "rental",
        components: vec![
            CostComponent {
                label: "security deposit",
                present_value: deposit,
                kind: ComponentKind::Reversal,
                tax: TaxTreatment::TaxFree,
            },
            CostComponent::charge(
                "rent",
                present_value_level(rent_monthly, tenure_months, customer_rate),
            ),
            CostComponent::reversal(
                "deposit refund",
                present_value_at_years(deposit, tenure_years, customer_rate),
            ),
        ],
    })
}

/// Subscription: subsidized upfront price plus the expected monthly bill,
/// both with GST, plus the deposit round trip.
pub fn subscription_cost(
    upfront_subsidized_price: f64,
    expected_monthly_pre_tax: f64,
    market: &MarketAssumptions,
    tenure_months: u32,
    customer_rate: f64,
) -> ModelResult<CostBreakdown> {
    validate_tenure(tenure_months)?;
    if upfront_subsidized_price < 0.0 || expected_monthly_pre_tax < 0.0 {
        return Err(ModelError::config(
            "subscription prices must be non-negative",
        ));
    }

    let monthly = expected_monthly_pre_tax * (1.0 + market.tax_rate);
    let tenure_years = tenure_months as f64 / 12.0;

    Ok(CostBreakdown {
        method: "subscription",
        components: vec![
            CostComponent::charge(
                "upfront price",
                upfront_subsidized_price * (1.0 + market.tax_rate),
            ),
            CostComponent {
                label: "security deposit",
                present_value: market.security_deposit,
                kind: ComponentKind::Reversal,
                tax: TaxTreatment::TaxFree,
            },
            CostComponent::charge(
                "subscription fees",
                present_value_level(monthly, tenure_months, customer_rate),
            ),
            CostComponent::reversal(
                "deposit refund",
                present_value_at_years(market.security_deposit, tenure_years, customer_rate),
            ),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market() -> MarketAssumptions {
        MarketAssumptions::default()
    }

    #[test]
    fn test_emi_zero_rate() {
        assert_relative_eq!(emi_payment(12_000.0, 0.0, 12), 1_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_emi_standard_formula() {
        // 45,000 at 14% over 12 months
        let payment = emi_payment(45_000.0, 0.14, 12);
        let r: f64 = 0.14 / 12.0;
        let growth = (1.0 + r).powi(12);
        let expected = 45_000.0 * r * growth / (growth - 1.0);
        assert_relative_eq!(payment, expected, epsilon = 1e-9);
        // Total interest must be positive
        assert!(payment * 12.0 > 45_000.0);
    }

    #[test]
    fn test_purchase_breakdown_shape() {
        let purchase = purchase_cost(&market(), 24, 0.22).unwrap();
        assert_eq!(purchase.component("appliance").unwrap().present_value, 45_000.0);
        let resale = purchase.component("resale value").unwrap();
        assert!(resale.present_value < 0.0);
        assert_eq!(resale.tax, TaxTreatment::TaxFree);
        // 24 months has no tabulated year below 3, so the resale value is
        // the first table entry discounted 2 years
        assert_relative_eq!(
            resale.present_value,
            -12_000.0 / (1.22_f64).powf(2.0),
            epsilon = 1e-6
        );
        assert!(purchase.total_npv() > 0.0);
    }

    #[test]
    fn test_emi_costs_more_than_purchase() {
        let m = market();
        let purchase = purchase_cost(&m, 24, 0.22).unwrap();
        let emi = emi_cost(&m, 12, 24, 0.22).unwrap();
        // Financing adds interest and fees but defers payment; at a 22%
        // personal discount rate the deferral does not make up for 14%
        // interest plus the fee, nominally.
        let emi_nominal: f64 = emi.component("processing fee").unwrap().present_value
            + emi_payment(m.mrp, m.emi_annual_rate, 12) * 12.0;
        assert!(emi_nominal > purchase.component("appliance").unwrap().present_value);
    }

    #[test]
    fn test_rental_deposit_nets_to_time_cost() {
        let m = market();
        let rental = rental_cost(&m, 24, 0.22).unwrap();
        let deposit = rental.component("security deposit").unwrap().present_value;
        let refund = rental.component("deposit refund").unwrap().present_value;
        assert_eq!(deposit, 3_000.0);
        assert!(refund < 0.0 && refund.abs() < deposit);
        // Net deposit cost is the opportunity cost only
        let net = deposit + refund;
        assert!(net > 0.0 && net < deposit);
    }

    #[test]
    fn test_subscription_upfront_taxed_once() {
        let m = market();
        let sub = subscription_cost(15_750.0, 642.0, &m, 24, 0.22).unwrap();
        assert_relative_eq!(
            sub.component("upfront price").unwrap().present_value,
            15_750.0 * 1.18,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_tax_consistency_accepts_well_formed() {
        let m = market();
        let purchase = purchase_cost(&m, 24, 0.22).unwrap();
        let sub = subscription_cost(15_750.0, 642.0, &m, 24, 0.22).unwrap();
        let emi = emi_cost(&m, 12, 24, 0.22).unwrap();
        let rental = rental_cost(&m, 24, 0.22).unwrap();
        assert!(validate_tax_consistency(&[&purchase, &sub, &emi, &rental]).is_ok());
    }

    #[test]
    fn test_tax_consistency_rejects_untaxed_charge() {
        let m = market();
        let purchase = purchase_cost(&m, 24, 0.22).unwrap();
        let mut broken = subscription_cost(15_750.0, 642.0, &m, 24, 0.22).unwrap();
        broken.components[2] = CostComponent::charge_untaxed("subscription fees", 12_000.0);
        let err = validate_tax_consistency(&[&purchase, &broken]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("subscription fees"));
        assert!(msg.contains("missing tax"));
    }

    #[test]
    fn test_tax_consistency_rejects_taxed_reversal() {
        let mut purchase = purchase_cost(&market(), 24, 0.22).unwrap();
        let idx = purchase
            .components
            .iter()
            .position(|c| c.label == "resale value")
            .unwrap();
        purchase.components[idx].tax = TaxTreatment::TaxInclusive;
        assert!(validate_tax_consistency(&[&purchase]).is_err());
    }

    #[test]
    fn test_zero_tenure_rejected() {
        let m = market();
        assert!(purchase_cost(&m, 0, 0.22).is_err());
        assert!(rental_cost(&m, 0, 0.22).is_err());
        assert!(emi_cost(&m, 12, 0, 0.22).is_err());
        assert!(subscription_cost(10_000.0, 600.0, &m, 0, 0.22).is_err());
    }

    #[test]
    fn test_emi_tenure_beyond_horizon_rejected() {
        assert!(emi_cost(&market(), 36, 24, 0.22).is_err());
    }
}
