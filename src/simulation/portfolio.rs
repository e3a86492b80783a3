//! Portfolio simulator
//!
//! Expands a customer population into the full customer x month grid:
//! seasonal usage with bounded Gaussian noise, behavior scores, billing,
//! and churn. The grid is column-oriented and customers are fanned out in
//! parallel, each on an independent derived RNG stream, so a run is
//! reproducible from its seed alone regardless of thread scheduling.
//!
//! Churn is an absorbing state. The month a customer's hazard trial fires
//! and every month after it are inactive and carry zero financial flows; a
//! customer never un-churns.

use log::info;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use serde::Serialize;

use crate::assumptions::{Assumptions, PlanId, Region, Season, Segment};
use crate::billing::BillingEngine;
use crate::error::{ModelError, ModelResult};
use crate::scenario::ScenarioParams;

use super::aggregate::{summarize, PortfolioSummary};
use super::population::Customer;
use super::rng::derived_stream;

/// Noise and seeding parameters for a simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorConfig {
    /// Standard deviation of the multiplicative usage noise
    pub usage_noise_std: f64,

    /// Standard deviation of the monthly efficiency score wiggle
    pub efficiency_noise_std: f64,

    /// Master seed for the run
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            usage_noise_std: 0.15,
            efficiency_noise_std: 5.0,
            seed: 42,
        }
    }
}

/// Column-oriented customer x month table. Row `i` of every column refers
/// to the same customer-month.
#[derive(Debug, Clone, Default)]
pub struct SimulationGrid {
    pub customer_id: Vec<u32>,
    pub month: Vec<u32>,
    pub month_of_year: Vec<u32>,
    pub segment: Vec<Segment>,
    pub region: Vec<Region>,
    pub plan: Vec<PlanId>,
    pub season: Vec<Season>,
    pub baseline_hours: Vec<f64>,
    pub included_hours: Vec<f64>,
    pub actual_hours: Vec<f64>,
    pub efficiency_score: Vec<f64>,
    pub active: Vec<bool>,
    pub base_fee: Vec<f64>,
    pub overage_charge: Vec<f64>,
    pub efficiency_discount: Vec<f64>,
    pub pre_tax_total: Vec<f64>,
    pub tax_inclusive_total: Vec<f64>,
}

impl SimulationGrid {
    pub fn len(&self) -> usize {
        self.customer_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customer_id.is_empty()
    }

    fn with_capacity(rows: usize) -> Self {
        Self {
            customer_id: Vec::with_capacity(rows),
            month: Vec::with_capacity(rows),
            month_of_year: Vec::with_capacity(rows),
            segment: Vec::with_capacity(rows),
            region: Vec::with_capacity(rows),
            plan: Vec::with_capacity(rows),
            season: Vec::with_capacity(rows),
            baseline_hours: Vec::with_capacity(rows),
            included_hours: Vec::with_capacity(rows),
            actual_hours: Vec::with_capacity(rows),
            efficiency_score: Vec::with_capacity(rows),
            active: Vec::with_capacity(rows),
            base_fee: Vec::with_capacity(rows),
            overage_charge: Vec::with_capacity(rows),
            efficiency_discount: Vec::with_capacity(rows),
            pre_tax_total: Vec::with_capacity(rows),
            tax_inclusive_total: Vec::with_capacity(rows),
        }
    }

    fn append_block(&mut self, block: CustomerBlock) {
        self.customer_id.extend(block.customer_id);
        self.month.extend(block.month);
        self.month_of_year.extend(block.month_of_year);
        self.segment.extend(block.segment);
        self.region.extend(block.region);
        self.plan.extend(block.plan);
        self.season.extend(block.season);
        self.baseline_hours.extend(block.baseline_hours);
        self.included_hours.extend(block.included_hours);
        self.actual_hours.extend(block.actual_hours);
        self.efficiency_score.extend(block.efficiency_score);
        self.active.extend(block.active);
        self.base_fee.extend(block.base_fee);
        self.overage_charge.extend(block.overage_charge);
        self.efficiency_discount.extend(block.efficiency_discount);
        self.pre_tax_total.extend(block.pre_tax_total);
        self.tax_inclusive_total.extend(block.tax_inclusive_total);
    }
}

/// The grid plus its derived aggregate. The aggregate is the sole contract
/// to the reporting layer; row-level columns stay internal to the core.
#[derive(Debug, Clone)]
pub struct SimulationPortfolio {
    pub grid: SimulationGrid,
    pub summary: PortfolioSummary,
}

/// All columns for one customer's months, produced by one worker
struct CustomerBlock {
    customer_id: Vec<u32>,
    month: Vec<u32>,
    month_of_year: Vec<u32>,
    segment: Vec<Segment>,
    region: Vec<Region>,
    plan: Vec<PlanId>,
    season: Vec<Season>,
    baseline_hours: Vec<f64>,
    included_hours: Vec<f64>,
    actual_hours: Vec<f64>,
    efficiency_score: Vec<f64>,
    active: Vec<bool>,
    base_fee: Vec<f64>,
    overage_charge: Vec<f64>,
    efficiency_discount: Vec<f64>,
    pre_tax_total: Vec<f64>,
    tax_inclusive_total: Vec<f64>,
}

/// Simulate the portfolio over the scenario tenure.
pub fn simulate_portfolio(
    customers: &[Customer],
    assumptions: &Assumptions,
    scenario: &ScenarioParams,
    config: &SimulatorConfig,
) -> ModelResult<SimulationPortfolio> {
    if customers.is_empty() {
        return Err(ModelError::config("cannot simulate an empty population"));
    }
    scenario.validate()?;
    assumptions.validate()?;
    if config.usage_noise_std <= 0.0 || config.efficiency_noise_std <= 0.0 {
        return Err(ModelError::config("noise standard deviations must be positive"));
    }

    let usage_noise = Normal::new(1.0, config.usage_noise_std)
        .map_err(|e| ModelError::config(format!("usage noise: {e}")))?;
    let efficiency_noise = Normal::new(0.0, config.efficiency_noise_std)
        .map_err(|e| ModelError::config(format!("efficiency noise: {e}")))?;
    // Clip to three standard deviations; a pathological draw must never
    // push hours negative.
    let noise_lo = (1.0 - 3.0 * config.usage_noise_std).max(0.0);
    let noise_hi = 1.0 + 3.0 * config.usage_noise_std;

    let engine = BillingEngine::new(
        assumptions.tiers.clone(),
        assumptions.calendar.clone(),
        assumptions.market.tax_rate,
    );
    let tenure = scenario.tenure_months;

    let blocks: Vec<ModelResult<CustomerBlock>> = customers
        .par_iter()
        .map(|customer| {
            simulate_customer(
                customer,
                assumptions,
                &engine,
                tenure,
                usage_noise,
                efficiency_noise,
                noise_lo,
                noise_hi,
                config.seed,
            )
        })
        .collect();

    let mut grid = SimulationGrid::with_capacity(customers.len() * tenure as usize);
    for block in blocks {
        grid.append_block(block?);
    }

    let summary = summarize(&grid, assumptions, scenario, customers.len() as u32);
    info!(
        "simulated {} customers x {} months = {} rows",
        customers.len(),
        tenure,
        grid.len()
    );

    Ok(SimulationPortfolio { grid, summary })
}

#[allow(clippy::too_many_arguments)]
fn simulate_customer(
    customer: &Customer,
    assumptions: &Assumptions,
    engine: &BillingEngine,
    tenure_months: u32,
    usage_noise: Normal<f64>,
    efficiency_noise: Normal<f64>,
    noise_lo: f64,
    noise_hi: f64,
    seed: u64,
) -> ModelResult<CustomerBlock> {
    let rows = tenure_months as usize;
    let mut block = CustomerBlock {
        customer_id: vec![customer.customer_id; rows],
        month: (0..tenure_months).collect(),
        month_of_year: Vec::with_capacity(rows),
        segment: vec![customer.segment; rows],
        region: vec![customer.region; rows],
        plan: vec![customer.assigned_plan; rows],
        season: Vec::with_capacity(rows),
        baseline_hours: Vec::with_capacity(rows),
        included_hours: Vec::with_capacity(rows),
        actual_hours: Vec::with_capacity(rows),
        efficiency_score: Vec::with_capacity(rows),
        active: Vec::with_capacity(rows),
        base_fee: Vec::with_capacity(rows),
        overage_charge: Vec::with_capacity(rows),
        efficiency_discount: Vec::with_capacity(rows),
        pre_tax_total: Vec::with_capacity(rows),
        tax_inclusive_total: Vec::with_capacity(rows),
    };

    let mut rng = derived_stream(seed, customer.customer_id as u64);
    let plan = assumptions.plans.get(customer.assigned_plan);
    let base_hours = assumptions.segments.get(customer.segment).base_hours;
    let mut alive = true;

    for month in 0..tenure_months {
        let month_of_year = (customer.signup_month + month) % 12;
        let season = assumptions
            .calendar
            .season_for(customer.region, month_of_year);
        block.month_of_year.push(month_of_year);
        block.season.push(season);
        block.baseline_hours.push(base_hours);
        block
            .included_hours
            .push(engine.included_hours_for(plan, month_of_year, customer.region));

        // Hazard trial first: a churn this month already bills nothing
        if alive && rng.gen::<f64>() < customer.churn_hazard {
            alive = false;
        }

        if !alive {
            block.actual_hours.push(0.0);
            block.efficiency_score.push(0.0);
            block.active.push(false);
            block.base_fee.push(0.0);
            block.overage_charge.push(0.0);
            block.efficiency_discount.push(0.0);
            block.pre_tax_total.push(0.0);
            block.tax_inclusive_total.push(0.0);
            continue;
        }

        let seasonality = assumptions
            .seasonality
            .multiplier(customer.region, month_of_year);
        let noise = usage_noise.sample(&mut rng).clamp(noise_lo, noise_hi);
        let actual_hours = base_hours * seasonality * customer.usage_factor * noise;

        let score = (customer.efficiency_base + efficiency_noise.sample(&mut rng))
            .clamp(0.0, 100.0);

        let bill = engine.compute_bill(
            plan,
            month_of_year,
            customer.region,
            actual_hours,
            score,
        )?;

        block.actual_hours.push(actual_hours);
        block.efficiency_score.push(score);
        block.active.push(true);
        block.base_fee.push(bill.base_fee);
        block.overage_charge.push(bill.overage_charge);
        block.efficiency_discount.push(bill.efficiency_discount);
        block.pre_tax_total.push(bill.pre_tax_total);
        block.tax_inclusive_total.push(bill.tax_inclusive_total);
    }

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::population::generate_customers;

    fn run(n: u32, tenure: u32, seed: u64) -> SimulationPortfolio {
        let assumptions = Assumptions::default_pricing();
        let scenario = ScenarioParams {
            tenure_months: tenure,
            ..Default::default()
        };
        let customers = generate_customers(n, &assumptions, 0.05, seed).unwrap();
        let config = SimulatorConfig {
            seed,
            ..Default::default()
        };
        simulate_portfolio(&customers, &assumptions, &scenario, &config).unwrap()
    }

    #[test]
    fn test_grid_dimensions() {
        let portfolio = run(50, 12, 42);
        assert_eq!(portfolio.grid.len(), 50 * 12);
        assert_eq!(portfolio.grid.active.len(), portfolio.grid.len());
    }

    #[test]
    fn test_determinism_same_seed() {
        let a = run(100, 24, 42);
        let b = run(100, 24, 42);
        assert_eq!(a.grid.actual_hours, b.grid.actual_hours);
        assert_eq!(a.grid.tax_inclusive_total, b.grid.tax_inclusive_total);
        assert_eq!(a.grid.active, b.grid.active);
        assert_eq!(a.summary.gross_margin, b.summary.gross_margin);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = run(100, 24, 42);
        let b = run(100, 24, 43);
        assert_ne!(a.grid.actual_hours, b.grid.actual_hours);
    }

    #[test]
    fn test_churn_is_absorbing_across_seeds() {
        for seed in [1, 7, 42, 1234] {
            let portfolio = run(200, 36, seed);
            let grid = &portfolio.grid;
            let tenure = 36usize;
            for c in 0..200usize {
                let rows = c * tenure..(c + 1) * tenure;
                let mut churned = false;
                for i in rows {
                    if churned {
                        assert!(!grid.active[i], "customer un-churned at row {i}");
                        assert_eq!(grid.pre_tax_total[i], 0.0);
                        assert_eq!(grid.tax_inclusive_total[i], 0.0);
                        assert_eq!(grid.actual_hours[i], 0.0);
                    }
                    if !grid.active[i] {
                        churned = true;
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_negative_hours_or_bills() {
        let portfolio = run(300, 24, 9);
        for i in 0..portfolio.grid.len() {
            assert!(portfolio.grid.actual_hours[i] >= 0.0);
            assert!(portfolio.grid.pre_tax_total[i] >= 0.0);
            assert!(portfolio.grid.overage_charge[i] >= 0.0);
        }
    }

    #[test]
    fn test_seasonality_shows_in_usage() {
        // Active northern rows in May must average far above November
        let portfolio = run(400, 24, 42);
        let grid = &portfolio.grid;
        let mut may = (0.0, 0u32);
        let mut november = (0.0, 0u32);
        for i in 0..grid.len() {
            if grid.region[i] != Region::North || !grid.active[i] {
                continue;
            }
            match grid.month_of_year[i] {
                4 => {
                    may.0 += grid.actual_hours[i];
                    may.1 += 1;
                }
                10 => {
                    november.0 += grid.actual_hours[i];
                    november.1 += 1;
                }
                _ => {}
            }
        }
        assert!(may.1 > 0 && november.1 > 0);
        assert!(may.0 / may.1 as f64 > 3.0 * (november.0 / november.1 as f64));
    }

    #[test]
    fn test_end_to_end_scale_and_sanity() {
        use std::time::Instant;
        let start = Instant::now();
        let portfolio = run(1_000, 60, 42);
        let elapsed = start.elapsed();
        assert!(
            elapsed.as_secs() < 5,
            "1000 x 60 took {elapsed:?}, expected well under a few seconds"
        );

        let summary = &portfolio.summary;
        assert_eq!(portfolio.grid.len(), 60_000);
        assert!(summary.gross_margin > 0.0);
        // Upper sanity bound: the standard base fee billed to every
        // customer every month with no costs at all
        assert!(summary.gross_margin < 599.0 * 60.0 * 1_000.0);
        match summary.breakeven_month {
            Some(month) => assert!(month <= 60),
            None => {}
        }
    }

    #[test]
    fn test_efficiency_tier_mix_near_targets() {
        let portfolio = run(1_000, 60, 42);
        let shares = &portfolio.summary.tier_shares;
        let get = |label: &str| {
            shares
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, s)| *s)
                .unwrap_or(0.0)
        };
        // Documented target mix is roughly 7/23/35/35; wide bands absorb
        // sampling noise
        assert!((0.02..=0.14).contains(&get("champion")), "champion {}", get("champion"));
        assert!((0.18..=0.42).contains(&get("star")), "star {}", get("star"));
        assert!((0.25..=0.45).contains(&get("aware")), "aware {}", get("aware"));
        assert!((0.12..=0.45).contains(&get("improving")), "improving {}", get("improving"));
    }

    #[test]
    fn test_empty_population_rejected() {
        let assumptions = Assumptions::default_pricing();
        let result = simulate_portfolio(
            &[],
            &assumptions,
            &ScenarioParams::default(),
            &SimulatorConfig::default(),
        );
        assert!(result.is_err());
    }
}
