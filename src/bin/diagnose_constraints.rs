//! Closed-form constraint diagnosis
//!
//! Compares acquisition alternatives per segment, checks participation,
//! incentive compatibility and moral hazard, then runs boundary searches
//! to locate the pricing frontier. No simulation involved; everything here
//! is the projected view of the scenario.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use subscription_pricing::alternatives::{
    emi_cost, purchase_cost, rental_cost, subscription_cost, validate_tax_consistency,
};
use subscription_pricing::assumptions::Segment;
use subscription_pricing::constraints::{
    check_cash_flow, check_incentive_compatibility, check_moral_hazard, check_participation,
    check_profitability, find_max_standard_fee, find_min_subsidy, projected_net_cash,
    BoundaryOutcome, SearchBounds,
};
use subscription_pricing::{Assumptions, ScenarioParams};

#[derive(Parser)]
#[command(
    name = "diagnose_constraints",
    about = "Closed-form diagnosis of the pricing constraints and their boundaries"
)]
struct Args {
    /// Upfront subsidy as a fraction of the appliance price
    #[arg(long)]
    subsidy: Option<f64>,

    /// Customer comparison horizon in months
    #[arg(long)]
    horizon: Option<u32>,

    /// Efficiency score assumed in the closed-form checks
    #[arg(long)]
    score: Option<f64>,

    /// Optional scenario overrides as JSON
    #[arg(long)]
    scenario: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let assumptions = Assumptions::default_pricing();
    assumptions.validate()?;

    let mut scenario = match &args.scenario {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario file {}", path.display()))?;
            serde_json::from_str::<ScenarioParams>(&raw)
                .with_context(|| format!("parsing scenario file {}", path.display()))?
        }
        None => ScenarioParams::default(),
    };
    if let Some(subsidy) = args.subsidy {
        scenario.subsidy_percent = subsidy;
    }
    if let Some(horizon) = args.horizon {
        scenario.comparison_horizon_months = horizon;
    }
    if let Some(score) = args.score {
        scenario.expected_efficiency_score = score;
    }
    scenario.validate()?;

    println!("Constraint Diagnosis");
    println!("====================");
    println!(
        "Run started {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "Scenario: subsidy {:.0}%, horizon {} months, efficiency score {:.0}",
        scenario.subsidy_percent * 100.0,
        scenario.comparison_horizon_months,
        scenario.expected_efficiency_score
    );

    // Alternative cost comparison per segment
    let horizon = scenario.comparison_horizon_months;
    println!("\nAlternative Costs (customer NPV over {horizon} months)");
    println!("------------------------------------------------------");
    println!(
        "  {:<10} {:>12} {:>12} {:>12} {:>14}",
        "segment", "purchase", "emi", "rental", "subscription"
    );
    for segment in [Segment::Light, Segment::Moderate, Segment::Heavy] {
        let rate = assumptions.customer_rate(segment);
        let purchase = purchase_cost(&assumptions.market, horizon, rate)?;
        let emi = emi_cost(
            &assumptions.market,
            scenario.emi_tenure_months,
            horizon,
            rate,
        )?;
        let rental = rental_cost(&assumptions.market, horizon, rate)?;

        let plan = assumptions
            .plans
            .get(assumptions.plans.intended_plan(segment));
        // Approximate the expected bill with the base fee net of the
        // scenario's discount tier; the participation checker recomputes
        // this exactly.
        let discount = assumptions
            .tiers
            .discount_for(scenario.expected_efficiency_score);
        let monthly = plan.monthly_fee * (1.0 - discount);
        let subscription = subscription_cost(
            scenario.upfront_price_pre_tax(&assumptions.market),
            monthly,
            &assumptions.market,
            horizon,
            rate,
        )?;

        validate_tax_consistency(&[&purchase, &emi, &rental, &subscription])?;

        println!(
            "  {:<10} {:>12.0} {:>12.0} {:>12.0} {:>14.0}",
            segment.as_str(),
            purchase.total_npv(),
            emi.total_npv(),
            rental.total_npv(),
            subscription.total_npv()
        );
    }

    // Participation per segment
    println!("\nParticipation");
    println!("-------------");
    for segment in [Segment::Light, Segment::Moderate, Segment::Heavy] {
        let result = check_participation(&assumptions, &scenario, segment)?;
        let savings = result
            .supporting
            .iter()
            .find(|(n, _)| n == "savings_percent")
            .map(|(_, v)| *v)
            .unwrap_or(0.0);
        println!(
            "  [{}] {:<26} savings {:>6.1}%  slack Rs{:>10.0}",
            result.status_str(),
            result.constraint,
            savings,
            result.slack
        );
    }

    // Firm-side checks
    println!("\nFirm Economics");
    println!("--------------");
    let profitability = check_profitability(&assumptions, &scenario)?;
    println!(
        "  [{}] {:<26} slack Rs{:>10.0}",
        profitability.status_str(),
        profitability.constraint,
        profitability.slack
    );
    let series = projected_net_cash(&assumptions, &scenario)?;
    let cash = check_cash_flow(&series, assumptions.costs.cash_floor)?;
    println!(
        "  [{}] {:<26} slack Rs{:>10.0}",
        cash.status_str(),
        cash.constraint,
        cash.slack
    );

    // Plan choice checks
    println!("\nPlan Choice");
    println!("-----------");
    let ic = check_incentive_compatibility(&assumptions, scenario.expected_efficiency_score)?;
    let mh = check_moral_hazard(
        &assumptions,
        scenario.expected_efficiency_score,
        scenario.moral_hazard_tolerance,
    )?;
    println!(
        "  [{}] {:<26} slack Rs{:>10.2}",
        ic.result.status_str(),
        ic.result.constraint,
        ic.result.slack
    );
    println!(
        "  [{}] {:<26} slack Rs{:>10.2}",
        mh.result.status_str(),
        mh.result.constraint,
        mh.result.slack
    );
    for defection in ic.defections.iter().chain(&mh.defections) {
        println!(
            "    {} users would take {} instead of {} (Rs{:.0}/month cheaper)",
            defection.segment.as_str(),
            defection.preferred.as_str(),
            defection.intended.as_str(),
            defection.monthly_saving
        );
    }

    // Boundary searches
    println!("\nPricing Boundaries (moderate segment)");
    println!("-------------------------------------");
    let subsidy_bounds = SearchBounds::new(0.05, 0.90, 1e-4);
    match find_min_subsidy(&assumptions, &scenario, Segment::Moderate, subsidy_bounds)? {
        BoundaryOutcome::Converged(subsidy) => println!(
            "  Minimum subsidy for participation: {:.1}%",
            subsidy * 100.0
        ),
        BoundaryOutcome::ClampedLow(bound) => println!(
            "  Participation already satisfied at the {:.0}% search floor",
            bound * 100.0
        ),
        BoundaryOutcome::ClampedHigh(bound) => println!(
            "  Participation unreachable even at {:.0}% subsidy",
            bound * 100.0
        ),
    }
    let fee_bounds = SearchBounds::new(100.0, 2_000.0, 0.5);
    match find_max_standard_fee(&assumptions, &scenario, Segment::Moderate, fee_bounds)? {
        BoundaryOutcome::Converged(fee) => {
            println!("  Maximum standard-plan fee:         Rs{fee:.0}")
        }
        BoundaryOutcome::ClampedLow(bound) => println!(
            "  Fee headroom extends past the Rs{bound:.0} search ceiling"
        ),
        BoundaryOutcome::ClampedHigh(bound) => println!(
            "  No fee down to Rs{bound:.0} satisfies participation"
        ),
    }

    // Subsidy sensitivity sweep
    println!("\nSubsidy Sensitivity (moderate segment)");
    println!("--------------------------------------");
    println!("  {:>8} {:>10} {:>8}", "subsidy", "slack", "status");
    for subsidy in [0.30, 0.40, 0.50, 0.60, 0.70] {
        let trial = ScenarioParams {
            subsidy_percent: subsidy,
            ..scenario.clone()
        };
        let result = check_participation(&assumptions, &trial, Segment::Moderate)?;
        println!(
            "  {:>7.0}% {:>10.0} {:>8}",
            subsidy * 100.0,
            result.slack,
            result.status_str()
        );
    }

    Ok(())
}
