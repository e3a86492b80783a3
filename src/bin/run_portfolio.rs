//! Run a full portfolio simulation and check every constraint
//!
//! Outputs the portfolio summary to the console and the monthly aggregate
//! to CSV for downstream reporting.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use subscription_pricing::constraints::{
    check_cash_flow, check_incentive_compatibility, check_moral_hazard, check_participation,
    check_profitability, check_profitability_simulated, ConstraintResult,
};
use subscription_pricing::simulation::{
    by_month, generate_customers, monthly_flows, simulate_portfolio, SimulatorConfig,
};
use subscription_pricing::{Assumptions, ScenarioParams};
use subscription_pricing::assumptions::Segment;

#[derive(Parser)]
#[command(
    name = "run_portfolio",
    about = "Simulate the subscription portfolio and validate its economics"
)]
struct Args {
    /// Number of synthetic customers
    #[arg(long, default_value_t = 1_000)]
    customers: u32,

    /// Simulation tenure in months
    #[arg(long, default_value_t = 60)]
    tenure: u32,

    /// Master seed for population and simulation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output path for the by-month aggregate
    #[arg(long, default_value = "portfolio_by_month.csv")]
    output: PathBuf,

    /// Optional scenario overrides as JSON
    #[arg(long)]
    scenario: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    println!("Subscription Portfolio Simulation");
    println!("=================================");
    println!("Run started {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

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
    scenario.tenure_months = args.tenure;
    scenario.validate()?;

    println!(
        "Scenario: subsidy {:.0}%, tenure {} months, {} customers, seed {}",
        scenario.subsidy_percent * 100.0,
        scenario.tenure_months,
        args.customers,
        args.seed
    );

    let gen_start = Instant::now();
    let customers = generate_customers(
        args.customers,
        &assumptions,
        scenario.plan_mismatch_rate,
        args.seed,
    )?;
    println!(
        "Generated {} customers in {:?}",
        customers.len(),
        gen_start.elapsed()
    );

    let sim_start = Instant::now();
    let config = SimulatorConfig {
        seed: args.seed,
        ..Default::default()
    };
    let portfolio = simulate_portfolio(&customers, &assumptions, &scenario, &config)?;
    println!(
        "Simulated {} customer-months in {:?}\n",
        portfolio.grid.len(),
        sim_start.elapsed()
    );

    // Portfolio summary
    let summary = &portfolio.summary;
    println!("Portfolio Summary");
    println!("-----------------");
    println!("  Customers:              {}", summary.n_customers);
    println!("  Tenure:                 {} months", summary.tenure_months);
    println!("  Active customer-months: {}", summary.active_customer_months);
    println!("  Churned customers:      {}", summary.churned_customers);
    println!("  Total revenue (net):    Rs{:.0}", summary.total_revenue);
    println!("  Total cost:             Rs{:.0}", summary.total_cost);
    println!("  Gross margin:           Rs{:.0}", summary.gross_margin);
    match summary.breakeven_month {
        Some(month) => println!("  Breakeven month:        {month}"),
        None => println!("  Breakeven month:        not reached in tenure"),
    }
    println!("  Avg monthly bill:       Rs{:.2}", summary.avg_monthly_bill);
    println!("  Avg efficiency score:   {:.1}", summary.avg_efficiency_score);
    println!(
        "  Months over quota:      {:.1}%",
        summary.pct_months_over_quota * 100.0
    );

    println!("\n  Discount tier mix:");
    for (label, share) in &summary.tier_shares {
        println!("    {label:<10} {:>5.1}%", share * 100.0);
    }

    println!("\nSegment Breakdown");
    println!("-----------------");
    println!(
        "  {:<10} {:>6} {:>8} {:>14} {:>10} {:>8} {:>8}",
        "segment", "n", "churned", "revenue", "avg bill", "hours", "score"
    );
    for seg in &summary.per_segment {
        println!(
            "  {:<10} {:>6} {:>8} {:>14.0} {:>10.2} {:>8.1} {:>8.1}",
            seg.segment.as_str(),
            seg.n_customers,
            seg.churned,
            seg.total_revenue,
            seg.avg_monthly_bill,
            seg.avg_monthly_hours,
            seg.avg_efficiency_score
        );
    }

    // By-month CSV
    let months = by_month(&portfolio.grid, scenario.tenure_months);
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for row in &months {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nBy-month aggregate written to {}", args.output.display());

    // Constraint checks
    println!("\nConstraint Checks");
    println!("-----------------");
    let mut results: Vec<ConstraintResult> = Vec::new();
    for segment in [Segment::Light, Segment::Moderate, Segment::Heavy] {
        results.push(check_participation(&assumptions, &scenario, segment)?);
    }
    results.push(check_profitability(&assumptions, &scenario)?);

    let flows = monthly_flows(&portfolio.grid, &assumptions, &scenario, args.customers);
    results.push(check_profitability_simulated(
        &flows,
        &assumptions,
        args.customers,
    )?);
    let per_customer_net: Vec<f64> = flows
        .net()
        .iter()
        .map(|v| v / args.customers as f64)
        .collect();
    results.push(check_cash_flow(&per_customer_net, assumptions.costs.cash_floor)?);

    let ic = check_incentive_compatibility(&assumptions, scenario.expected_efficiency_score)?;
    let mh = check_moral_hazard(
        &assumptions,
        scenario.expected_efficiency_score,
        scenario.moral_hazard_tolerance,
    )?;

    for result in &results {
        println!(
            "  [{}] {:<28} slack {:>12.2}",
            result.status_str(),
            result.constraint,
            result.slack
        );
    }
    println!(
        "  [{}] {:<28} slack {:>12.2}",
        ic.result.status_str(),
        ic.result.constraint,
        ic.result.slack
    );
    println!(
        "  [{}] {:<28} slack {:>12.2}",
        mh.result.status_str(),
        mh.result.constraint,
        mh.result.slack
    );

    for defection in ic.defections.iter().chain(&mh.defections) {
        println!(
            "    defection: {} users prefer {} over {} (saves Rs{:.0}/month)",
            defection.segment.as_str(),
            defection.preferred.as_str(),
            defection.intended.as_str(),
            defection.monthly_saving
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
