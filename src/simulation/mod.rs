//! Population generation, portfolio simulation, and aggregation

mod aggregate;
mod population;
mod portfolio;
mod rng;

pub use aggregate::{
    by_month, monthly_flows, summarize, MonthAggregate, MonthlyFlows, PortfolioSummary,
    SegmentBreakdown,
};
pub use population::{generate_customers, Customer};
pub use portfolio::{simulate_portfolio, SimulationGrid, SimulationPortfolio, SimulatorConfig};
