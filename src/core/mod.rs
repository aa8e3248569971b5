mod aggregate;
mod engine;
mod error;
mod jitter;
mod ledger;
mod types;

#[cfg(test)]
mod test_support;

pub use aggregate::{MonteCarloRun, run_monte_carlo, run_monte_carlo_with_paths, summarize_paths};
pub use engine::simulate_single_path;
pub use error::ConfigError;
pub use jitter::{JitterSource, ScriptedJitter, UniformJitter};
pub use ledger::{Project, ProjectId, ProjectLedger, Resolution, jittered_duration};
pub use types::{
    AgingPolicy, MAX_ACTIVE_PROJECTS, Metric, MetricStats, MonthlyRecord, PathResult,
    ProjectEconomics, SimulationConfig, Statistic, SummaryRow, SummaryStatistics,
};
