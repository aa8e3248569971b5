#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

use super::engine::simulate_path;
use super::error::ConfigError;
use super::jitter::UniformJitter;
use super::types::{
    Metric, MetricStats, PathResult, SimulationConfig, SummaryRow, SummaryStatistics,
};

/// Summary plus every simulated path, in path-index order.
#[derive(Debug, Clone)]
pub struct MonteCarloRun {
    pub summary: SummaryStatistics,
    pub paths: Vec<PathResult>,
}

/// Runs `num_simulations` independent paths and reduces them month by month.
pub fn run_monte_carlo(config: &SimulationConfig) -> Result<SummaryStatistics, ConfigError> {
    config
        .validate()
        .inspect_err(|err| warn!(%err, "rejected simulation config"))?;
    info!(
        paths = config.num_simulations,
        months = config.total_months,
        "starting monte carlo run"
    );

    let mut acc = MonthlyAccumulator::new(
        config.total_months as usize,
        config.num_simulations as usize,
    );
    for_each_path(config, |path| acc.push(&path));
    let summary = acc.into_summary();

    info!(paths = summary.num_paths, "monte carlo run complete");
    Ok(summary)
}

/// Like [`run_monte_carlo`] but keeps the raw per-path records.
pub fn run_monte_carlo_with_paths(
    config: &SimulationConfig,
) -> Result<MonteCarloRun, ConfigError> {
    config
        .validate()
        .inspect_err(|err| warn!(%err, "rejected simulation config"))?;
    info!(
        paths = config.num_simulations,
        months = config.total_months,
        "starting monte carlo run"
    );

    let mut paths = Vec::with_capacity(config.num_simulations as usize);
    for_each_path(config, |path| paths.push(path));
    let summary = summarize_paths(&paths);

    info!(paths = summary.num_paths, "monte carlo run complete");
    Ok(MonteCarloRun { summary, paths })
}

/// Reduces already simulated paths. Months a shorter path lacks are left out of that month's sample.
pub fn summarize_paths(paths: &[PathResult]) -> SummaryStatistics {
    let months = paths.iter().map(PathResult::len).max().unwrap_or(0);
    let mut acc = MonthlyAccumulator::new(months, paths.len());
    for path in paths {
        acc.push(path);
    }
    acc.into_summary()
}

/// Each path gets its own generator, so the sink sees the same paths in the same
/// order whether or not they were computed in parallel. Progress is logged as
/// paths finish, before the sink runs.
fn for_each_path<F: FnMut(PathResult)>(config: &SimulationConfig, mut sink: F) {
    let total = config.num_simulations;
    let report = |done: u32| {
        if is_progress_step(done, total) {
            debug!(done, total, "simulated paths");
        }
    };

    #[cfg(feature = "parallel")]
    {
        let finished = AtomicU32::new(0);
        let paths: Vec<PathResult> = (0..total)
            .into_par_iter()
            .map(|path_index| {
                let path = simulate_indexed_path(config, path_index);
                report(finished.fetch_add(1, Ordering::Relaxed) + 1);
                path
            })
            .collect();
        for path in paths {
            sink(path);
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        for path_index in 0..total {
            sink(simulate_indexed_path(config, path_index));
            report(path_index + 1);
        }
    }
}

/// Every 100 paths, or every 10 for runs under 100, plus the last one.
fn is_progress_step(done: u32, total: u32) -> bool {
    let every = if total < 100 { 10 } else { 100 };
    done % every == 0 || done == total
}

fn simulate_indexed_path(config: &SimulationConfig, path_index: u32) -> PathResult {
    let mut jitter = UniformJitter::for_path(config.seed, path_index);
    simulate_path(config, &mut jitter, None)
}

struct MonthlyAccumulator {
    paths: usize,
    // [metric][month] -> one value per path
    values: Vec<Vec<Vec<f64>>>,
}

impl MonthlyAccumulator {
    fn new(months: usize, expected_paths: usize) -> Self {
        let make = || {
            (0..months)
                .map(|_| Vec::with_capacity(expected_paths))
                .collect::<Vec<_>>()
        };
        Self {
            paths: 0,
            values: Metric::ALL.iter().map(|_| make()).collect(),
        }
    }

    fn push(&mut self, path: &PathResult) {
        self.paths += 1;
        for (idx, record) in path.months.iter().enumerate() {
            for (slot, metric) in Metric::ALL.into_iter().enumerate() {
                if let Some(month) = self.values[slot].get_mut(idx) {
                    month.push(record.metric(metric));
                }
            }
        }
    }

    fn into_summary(mut self) -> SummaryStatistics {
        let months = self.values.first().map(Vec::len).unwrap_or(0);
        let mut rows = Vec::with_capacity(months);
        for idx in 0..months {
            let mut stats = [MetricStats::default(); 7];
            for (slot, per_month) in self.values.iter_mut().enumerate() {
                stats[slot] = reduce(&mut per_month[idx]);
            }
            rows.push(SummaryRow::from_stats(idx as u32 + 1, stats));
        }

        SummaryStatistics {
            num_paths: self.paths as u32,
            rows,
        }
    }
}

fn reduce(values: &mut [f64]) -> MetricStats {
    if values.is_empty() {
        return MetricStats::default();
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    let min = values[0];
    let max = values[n - 1];

    // Identical samples report their value and a zero spread exactly.
    let (mean, std) = if min == max {
        (min, 0.0)
    } else {
        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        (mean, variance.sqrt())
    };

    MetricStats {
        mean,
        std,
        min,
        p25: percentile(values, 25.0),
        p50: percentile(values, 50.0),
        p75: percentile(values, 75.0),
        max,
    }
}

/// Linear interpolation between order statistics. `sorted` must be ascending.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * w
    }
}
