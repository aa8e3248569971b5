use tracing::warn;

use super::error::ConfigError;
use super::jitter::JitterSource;
use super::ledger::{ProjectLedger, Resolution, jittered_duration};
use super::types::{
    AgingPolicy, MAX_ACTIVE_PROJECTS, MonthlyRecord, PathResult, ProjectEconomics,
    SimulationConfig,
};

#[derive(Debug)]
struct PathState {
    liquid_capital: f64,
    loan_balance: f64,
    cumulative_profit: f64,
    cumulative_transaction_cost: f64,
    cumulative_interest_cost: f64,
    previous_total_assets: f64,
}

impl PathState {
    fn new(starting_capital: f64) -> Self {
        Self {
            liquid_capital: starting_capital,
            loan_balance: 0.0,
            cumulative_profit: 0.0,
            cumulative_transaction_cost: 0.0,
            cumulative_interest_cost: 0.0,
            previous_total_assets: starting_capital,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MonthFlow {
    revenue: f64,
    started: u32,
    resolved: u32,
}

/// Runs one full monthly trajectory. The config is validated first; nothing runs if it is rejected.
pub fn simulate_single_path<J: JitterSource>(
    config: &SimulationConfig,
    jitter: &mut J,
) -> Result<PathResult, ConfigError> {
    config
        .validate()
        .inspect_err(|err| warn!(%err, "rejected simulation config"))?;
    Ok(simulate_path(config, jitter, None))
}

/// Assumes a validated config. When `resolutions` is given, every sale is appended to it.
pub(crate) fn simulate_path<J: JitterSource>(
    config: &SimulationConfig,
    jitter: &mut J,
    mut resolutions: Option<&mut Vec<Resolution>>,
) -> PathResult {
    let economics = ProjectEconomics::from_config(config);
    let monthly_rate = config.monthly_interest_rate();
    let mut state = PathState::new(config.starting_capital);
    let mut ledger = ProjectLedger::new();
    let mut months = Vec::with_capacity(config.total_months as usize);

    for month in 1..=config.total_months {
        let mut flow = MonthFlow::default();

        // Capital may go negative here; insolvency is not modelled.
        let interest = state.loan_balance * monthly_rate;
        state.liquid_capital -= interest;
        state.cumulative_interest_cost += interest;

        for project in ledger.take_completed() {
            let resolution = project.resolve(config, jitter);
            state.liquid_capital += resolution.cash_returned;
            state.loan_balance -= resolution.loan_repaid;
            state.cumulative_profit += resolution.profit_after_tax;
            state.cumulative_transaction_cost += resolution.sale_transaction_cost;
            flow.revenue += resolution.revenue;
            flow.resolved += 1;
            if let Some(out) = resolutions.as_deref_mut() {
                out.push(resolution);
            }
        }

        flow.started = start_projects(config, &economics, &mut ledger, &mut state, jitter);

        match config.aging {
            AgingPolicy::SameMonth => ledger.age_all(),
            AgingPolicy::FollowingMonth => {
                ledger.age_oldest(ledger.len() - flow.started as usize)
            }
        }

        months.push(record_month(month, &ledger, &mut state, flow));
    }

    PathResult { months }
}

/// Greedy reinvestment: opens projects until the next one's equity is unaffordable
/// or the ledger holds [`MAX_ACTIVE_PROJECTS`].
fn start_projects<J: JitterSource>(
    config: &SimulationConfig,
    economics: &ProjectEconomics,
    ledger: &mut ProjectLedger,
    state: &mut PathState,
    jitter: &mut J,
) -> u32 {
    if !economics.is_fundable() {
        return 0;
    }

    let room = MAX_ACTIVE_PROJECTS.saturating_sub(ledger.len());
    let mut started = 0;
    // Bounded by `room`: a huge balance minus one project's equity can round back to itself.
    while (started as usize) < room && state.liquid_capital >= economics.equity_needed {
        state.liquid_capital -= economics.equity_needed;
        state.loan_balance += economics.loan_taken;
        let duration = jittered_duration(config, jitter);
        ledger.open(economics, config.sell_price_per_area, duration);
        state.cumulative_transaction_cost += economics.purchase_transaction_cost;
        started += 1;
    }
    started
}

fn record_month(
    month: u32,
    ledger: &ProjectLedger,
    state: &mut PathState,
    flow: MonthFlow,
) -> MonthlyRecord {
    let locked_equity = ledger.locked_equity();
    let total_assets = state.liquid_capital + locked_equity;
    let net_gain = total_assets - state.previous_total_assets;
    state.previous_total_assets = total_assets;

    MonthlyRecord {
        month,
        liquid_capital: state.liquid_capital,
        locked_equity,
        total_assets,
        loan_balance: state.loan_balance,
        net_gain,
        cumulative_profit: state.cumulative_profit,
        cumulative_transaction_cost: state.cumulative_transaction_cost,
        cumulative_interest_cost: state.cumulative_interest_cost,
        revenue: flow.revenue,
        projects_started: flow.started,
        projects_resolved: flow.resolved,
        active_projects: ledger.len() as u32,
    }
}
