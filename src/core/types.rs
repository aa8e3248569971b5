use serde::Serialize;

use super::error::ConfigError;

/// When a freshly started project receives its first one-month decrement.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgingPolicy {
    /// Projects are aged in the month they start, so a duration-d project
    /// started in month m resolves in month m+d.
    #[default]
    SameMonth,
    /// Projects skip the decrement of their start month and resolve in month m+d+1.
    FollowingMonth,
}

/// All ratios are fractions (0.29 means 29%), not percents.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub starting_capital: f64,
    pub buy_price_per_area: f64,
    pub sell_price_per_area: f64,
    pub area_per_project: f64,
    pub renovation_cost_per_area: f64,
    pub project_duration_months: u32,
    pub financing_ratio: f64,
    pub annual_interest_rate: f64,
    pub tax_rate: f64,
    pub holding_fee_total: f64,
    pub land_transfer_tax_rate: f64,
    pub notary_fee_rate: f64,
    pub buyer_agent_fee_rate: f64,
    pub seller_agent_fee_rate: f64,
    pub duration_jitter_ratio: f64,
    pub sale_price_jitter_ratio: f64,
    pub total_months: u32,
    pub num_simulations: u32,
    pub seed: u64,
    pub aging: AgingPolicy,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let numeric = [
            ("starting_capital", self.starting_capital),
            ("buy_price_per_area", self.buy_price_per_area),
            ("sell_price_per_area", self.sell_price_per_area),
            ("area_per_project", self.area_per_project),
            ("renovation_cost_per_area", self.renovation_cost_per_area),
            ("financing_ratio", self.financing_ratio),
            ("annual_interest_rate", self.annual_interest_rate),
            ("tax_rate", self.tax_rate),
            ("holding_fee_total", self.holding_fee_total),
            ("land_transfer_tax_rate", self.land_transfer_tax_rate),
            ("notary_fee_rate", self.notary_fee_rate),
            ("buyer_agent_fee_rate", self.buyer_agent_fee_rate),
            ("seller_agent_fee_rate", self.seller_agent_fee_rate),
            ("duration_jitter_ratio", self.duration_jitter_ratio),
            ("sale_price_jitter_ratio", self.sale_price_jitter_ratio),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        for (field, value) in [
            ("area_per_project", self.area_per_project),
            ("buy_price_per_area", self.buy_price_per_area),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.project_duration_months == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.total_months == 0 {
            return Err(ConfigError::ZeroMonths);
        }
        if self.num_simulations == 0 {
            return Err(ConfigError::ZeroSimulations);
        }

        for (field, value) in [
            ("financing_ratio", self.financing_ratio),
            ("tax_rate", self.tax_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutsideUnitRange { field, value });
            }
        }

        for (field, value) in [
            ("starting_capital", self.starting_capital),
            ("sell_price_per_area", self.sell_price_per_area),
            ("renovation_cost_per_area", self.renovation_cost_per_area),
            ("annual_interest_rate", self.annual_interest_rate),
            ("holding_fee_total", self.holding_fee_total),
            ("land_transfer_tax_rate", self.land_transfer_tax_rate),
            ("notary_fee_rate", self.notary_fee_rate),
            ("buyer_agent_fee_rate", self.buyer_agent_fee_rate),
            ("seller_agent_fee_rate", self.seller_agent_fee_rate),
            ("duration_jitter_ratio", self.duration_jitter_ratio),
            ("sale_price_jitter_ratio", self.sale_price_jitter_ratio),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let economics = ProjectEconomics::from_config(self);
        if economics.is_fundable() {
            let affordable = (self.starting_capital / economics.equity_needed).floor();
            if affordable > MAX_ACTIVE_PROJECTS as f64 {
                return Err(ConfigError::TooManyProjects {
                    affordable,
                    limit: MAX_ACTIVE_PROJECTS,
                });
            }
        }

        Ok(())
    }

    pub fn monthly_interest_rate(&self) -> f64 {
        self.annual_interest_rate / 12.0
    }

    /// Combined purchase-side fee rate applied to the buy value.
    pub fn purchase_fee_rate(&self) -> f64 {
        self.land_transfer_tax_rate + self.notary_fee_rate + self.buyer_agent_fee_rate
    }
}

/// Upper bound on concurrently active projects in one path. Reinvestment stops
/// at this many even when more equity is available.
pub const MAX_ACTIVE_PROJECTS: usize = 10_000;

/// Per-project cost and financing split implied by a config, before any jitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEconomics {
    pub buy_value: f64,
    pub renovation_cost: f64,
    pub purchase_transaction_cost: f64,
    pub holding_fee_total: f64,
    pub total_upfront_cost: f64,
    pub loan_taken: f64,
    pub equity_needed: f64,
    pub base_revenue: f64,
    pub gross_margin_pct: f64,
}

impl ProjectEconomics {
    pub fn from_config(config: &SimulationConfig) -> Self {
        let buy_value = config.buy_price_per_area * config.area_per_project;
        let renovation_cost = config.renovation_cost_per_area * config.area_per_project;
        let purchase_transaction_cost = buy_value * config.purchase_fee_rate();
        let total_upfront_cost =
            buy_value + renovation_cost + purchase_transaction_cost + config.holding_fee_total;
        let loan_taken = total_upfront_cost * config.financing_ratio;
        let equity_needed = total_upfront_cost - loan_taken;
        let base_revenue = config.sell_price_per_area * config.area_per_project;
        let gross_margin_pct = if buy_value > 0.0 {
            (base_revenue - buy_value) / buy_value * 100.0
        } else {
            0.0
        };

        Self {
            buy_value,
            renovation_cost,
            purchase_transaction_cost,
            holding_fee_total: config.holding_fee_total,
            total_upfront_cost,
            loan_taken,
            equity_needed,
            base_revenue,
            gross_margin_pct,
        }
    }

    /// False for degenerate configs where reinvestment would never stop.
    pub fn is_fundable(&self) -> bool {
        self.total_upfront_cost > 0.0 && self.equity_needed > 0.0
    }
}

/// One month of one path, taken after the month's projects were aged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: u32,
    pub liquid_capital: f64,
    pub locked_equity: f64,
    pub total_assets: f64,
    pub loan_balance: f64,
    pub net_gain: f64,
    pub cumulative_profit: f64,
    pub cumulative_transaction_cost: f64,
    pub cumulative_interest_cost: f64,
    pub revenue: f64,
    pub projects_started: u32,
    pub projects_resolved: u32,
    pub active_projects: u32,
}

impl MonthlyRecord {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalAssets => self.total_assets,
            Metric::CumulativeProfit => self.cumulative_profit,
            Metric::Revenue => self.revenue,
            Metric::CumulativeTransactionCost => self.cumulative_transaction_cost,
            Metric::CumulativeInterestCost => self.cumulative_interest_cost,
            Metric::ActiveProjects => self.active_projects as f64,
            Metric::NetGain => self.net_gain,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathResult {
    pub months: Vec<MonthlyRecord>,
}

impl PathResult {
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// `month` is 1-based.
    pub fn month(&self, month: u32) -> Option<&MonthlyRecord> {
        let idx = (month as usize).checked_sub(1)?;
        self.months.get(idx)
    }

    pub fn last(&self) -> Option<&MonthlyRecord> {
        self.months.last()
    }
}

/// Metrics reduced across paths; order here is the column-group order of the summary table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Metric {
    TotalAssets,
    CumulativeProfit,
    Revenue,
    CumulativeTransactionCost,
    CumulativeInterestCost,
    ActiveProjects,
    NetGain,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::TotalAssets,
        Metric::CumulativeProfit,
        Metric::Revenue,
        Metric::CumulativeTransactionCost,
        Metric::CumulativeInterestCost,
        Metric::ActiveProjects,
        Metric::NetGain,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::TotalAssets => "total_assets",
            Metric::CumulativeProfit => "cumulative_profit",
            Metric::Revenue => "revenue",
            Metric::CumulativeTransactionCost => "cumulative_transaction_cost",
            Metric::CumulativeInterestCost => "cumulative_interest_cost",
            Metric::ActiveProjects => "active_projects",
            Metric::NetGain => "net_gain",
        }
    }

    fn index(self) -> usize {
        match self {
            Metric::TotalAssets => 0,
            Metric::CumulativeProfit => 1,
            Metric::Revenue => 2,
            Metric::CumulativeTransactionCost => 3,
            Metric::CumulativeInterestCost => 4,
            Metric::ActiveProjects => 5,
            Metric::NetGain => 6,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Statistic {
    Mean,
    Std,
    Min,
    P25,
    P50,
    P75,
    Max,
}

impl Statistic {
    pub const ALL: [Statistic; 7] = [
        Statistic::Mean,
        Statistic::Std,
        Statistic::Min,
        Statistic::P25,
        Statistic::P50,
        Statistic::P75,
        Statistic::Max,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Std => "std",
            Statistic::Min => "min",
            Statistic::P25 => "p25",
            Statistic::P50 => "p50",
            Statistic::P75 => "p75",
            Statistic::Max => "max",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl MetricStats {
    pub fn get(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Mean => self.mean,
            Statistic::Std => self.std,
            Statistic::Min => self.min,
            Statistic::P25 => self.p25,
            Statistic::P50 => self.p50,
            Statistic::P75 => self.p75,
            Statistic::Max => self.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub month: u32,
    pub total_assets: MetricStats,
    pub cumulative_profit: MetricStats,
    pub revenue: MetricStats,
    pub cumulative_transaction_cost: MetricStats,
    pub cumulative_interest_cost: MetricStats,
    pub active_projects: MetricStats,
    pub net_gain: MetricStats,
}

impl SummaryRow {
    pub(crate) fn from_stats(month: u32, stats: [MetricStats; 7]) -> Self {
        let by = |metric: Metric| stats[metric.index()];
        Self {
            month,
            total_assets: by(Metric::TotalAssets),
            cumulative_profit: by(Metric::CumulativeProfit),
            revenue: by(Metric::Revenue),
            cumulative_transaction_cost: by(Metric::CumulativeTransactionCost),
            cumulative_interest_cost: by(Metric::CumulativeInterestCost),
            active_projects: by(Metric::ActiveProjects),
            net_gain: by(Metric::NetGain),
        }
    }

    pub fn metric(&self, metric: Metric) -> &MetricStats {
        match metric {
            Metric::TotalAssets => &self.total_assets,
            Metric::CumulativeProfit => &self.cumulative_profit,
            Metric::Revenue => &self.revenue,
            Metric::CumulativeTransactionCost => &self.cumulative_transaction_cost,
            Metric::CumulativeInterestCost => &self.cumulative_interest_cost,
            Metric::ActiveProjects => &self.active_projects,
            Metric::NetGain => &self.net_gain,
        }
    }

    /// Flat values in [`SummaryStatistics::column_names`] order.
    pub fn values(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(Metric::ALL.len() * Statistic::ALL.len());
        for metric in Metric::ALL {
            let stats = self.metric(metric);
            for statistic in Statistic::ALL {
                out.push(stats.get(statistic));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    pub num_paths: u32,
    pub rows: Vec<SummaryRow>,
}

impl SummaryStatistics {
    /// `<metric>_<statistic>` for every metric, statistics ordered mean, std, min, p25, p50, p75, max.
    pub fn column_names() -> Vec<String> {
        Metric::ALL
            .iter()
            .flat_map(|metric| {
                Statistic::ALL
                    .iter()
                    .map(move |statistic| format!("{}_{}", metric.key(), statistic.key()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `month` is 1-based.
    pub fn row(&self, month: u32) -> Option<&SummaryRow> {
        let idx = (month as usize).checked_sub(1)?;
        self.rows.get(idx)
    }

    pub fn final_row(&self) -> Option<&SummaryRow> {
        self.rows.last()
    }

    pub fn final_summary(&self) -> String {
        let Some(last) = self.final_row() else {
            return "No months simulated.".to_string();
        };
        format!(
            "After {} months, estimated final assets: {:.2} (std dev: {:.2}). Median final assets: {:.2}.",
            last.month, last.total_assets.mean, last.total_assets.std, last.total_assets.p50
        )
    }
}
