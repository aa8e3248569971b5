use super::jitter::JitterSource;
use super::types::{ProjectEconomics, SimulationConfig};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub u64);

/// An active project. Everything except `remaining_duration` is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub remaining_duration: i64,
    pub equity_invested: f64,
    pub loan_taken: f64,
    pub buy_value: f64,
    pub renovation_cost: f64,
    pub purchase_transaction_cost: f64,
    pub holding_fee_total: f64,
    pub base_sale_price: f64,
}

/// Outcome of selling one completed project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub id: ProjectId,
    pub revenue: f64,
    pub sale_transaction_cost: f64,
    pub profit_before_tax: f64,
    pub tax: f64,
    pub profit_after_tax: f64,
    /// Equity returned plus after-tax profit; what flows back into liquid capital.
    pub cash_returned: f64,
    pub loan_repaid: f64,
}

impl Project {
    /// Realizes the sale with one jitter draw on the per-area sale price.
    pub fn resolve<J: JitterSource>(
        &self,
        config: &SimulationConfig,
        jitter: &mut J,
    ) -> Resolution {
        let price_jitter = jitter.sample(config.sale_price_jitter_ratio);
        let realized_sale_price = self.base_sale_price * (1.0 + price_jitter);
        let revenue = realized_sale_price * config.area_per_project;
        let sale_transaction_cost = revenue * config.seller_agent_fee_rate;
        let profit_before_tax = revenue
            - self.buy_value
            - self.renovation_cost
            - self.purchase_transaction_cost
            - sale_transaction_cost
            - self.holding_fee_total;
        // Losses are neither taxed nor refunded.
        let tax = (profit_before_tax * config.tax_rate).max(0.0);
        let profit_after_tax = profit_before_tax - tax;

        Resolution {
            id: self.id,
            revenue,
            sale_transaction_cost,
            profit_before_tax,
            tax,
            profit_after_tax,
            cash_returned: self.equity_invested + profit_after_tax,
            loan_repaid: self.loan_taken,
        }
    }
}

/// Initial remaining duration for a new project: `max(1, round(target * (1 + jitter)))`.
pub fn jittered_duration<J: JitterSource>(config: &SimulationConfig, jitter: &mut J) -> i64 {
    let draw = jitter.sample(config.duration_jitter_ratio);
    let months = (config.project_duration_months as f64 * (1.0 + draw)).round() as i64;
    months.max(1)
}

/// Active projects of one path, in start order.
#[derive(Debug, Default)]
pub struct ProjectLedger {
    projects: Vec<Project>,
    next_id: u64,
}

impl ProjectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &mut self,
        economics: &ProjectEconomics,
        base_sale_price: f64,
        duration: i64,
    ) -> ProjectId {
        let id = ProjectId(self.next_id);
        self.next_id += 1;
        self.projects.push(Project {
            id,
            remaining_duration: duration,
            equity_invested: economics.equity_needed,
            loan_taken: economics.loan_taken,
            buy_value: economics.buy_value,
            renovation_cost: economics.renovation_cost,
            purchase_transaction_cost: economics.purchase_transaction_cost,
            holding_fee_total: economics.holding_fee_total,
            base_sale_price,
        });
        id
    }

    /// Removes and returns every project whose remaining duration reached zero.
    pub fn take_completed(&mut self) -> Vec<Project> {
        let (completed, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.projects)
            .into_iter()
            .partition(|p| p.remaining_duration <= 0);
        self.projects = active;
        completed
    }

    pub fn age_all(&mut self) {
        self.age_oldest(self.projects.len());
    }

    /// Decrements only the `count` earliest-started projects.
    pub fn age_oldest(&mut self, count: usize) {
        for project in self.projects.iter_mut().take(count) {
            project.remaining_duration -= 1;
        }
    }

    pub fn locked_equity(&self) -> f64 {
        self.projects.iter().map(|p| p.equity_invested).sum()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }
}
