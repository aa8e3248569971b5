use super::types::{AgingPolicy, SimulationConfig};

pub(crate) fn sample_config() -> SimulationConfig {
    SimulationConfig {
        starting_capital: 60.0,
        buy_price_per_area: 1.5,
        sell_price_per_area: 2.0,
        area_per_project: 100.0,
        renovation_cost_per_area: 0.2,
        project_duration_months: 9,
        financing_ratio: 0.9,
        annual_interest_rate: 0.05,
        tax_rate: 0.29,
        holding_fee_total: 1.5,
        land_transfer_tax_rate: 0.02,
        notary_fee_rate: 0.01,
        buyer_agent_fee_rate: 0.02,
        seller_agent_fee_rate: 0.03,
        duration_jitter_ratio: 0.2,
        sale_price_jitter_ratio: 0.1,
        total_months: 60,
        num_simulations: 50,
        seed: 42,
        aging: AgingPolicy::SameMonth,
    }
}

/// No fees, no jitter, one path over nine months.
pub(crate) fn deterministic_config() -> SimulationConfig {
    SimulationConfig {
        renovation_cost_per_area: 0.0,
        tax_rate: 0.29125,
        holding_fee_total: 0.0,
        land_transfer_tax_rate: 0.0,
        notary_fee_rate: 0.0,
        buyer_agent_fee_rate: 0.0,
        seller_agent_fee_rate: 0.0,
        duration_jitter_ratio: 0.0,
        sale_price_jitter_ratio: 0.0,
        total_months: 9,
        num_simulations: 1,
        ..sample_config()
    }
}
