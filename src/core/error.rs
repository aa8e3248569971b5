use thiserror::Error;

/// Reasons a [`SimulationConfig`](super::SimulationConfig) is rejected before any path runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("{field} must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be between 0 and 1 (got {value})")]
    OutsideUnitRange { field: &'static str, value: f64 },

    #[error("project duration must be at least one month")]
    ZeroDuration,

    #[error("total simulation months must be > 0")]
    ZeroMonths,

    #[error("number of simulations must be > 0")]
    ZeroSimulations,

    #[error("starting_capital funds {affordable} projects at once; at most {limit} can be active")]
    TooManyProjects { affordable: f64, limit: usize },
}

impl ConfigError {
    /// Field the rejection refers to, for callers that map errors back onto form inputs.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::NonFinite { field }
            | ConfigError::NonPositive { field, .. }
            | ConfigError::Negative { field, .. }
            | ConfigError::OutsideUnitRange { field, .. } => field,
            ConfigError::ZeroDuration => "project_duration_months",
            ConfigError::ZeroMonths => "total_months",
            ConfigError::ZeroSimulations => "num_simulations",
            ConfigError::TooManyProjects { .. } => "starting_capital",
        }
    }
}
