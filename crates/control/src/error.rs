use thiserror::Error;

/// Invalid controller configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("gain {name} must be finite, got {value}")]
    NonFiniteGain { name: &'static str, value: f64 },

    #[error("error range must be finite and non-negative, got {0}")]
    InvalidErrorRange(f64),

    #[error("integral limit must be positive, got {0}")]
    InvalidIntegralLimit(f64),

    #[error("settle sample count must be at least 1")]
    ZeroSettleSamples,

    #[error("sample period must be at least 1 ms")]
    ZeroSamplePeriod,

    #[error("acceleration limit must be positive, got {0}")]
    InvalidAcceleration(f64),
}
