use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Rate out of range for {decade}s: {value} (expected 0.0..=1.0)")]
    RateOutOfRange { decade: i32, value: f64 },

    #[error("Invalid value for {decade}s: {value}")]
    InvalidValue { decade: i32, value: f64 },

    #[error("Invalid weight for name {name:?}: {weight}")]
    InvalidWeight { name: String, weight: f64 },

    #[error("Empty name in table")]
    EmptyName,

    #[error("Invalid rank for name {name:?}: {rank}")]
    InvalidRank { name: String, rank: u32 },

    #[error("{field} out of range: {value} (expected {min}..={max})")]
    ConfigOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
