use crate::mapping::IndexSpace;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MechOrderError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Invalid Permutation: {0}")]
    InvalidPermutation(String),

    #[error("No optimization backend available")]
    SolverUnavailable,

    #[error(
        "No feasible {space} ordering found within {time_limit_secs:.0}s, try a longer time limit"
    )]
    Infeasible {
        space: IndexSpace,
        time_limit_secs: f64,
    },

    #[error("Thread Pool Error: {0}")]
    ThreadPool(String),
}

pub type MoResult<T> = Result<T, MechOrderError>;
