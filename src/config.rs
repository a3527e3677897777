use crate::error::{MechOrderError, MoResult};
use crate::solver::SolveLimits;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};

/// Jacobian unroll length used by the C kernels.
pub const C_JACOB_UNROLL: usize = 100;
/// Jacobian unroll length used by every other target.
pub const JACOB_UNROLL: usize = 40;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    C,
    Cuda,
    Fortran,
    Matlab,
}

impl Language {
    pub fn jacobian_unroll(&self) -> usize {
        match self {
            Language::C => C_JACOB_UNROLL,
            _ => JACOB_UNROLL,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[arg(long, default_value = "c")]
    pub language: Language,

    #[arg(short = 'j', long, default_value_t = default_threads())]
    pub threads: usize,

    /// Re-solve even when a matching checkpoint exists.
    #[arg(long, default_value_t = false)]
    pub force_optimize: bool,

    /// Applied per solver invocation.
    #[arg(long, default_value_t = 60.0)]
    pub time_limit_minutes: f64,

    #[command(flatten)]
    pub search: SearchParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 0.05)]
    pub temp_min: f32,
    #[arg(long, default_value_t = 20.0)]
    pub temp_max: f32,
    #[arg(long, default_value_t = 2_000)]
    pub search_epochs: usize,
    #[arg(long, default_value_t = 20_000)]
    pub search_steps: usize,
    #[arg(long, default_value_t = 200)]
    pub search_patience: usize,
    #[arg(long, default_value_t = 0.5)]
    pub search_patience_threshold: f32,
    /// Largest instance solved exhaustively (with proof of optimality).
    #[arg(long, default_value_t = 9)]
    pub exact_limit: usize,
    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            temp_min: 0.05,
            temp_max: 20.0,
            search_epochs: 2_000,
            search_steps: 20_000,
            search_patience: 200,
            search_patience_threshold: 0.5,
            exact_limit: 9,
            seed: None,
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            threads: default_threads(),
            force_optimize: false,
            time_limit_minutes: 60.0,
            search: SearchParams::default(),
        }
    }
}

impl OptimizerConfig {
    /// Saturates at `Duration::MAX` for limits too large to represent.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_minutes * 60.0).unwrap_or(Duration::MAX)
    }

    pub fn limits(&self) -> SolveLimits {
        SolveLimits {
            threads: self.threads,
            time_limit: self.time_limit(),
        }
    }

    pub fn validate(&self) -> MoResult<()> {
        if self.threads == 0 {
            return Err(MechOrderError::Config(
                "thread count must be positive".to_string(),
            ));
        }
        if !self.time_limit_minutes.is_finite() || self.time_limit_minutes <= 0.0 {
            return Err(MechOrderError::Config(format!(
                "time limit must be a positive number of minutes, got {}",
                self.time_limit_minutes
            )));
        }
        if self.search.temp_min <= 0.0 || self.search.temp_max < self.search.temp_min {
            return Err(MechOrderError::Config(format!(
                "invalid temperature range {}..{}",
                self.search.temp_min, self.search.temp_max
            )));
        }
        Ok(())
    }
}

impl SearchParams {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MoResult<Self> {
        let content = fs::read_to_string(path)?;
        let params = serde_json::from_str(&content)?;
        Ok(params)
    }
}
