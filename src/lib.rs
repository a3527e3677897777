pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod heuristic;
pub mod mapping;
pub mod mechanism;
pub mod orchestrator;
pub mod permutation;
pub mod solver;
// cmd and reports are modules of the binary crate (main.rs).
