use crate::reports;
use clap::Args;
use mechorder::cache::{EvaluationOrders, FileCheckpointStore};
use mechorder::config::{OptimizerConfig, SearchParams};
use mechorder::error::MoResult;
use mechorder::mechanism::Mechanism;
use mechorder::orchestrator::{Orchestrator, Outcome};
use mechorder::solver::Solver;
use std::path::Path;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub config: OptimizerConfig,

    /// JSON file with search parameters (replaces the CLI search flags).
    #[arg(long)]
    pub params: Option<String>,

    /// JSON file with the per-routine evaluation orders to pass through.
    #[arg(long)]
    pub eval_orders: Option<String>,

    /// Write the final orderings as CSV.
    #[arg(short, long)]
    pub export: Option<String>,

    /// Run without an optimization backend.
    #[arg(long, default_value_t = false)]
    pub no_solver: bool,
}

/// Evaluation orders used when the caller supplies none: natural order,
/// with only the pressure-dependent reactions in the pdep routine.
fn natural_eval_orders(mechanism: &Mechanism) -> EvaluationOrders {
    EvaluationOrders {
        rxn_rate: (0..mechanism.reactions.len()).collect(),
        pdep_rate: mechanism
            .reactions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_pressure_dependent())
            .map(|(i, _)| i)
            .collect(),
        spec_rate: (0..mechanism.species.len()).collect(),
    }
}

pub fn run(args: OptimizeArgs, mechanism: &Mechanism, build_dir: &Path) -> MoResult<()> {
    let mut config = args.config.clone();

    if let Some(path) = &args.params {
        info!("⚖️  Loading search parameters from: {}", path);
        let cli_seed = config.search.seed;
        config.search = SearchParams::load_from_file(path)?;
        if cli_seed.is_some() {
            config.search.seed = cli_seed;
        }
    }

    let eval_orders = match &args.eval_orders {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => natural_eval_orders(mechanism),
    };

    let solver = if args.no_solver {
        Solver::Unavailable
    } else {
        Solver::builtin(config.search.clone())
    };

    let orchestrator = Orchestrator::new(solver, FileCheckpointStore, config);
    let outcome = orchestrator.optimize(mechanism, eval_orders, build_dir)?;

    match outcome {
        Outcome::Disabled => {
            warn!("⚠️  No optimization performed, original ordering retained.");
            println!("Result: original ordering");
        }
        Outcome::Optimized(result) => {
            reports::print_gate_report(&result);
            let species_names: Vec<String> =
                result.species.iter().map(|s| s.name.clone()).collect();
            let reaction_names: Vec<String> =
                result.reactions.iter().map(|r| r.equation()).collect();
            reports::print_ordering("Species", &result.species_order, &species_names);
            reports::print_ordering("Reactions", &result.reaction_order, &reaction_names);
            println!(
                "Result: {}",
                if result.from_cache {
                    "checkpoint"
                } else {
                    "optimized"
                }
            );

            if let Some(path) = &args.export {
                reports::export_orderings(path, &result)?;
                info!("💾 Orderings written to {}", path);
            }
        }
    }
    Ok(())
}
