use crate::cache::{self, Checkpoint, CheckpointStore, EvaluationOrders};
use crate::config::OptimizerConfig;
use crate::error::{MechOrderError, MoResult};
use crate::gate::{gate_candidate, GateVerdict};
use crate::mapping::{build_mappings, IndexSpace, MappingOptions};
use crate::mechanism::{Mechanism, Reaction, Species};
use crate::permutation::Permutation;
use crate::solver::{solve_reaction_order, solve_species_order, Solver};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use strum_macros::Display;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    Disabled,
    CheckCache,
    CacheHit,
    CacheMiss,
    BuildMappings,
    SolveReactions,
    GateReactions,
    SolveSpecies,
    GateSpecies,
    Persist,
}

/// Mechanism reordered for code generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedMechanism {
    pub species: Vec<Species>,
    pub reactions: Vec<Reaction>,
    pub eval_orders: EvaluationOrders,
    /// For each new position, the original species index placed there.
    pub species_order: Vec<usize>,
    /// For each new position, the original reaction index placed there.
    pub reaction_order: Vec<usize>,
    pub reaction_gate: Option<GateVerdict>,
    pub species_gate: Option<GateVerdict>,
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No optimization performed; identity orderings apply.
    Disabled,
    Optimized(OptimizedMechanism),
}

pub struct Orchestrator<S: CheckpointStore> {
    solver: Solver,
    store: S,
    config: OptimizerConfig,
}

fn enter(stage: Stage) {
    debug!("Stage: {}", stage);
}

impl<S: CheckpointStore> Orchestrator<S> {
    pub fn new(solver: Solver, store: S, config: OptimizerConfig) -> Self {
        Self {
            solver,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn optimize(
        &self,
        mechanism: &Mechanism,
        eval_orders: EvaluationOrders,
        build_path: &Path,
    ) -> MoResult<Outcome> {
        if !self.solver.is_available() {
            enter(Stage::Disabled);
            info!("Cache-optimization disabled, returning original mechanism");
            return Ok(Outcome::Disabled);
        }
        self.config.validate()?;

        info!(
            "Optimizing {} species / {} reactions for {} (jacobian unroll {})",
            mechanism.species.len(),
            mechanism.reactions.len(),
            self.config.language,
            self.config.language.jacobian_unroll()
        );

        if self.config.force_optimize {
            info!("Forced re-optimization, ignoring any checkpoint");
        } else {
            enter(Stage::CheckCache);
            match cache::lookup(&self.store, build_path, mechanism) {
                Ok(checkpoint) => {
                    enter(Stage::CacheHit);
                    info!("Reusing optimized ordering from checkpoint");
                    return self.from_checkpoint(checkpoint, eval_orders).map(Outcome::Optimized);
                }
                Err(_) => enter(Stage::CacheMiss),
            }
        }

        let started = Instant::now();
        enter(Stage::BuildMappings);
        let mappings = build_mappings(
            &mechanism.species,
            &mechanism.reactions,
            MappingOptions::for_reordering(),
        );
        let limits = self.config.limits();

        enter(Stage::SolveReactions);
        let candidate = match self.absorb(
            IndexSpace::Reaction,
            solve_reaction_order(&self.solver, &mappings.reaction_to_species, &limits),
        )? {
            Some(p) => p,
            None => return Ok(Outcome::Disabled),
        };
        enter(Stage::GateReactions);
        let reaction_gate =
            gate_candidate(IndexSpace::Reaction, &mappings.reaction_to_species, candidate);

        enter(Stage::SolveSpecies);
        let candidate = match self.absorb(
            IndexSpace::Species,
            solve_species_order(&self.solver, &mappings.species_to_reaction, &limits),
        )? {
            Some(p) => p,
            None => return Ok(Outcome::Disabled),
        };
        enter(Stage::GateSpecies);
        let species_gate =
            gate_candidate(IndexSpace::Species, &mappings.species_to_reaction, candidate);

        let species_perm = species_gate.ordering.clone();
        let reaction_perm = reaction_gate.ordering.clone();

        enter(Stage::Persist);
        let checkpoint = Checkpoint::new(
            mechanism,
            eval_orders.clone(),
            species_perm.clone(),
            reaction_perm.clone(),
        );
        if let Err(e) = self.store.save(build_path, &checkpoint) {
            warn!("Could not write checkpoint: {}", e);
        }

        info!("Optimization finished in {:.1}s", started.elapsed().as_secs_f32());

        Ok(Outcome::Optimized(OptimizedMechanism {
            species: species_perm.apply(&mechanism.species)?,
            reactions: reaction_perm.apply(&mechanism.reactions)?,
            eval_orders,
            species_order: species_perm.sequence().to_vec(),
            reaction_order: reaction_perm.sequence().to_vec(),
            reaction_gate: Some(reaction_gate),
            species_gate: Some(species_gate),
            from_cache: false,
        }))
    }

    /// Turns a missing backend into a soft failure; everything else propagates.
    fn absorb(
        &self,
        space: IndexSpace,
        result: MoResult<Permutation>,
    ) -> MoResult<Option<Permutation>> {
        match result {
            Ok(p) => Ok(Some(p)),
            Err(MechOrderError::SolverUnavailable) => {
                warn!(
                    "Optimization backend unavailable while solving {} order, keeping original mechanism",
                    space
                );
                Ok(None)
            }
            Err(e) => {
                error!("{} ordering failed: {}", space, e);
                Err(e)
            }
        }
    }

    fn from_checkpoint(
        &self,
        checkpoint: Checkpoint,
        eval_orders: EvaluationOrders,
    ) -> MoResult<OptimizedMechanism> {
        Ok(OptimizedMechanism {
            species: checkpoint.species_order.apply(&checkpoint.species)?,
            reactions: checkpoint.reaction_order.apply(&checkpoint.reactions)?,
            // Evaluation orders are always recomputed by the caller.
            eval_orders,
            species_order: checkpoint.species_order.sequence().to_vec(),
            reaction_order: checkpoint.reaction_order.sequence().to_vec(),
            reaction_gate: None,
            species_gate: None,
            from_cache: true,
        })
    }
}
