use crate::heuristic::{identity_cost, transition_cost};
use crate::mapping::{IndexSpace, ReferenceSets};
use crate::permutation::Permutation;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum GateDecision {
    /// The solver's ordering is used.
    Adopted,
    /// The solver's ordering was worse; the original order is kept.
    Retained,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub ordering: Permutation,
    pub baseline_cost: usize,
    pub candidate_cost: usize,
    pub decision: GateDecision,
}

/// A candidate is adopted iff it is no worse than the baseline.
pub fn accept(baseline_cost: usize, candidate_cost: usize) -> bool {
    candidate_cost <= baseline_cost
}

pub fn gate_candidate(space: IndexSpace, sets: &ReferenceSets, candidate: Permutation) -> GateVerdict {
    let baseline_cost = identity_cost(sets);
    let candidate_cost = transition_cost(sets, candidate.sequence());

    info!(
        "{} cache locality heuristic changed from {} to {}",
        space, baseline_cost, candidate_cost
    );

    if accept(baseline_cost, candidate_cost) {
        info!("Using newly optimized {} order", space);
        GateVerdict {
            ordering: candidate,
            baseline_cost,
            candidate_cost,
            decision: GateDecision::Adopted,
        }
    } else {
        info!("Using original {} order", space);
        GateVerdict {
            ordering: Permutation::identity(sets.len()),
            baseline_cost,
            candidate_cost,
            decision: GateDecision::Retained,
        }
    }
}

impl GateVerdict {
    /// Cost of the ordering that was actually kept.
    pub fn final_cost(&self) -> usize {
        match self.decision {
            GateDecision::Adopted => self.candidate_cost,
            GateDecision::Retained => self.baseline_cost,
        }
    }
}
