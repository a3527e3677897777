pub mod anneal;
pub mod exact;
pub mod runner;

pub use self::anneal::Replica;
pub use self::runner::ScheduleBackend;

use crate::config::SearchParams;
use crate::error::{MechOrderError, MoResult};
use crate::heuristic::transition_cost;
use crate::mapping::{IndexSpace, ReferenceSets};
use crate::permutation::Permutation;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Resource bounds for one solver invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveLimits {
    pub threads: usize,
    pub time_limit: Duration,
}

/// What a backend reports after its search.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Proven optimal assignment.
    Optimal(Permutation),
    /// One or more feasible assignments, optimality not proven.
    Feasible(Vec<Permutation>),
    /// No assignment found within the limits.
    Infeasible,
}

/// An optimization engine able to order indices by their reference sets.
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, sets: &ReferenceSets, limits: &SolveLimits) -> MoResult<SolveOutcome>;
}

/// Optimization capability, decided once at startup.
#[derive(Clone)]
pub enum Solver {
    Available(Arc<dyn Backend>),
    Unavailable,
}

impl Solver {
    /// The backend shipped with this crate.
    pub fn builtin(params: SearchParams) -> Self {
        Solver::Available(Arc::new(ScheduleBackend::new(params)))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Solver::Available(_))
    }
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::Available(b) => write!(f, "Available({})", b.name()),
            Solver::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// Wall-clock cutoff. `None` when the limit is too large to represent.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn after(limit: Duration) -> Self {
        Deadline(Instant::now().checked_add(limit))
    }

    pub fn reached(&self) -> bool {
        match self.0 {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}

/// Re-scores feasible candidates under the locality heuristic.
/// Ties go to the earliest candidate.
pub fn select_best(sets: &ReferenceSets, candidates: Vec<Permutation>) -> Option<Permutation> {
    let mut best: Option<(usize, Permutation)> = None;
    for candidate in candidates {
        let cost = transition_cost(sets, candidate.sequence());
        match &best {
            Some((best_cost, _)) if cost >= *best_cost => {}
            _ => best = Some((cost, candidate)),
        }
    }
    best.map(|(_, p)| p)
}

pub fn solve_order(
    solver: &Solver,
    space: IndexSpace,
    sets: &ReferenceSets,
    limits: &SolveLimits,
) -> MoResult<Permutation> {
    let backend = match solver {
        Solver::Available(b) => b,
        Solver::Unavailable => return Err(MechOrderError::SolverUnavailable),
    };

    info!(
        "Solving {} order: {} indices, {} threads, limit {:.0}s ({})",
        space,
        sets.len(),
        limits.threads,
        limits.time_limit.as_secs_f64(),
        backend.name()
    );

    let infeasible = || MechOrderError::Infeasible {
        space,
        time_limit_secs: limits.time_limit.as_secs_f64(),
    };

    let ordering = match backend.solve(sets, limits)? {
        SolveOutcome::Optimal(p) => {
            info!("{} order proven optimal", space);
            p
        }
        SolveOutcome::Feasible(solutions) => {
            let count = solutions.len();
            let best = select_best(sets, solutions).ok_or_else(infeasible)?;
            warn!(
                "{} order not proven optimal, best of {} feasible solutions kept",
                space, count
            );
            best
        }
        SolveOutcome::Infeasible => return Err(infeasible()),
    };

    if ordering.len() != sets.len() {
        return Err(MechOrderError::InvalidPermutation(format!(
            "backend returned {} positions for {} {} indices",
            ordering.len(),
            sets.len(),
            space
        )));
    }
    Ok(ordering)
}

pub fn solve_reaction_order(
    solver: &Solver,
    reaction_to_species: &ReferenceSets,
    limits: &SolveLimits,
) -> MoResult<Permutation> {
    solve_order(solver, IndexSpace::Reaction, reaction_to_species, limits)
}

pub fn solve_species_order(
    solver: &Solver,
    species_to_reaction: &ReferenceSets,
    limits: &SolveLimits,
) -> MoResult<Permutation> {
    solve_order(solver, IndexSpace::Species, species_to_reaction, limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(raw: &[&[usize]]) -> ReferenceSets {
        raw.iter().map(|s| s.iter().copied().collect()).collect()
    }

    #[test]
    fn select_best_prefers_lowest_then_first() {
        let s = sets(&[&[0], &[0, 1], &[2]]);
        let a = Permutation::from_sequence(vec![2, 0, 1]).unwrap(); // 1 + 1
        let b = Permutation::from_sequence(vec![0, 1, 2]).unwrap(); // 1 + 1
        let c = Permutation::from_sequence(vec![1, 0, 2]).unwrap(); // 0 + 1
        assert_eq!(select_best(&s, vec![a.clone(), b.clone()]), Some(a));
        assert_eq!(select_best(&s, vec![b, c.clone()]), Some(c));
        assert_eq!(select_best(&s, vec![]), None);
    }

    #[test]
    fn unavailable_solver_fails_fast() {
        let s = sets(&[&[0], &[1]]);
        let limits = SolveLimits {
            threads: 1,
            time_limit: Duration::from_secs(1),
        };
        let err = solve_reaction_order(&Solver::Unavailable, &s, &limits).unwrap_err();
        assert!(matches!(err, MechOrderError::SolverUnavailable));
    }
}
