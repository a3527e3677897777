mod common;

use common::h2_mechanism;
use mechorder::config::SearchParams;
use mechorder::error::{MechOrderError, MoResult};
use mechorder::heuristic::{identity_cost, transition_cost};
use mechorder::mapping::{build_mappings, IndexSpace, MappingOptions, ReferenceSets};
use mechorder::permutation::Permutation;
use mechorder::solver::{
    solve_order, solve_reaction_order, solve_species_order, Backend, SolveLimits, SolveOutcome,
    Solver,
};
use std::sync::Arc;
use std::time::Duration;

/// Returns a fixed outcome regardless of input.
struct FixedBackend(SolveOutcome);

impl Backend for FixedBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    fn solve(&self, _sets: &ReferenceSets, _limits: &SolveLimits) -> MoResult<SolveOutcome> {
        Ok(self.0.clone())
    }
}

fn limits() -> SolveLimits {
    SolveLimits {
        threads: 2,
        time_limit: Duration::from_secs(5),
    }
}

fn chain_sets() -> ReferenceSets {
    // 0 and 2 overlap completely, 1 is disjoint from both.
    vec![[0, 1].into(), [5, 6].into(), [0, 1].into()]
}

fn perm(seq: &[usize]) -> Permutation {
    Permutation::from_sequence(seq.to_vec()).unwrap()
}

#[test]
fn test_optimal_is_passed_through() {
    let solver = Solver::Available(Arc::new(FixedBackend(SolveOutcome::Optimal(perm(&[2, 0, 1])))));
    let p = solve_reaction_order(&solver, &chain_sets(), &limits()).unwrap();
    assert_eq!(p.sequence(), &[2, 0, 1]);
}

#[test]
fn test_feasible_candidates_are_rescored() {
    let sets = chain_sets();
    let worse = perm(&[0, 1, 2]); // 2 + 2
    let better = perm(&[0, 2, 1]); // 0 + 2
    assert!(transition_cost(&sets, better.sequence()) < transition_cost(&sets, worse.sequence()));

    let solver = Solver::Available(Arc::new(FixedBackend(SolveOutcome::Feasible(vec![
        worse,
        better.clone(),
    ]))));
    let p = solve_species_order(&solver, &sets, &limits()).unwrap();
    assert_eq!(p, better);
}

#[test]
fn test_infeasible_reports_time_limit() {
    let solver = Solver::Available(Arc::new(FixedBackend(SolveOutcome::Infeasible)));
    let err = solve_order(&solver, IndexSpace::Species, &chain_sets(), &limits()).unwrap_err();

    match &err {
        MechOrderError::Infeasible {
            space,
            time_limit_secs,
        } => {
            assert_eq!(*space, IndexSpace::Species);
            assert_eq!(*time_limit_secs, 5.0);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let msg = err.to_string();
    assert!(msg.contains("species"));
    assert!(msg.contains("5s"));
}

#[test]
fn test_empty_feasible_set_is_infeasible() {
    let solver = Solver::Available(Arc::new(FixedBackend(SolveOutcome::Feasible(vec![]))));
    let err = solve_reaction_order(&solver, &chain_sets(), &limits()).unwrap_err();
    assert!(matches!(err, MechOrderError::Infeasible { .. }));
}

#[test]
fn test_wrong_length_is_rejected() {
    let solver = Solver::Available(Arc::new(FixedBackend(SolveOutcome::Optimal(perm(&[1, 0])))));
    let err = solve_reaction_order(&solver, &chain_sets(), &limits()).unwrap_err();
    assert!(matches!(err, MechOrderError::InvalidPermutation(_)));
}

#[test]
fn test_unavailable_solver() {
    let err = solve_reaction_order(&Solver::Unavailable, &chain_sets(), &limits()).unwrap_err();
    assert!(matches!(err, MechOrderError::SolverUnavailable));
    assert!(!Solver::Unavailable.is_available());
}

#[test]
fn test_builtin_backend_beats_identity_on_h2() {
    let mech = h2_mechanism();
    let m = build_mappings(&mech.species, &mech.reactions, MappingOptions::for_reordering());
    let solver = Solver::builtin(SearchParams {
        seed: Some(7),
        search_epochs: 50,
        search_steps: 2_000,
        ..Default::default()
    });
    assert!(solver.is_available());

    for space in [IndexSpace::Reaction, IndexSpace::Species] {
        let sets = m.sets(space);
        let p = solve_order(&solver, space, sets, &limits()).unwrap();
        assert_eq!(p.len(), sets.len());
        assert!(transition_cost(sets, p.sequence()) <= identity_cost(sets));
    }
}

#[test]
fn test_builtin_backend_handles_trivial_sizes() {
    let solver = Solver::builtin(SearchParams::default());
    let empty: ReferenceSets = vec![];
    let p = solve_reaction_order(&solver, &empty, &limits()).unwrap();
    assert!(p.is_empty());

    let single: ReferenceSets = vec![[3].into()];
    let p = solve_reaction_order(&solver, &single, &limits()).unwrap();
    assert_eq!(p.sequence(), &[0]);
}
