use super::{Deadline, SolveOutcome};
use crate::heuristic::TransitionMatrix;
use crate::permutation::Permutation;
use tracing::debug;

const DEADLINE_CHECK_INTERVAL: u64 = 256;

/// Depth-first branch-and-bound over positions.
///
/// A partial sequence is pruned once its cost plus the cheapest possible
/// entry into every unplaced index reaches the incumbent.
struct BranchAndBound<'a> {
    matrix: &'a TransitionMatrix,
    deadline: Deadline,
    min_in: Vec<u32>,
    path: Vec<usize>,
    used: Vec<bool>,
    best_cost: u64,
    incumbents: Vec<Vec<usize>>,
    nodes: u64,
    timed_out: bool,
}

impl<'a> BranchAndBound<'a> {
    fn new(matrix: &'a TransitionMatrix, deadline: Deadline) -> Self {
        let n = matrix.len();
        Self {
            matrix,
            deadline,
            min_in: matrix.min_incoming(),
            path: Vec::with_capacity(n),
            used: vec![false; n],
            best_cost: u64::MAX,
            incumbents: Vec::new(),
            nodes: 0,
            timed_out: false,
        }
    }

    fn search(&mut self, cost: u64, remaining_bound: u64) {
        if self.timed_out {
            return;
        }
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 && self.deadline.reached() {
            self.timed_out = true;
            return;
        }
        self.nodes += 1;

        let n = self.matrix.len();
        if self.path.len() == n {
            if cost < self.best_cost {
                self.best_cost = cost;
                self.incumbents.push(self.path.clone());
            }
            return;
        }

        // Cheapest step first, so good incumbents show up early.
        let mut candidates: Vec<(u32, usize)> = (0..n)
            .filter(|&v| !self.used[v])
            .map(|v| {
                let step = match self.path.last() {
                    Some(&last) => self.matrix.at(last, v),
                    None => 0,
                };
                (step, v)
            })
            .collect();
        candidates.sort_unstable();

        for (step, v) in candidates {
            let next_cost = cost + step as u64;
            let next_bound = remaining_bound - self.min_in[v] as u64;
            if next_cost + next_bound >= self.best_cost {
                continue;
            }

            self.used[v] = true;
            self.path.push(v);
            self.search(next_cost, next_bound);
            self.path.pop();
            self.used[v] = false;

            if self.timed_out {
                return;
            }
        }
    }
}

pub fn branch_and_bound(matrix: &TransitionMatrix, deadline: Deadline) -> SolveOutcome {
    let n = matrix.len();
    if n <= 1 {
        return SolveOutcome::Optimal(Permutation::identity(n));
    }

    let mut bnb = BranchAndBound::new(matrix, deadline);
    let total_bound: u64 = bnb.min_in.iter().map(|&c| c as u64).sum();
    bnb.search(0, total_bound);

    debug!(
        "Branch-and-bound visited {} nodes, {} incumbents, timed out: {}",
        bnb.nodes,
        bnb.incumbents.len(),
        bnb.timed_out
    );

    let mut solutions: Vec<Permutation> = bnb
        .incumbents
        .into_iter()
        .filter_map(|seq| Permutation::from_sequence(seq).ok())
        .collect();

    if !bnb.timed_out {
        match solutions.pop() {
            Some(best) => SolveOutcome::Optimal(best),
            None => SolveOutcome::Infeasible,
        }
    } else if solutions.is_empty() {
        SolveOutcome::Infeasible
    } else {
        // Latest incumbent is the best one found.
        solutions.reverse();
        SolveOutcome::Feasible(solutions)
    }
}
