use super::anneal::{greedy_order, Replica};
use super::exact::branch_and_bound;
use super::{Backend, Deadline, SolveLimits, SolveOutcome};
use crate::config::SearchParams;
use crate::error::{MechOrderError, MoResult};
use crate::heuristic::TransitionMatrix;
use crate::mapping::ReferenceSets;
use crate::permutation::Permutation;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Built-in backend: exhaustive branch-and-bound for small instances,
/// parallel tempering for everything else.
pub struct ScheduleBackend {
    params: SearchParams,
}

impl ScheduleBackend {
    pub fn new(params: SearchParams) -> Self {
        Self { params }
    }

    fn anneal(&self, matrix: Arc<TransitionMatrix>, threads: usize, deadline: Deadline) -> SolveOutcome {
        let opts = &self.params;
        let n = matrix.len();
        let num_replicas = threads.max(2);
        let seed = opts.seed;

        // 1. Initialize Replicas
        let mut replicas: Vec<Replica> = (0..num_replicas)
            .map(|i| {
                let progress = i as f32 / (num_replicas - 1) as f32;
                let temp = opts.temp_min * (opts.temp_max / opts.temp_min).powf(progress);
                let mut rng = match seed {
                    Some(s) => fastrand::Rng::with_seed(s.wrapping_add(i as u64)),
                    None => fastrand::Rng::new(),
                };

                // The coldest chain starts from the original order.
                let order = if i == 0 {
                    (0..n).collect()
                } else {
                    let start = rng.usize(0..n);
                    greedy_order(&matrix, start, &mut rng)
                };
                Replica::new(matrix.clone(), order, temp, rng)
            })
            .collect();

        let mut rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s.wrapping_add(9999)),
            None => fastrand::Rng::new(),
        };

        let mut patience_counter = 0;
        let mut local_best_score = f32::MAX;
        let mut completed_epochs = 0;
        let mut last_report = Instant::now();
        let mut steps_since_last_report = 0usize;

        // 2. Main Loop
        for epoch in 0..opts.search_epochs {
            if deadline.reached() {
                debug!("Deadline reached after {} epochs", completed_epochs);
                break;
            }

            // A. Evolve in Parallel
            let steps_this_epoch: usize = replicas
                .par_iter_mut()
                .map(|r| {
                    let multiplier = if r.temperature > 5.0 { 1.5 } else { 1.0 };
                    let adjusted_steps = (opts.search_steps as f32 * multiplier) as usize;
                    r.evolve(adjusted_steps);
                    adjusted_steps
                })
                .sum();
            completed_epochs += 1;
            steps_since_last_report += steps_this_epoch;

            // B. Replica Exchange
            for i in (0..num_replicas - 1).rev() {
                let j = i + 1;
                let e1 = replicas[i].score as f32;
                let e2 = replicas[j].score as f32;
                let t1 = replicas[i].temperature;
                let t2 = replicas[j].temperature;

                let delta_beta = (1.0f32 / t1) - (1.0f32 / t2);
                let delta_e = e2 - e1;

                if rng.f32() < (-delta_beta * delta_e).exp() {
                    let (lo, hi) = replicas.split_at_mut(j);
                    let (a, b) = (&mut lo[i], &mut hi[0]);
                    let order_a = std::mem::take(&mut a.order);
                    let order_b = std::mem::take(&mut b.order);
                    let (score_a, score_b) = (a.score, b.score);
                    a.inject_order(order_b, score_b);
                    b.inject_order(order_a, score_a);
                }
            }

            // C. Check Improvements
            let best_now = replicas.iter().map(|r| r.best_score).min().unwrap_or(0) as f32;
            if best_now < local_best_score - opts.search_patience_threshold {
                local_best_score = best_now;
                patience_counter = 0;
            } else {
                patience_counter += 1;
            }

            if patience_counter >= opts.search_patience {
                debug!("Converged at {} after {} epochs", local_best_score, epoch + 1);
                break;
            }

            // D. Report Progress
            let elapsed = last_report.elapsed().as_secs_f32();
            if elapsed >= 5.0 {
                let ips = steps_since_last_report as f32 / elapsed / 1_000_000.0;
                debug!(
                    "Ep {:5} | Best: {:.0} | {:.2}M/s",
                    epoch, local_best_score, ips
                );
                last_report = Instant::now();
                steps_since_last_report = 0;
            }
        }

        if completed_epochs == 0 {
            return SolveOutcome::Infeasible;
        }

        let mut solutions: Vec<Permutation> = Vec::with_capacity(replicas.len());
        for r in replicas {
            if let Ok(p) = Permutation::from_sequence(r.best_order) {
                if !solutions.contains(&p) {
                    solutions.push(p);
                }
            }
        }

        if solutions.is_empty() {
            SolveOutcome::Infeasible
        } else {
            SolveOutcome::Feasible(solutions)
        }
    }
}

impl Backend for ScheduleBackend {
    fn name(&self) -> &str {
        "schedule"
    }

    fn solve(&self, sets: &ReferenceSets, limits: &SolveLimits) -> MoResult<SolveOutcome> {
        let n = sets.len();
        if n <= 1 {
            return Ok(SolveOutcome::Optimal(Permutation::identity(n)));
        }

        let deadline = Deadline::after(limits.time_limit);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(limits.threads.max(1))
            .build()
            .map_err(|e| MechOrderError::ThreadPool(e.to_string()))?;

        let outcome = pool.install(|| {
            let matrix = Arc::new(TransitionMatrix::build(sets));
            debug!(
                "Transition matrix {}x{} ({:.1} MB)",
                n,
                n,
                matrix.memory_bytes() as f64 / 1_048_576.0
            );
            if n <= self.params.exact_limit {
                branch_and_bound(&matrix, deadline)
            } else {
                self.anneal(matrix, limits.threads, deadline)
            }
        });
        Ok(outcome)
    }
}
