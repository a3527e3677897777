use crate::heuristic::TransitionMatrix;
use itertools::Itertools;
use std::sync::Arc;

#[inline(always)]
fn fast_exp(x: f32) -> f32 {
    if x < -256.0 {
        return 0.0;
    }
    // (1+x/256)^256 by eight squarings
    let mut y = 1.0 + x / 256.0;
    for _ in 0..8 {
        y *= y;
    }
    y
}

/// Nearest-neighbour chain: repeatedly append the index that introduces
/// the fewest new elements. Ties are broken randomly.
pub fn greedy_order(matrix: &TransitionMatrix, start: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let n = matrix.len();
    let mut order = Vec::with_capacity(n);
    let mut used = vec![false; n];
    if n == 0 {
        return order;
    }

    let mut current = start.min(n - 1);
    used[current] = true;
    order.push(current);

    while order.len() < n {
        let mut best: Option<(u32, u32, usize)> = None;
        for next in (0..n).filter(|&v| !used[v]) {
            let key = (matrix.at(current, next), rng.u32(..));
            if best.map_or(true, |(c, r, _)| key < (c, r)) {
                best = Some((key.0, key.1, next));
            }
        }
        if let Some((_, _, next)) = best {
            used[next] = true;
            order.push(next);
            current = next;
        }
    }
    order
}

/// One annealing chain at a fixed temperature.
#[repr(align(64))]
pub struct Replica {
    pub matrix: Arc<TransitionMatrix>,

    /// position -> index
    pub order: Vec<usize>,
    pub score: u64,
    pub temperature: f32,

    pub best_order: Vec<usize>,
    pub best_score: u64,

    pub rng: fastrand::Rng,
}

impl Replica {
    pub fn new(matrix: Arc<TransitionMatrix>, order: Vec<usize>, temperature: f32, rng: fastrand::Rng) -> Self {
        let score = matrix.sequence_cost(&order);
        Self {
            matrix,
            best_order: order.clone(),
            best_score: score,
            order,
            score,
            temperature,
            rng,
        }
    }

    /// Replaces the current state, e.g. after a replica exchange.
    pub fn inject_order(&mut self, order: Vec<usize>, score: u64) {
        self.order = order;
        self.score = score;
        if score < self.best_score {
            self.best_score = score;
            self.best_order = self.order.clone();
        }
    }

    #[inline(always)]
    fn edge(&self, from_pos: usize, seq: &[usize]) -> i64 {
        self.matrix.at(seq[from_pos], seq[from_pos + 1]) as i64
    }

    /// Cost change of swapping the indices at positions `a` and `b`.
    #[inline(always)]
    pub fn calc_delta(&self, a: usize, b: usize) -> i64 {
        let n = self.order.len();
        let (a, b) = if a < b { (a, b) } else { (b, a) };

        // Steps that start at these positions are the only ones that change.
        let mut starts = [usize::MAX; 4];
        let mut count = 0;
        for p in [a.wrapping_sub(1), a, b.wrapping_sub(1), b] {
            if p != usize::MAX && p + 1 < n && !starts[..count].contains(&p) {
                starts[count] = p;
                count += 1;
            }
        }

        let swapped = |pos: usize| -> usize {
            if pos == a {
                self.order[b]
            } else if pos == b {
                self.order[a]
            } else {
                self.order[pos]
            }
        };

        let mut delta = 0i64;
        for &p in &starts[..count] {
            delta -= self.edge(p, &self.order);
            delta += self.matrix.at(swapped(p), swapped(p + 1)) as i64;
        }
        delta
    }

    /// Exhaustively reorders a small window of consecutive positions.
    /// Returns true if a strictly better arrangement was applied.
    pub fn try_window_move(&mut self, width: usize) -> bool {
        let n = self.order.len();
        if width < 2 || n < width {
            return false;
        }
        let start = self.rng.usize(0..=n - width);
        let end = start + width;

        let local_cost = |seq: &[usize]| -> u64 {
            let lo = start.saturating_sub(1);
            let hi = (end + 1).min(n);
            seq[lo..hi]
                .windows(2)
                .map(|w| self.matrix.at(w[0], w[1]) as u64)
                .sum()
        };

        let current = local_cost(&self.order);
        let window: Vec<usize> = self.order[start..end].to_vec();
        let mut scratch = self.order.clone();
        let mut best_cost = current;
        let mut best_window: Option<Vec<usize>> = None;

        for perm in window.iter().copied().permutations(width) {
            scratch[start..end].copy_from_slice(&perm);
            let cost = local_cost(&scratch);
            if cost < best_cost {
                best_cost = cost;
                best_window = Some(perm);
            }
        }

        match best_window {
            Some(w) => {
                self.order[start..end].copy_from_slice(&w);
                self.score = self.score - current + best_cost;
                self.record_best();
                true
            }
            None => false,
        }
    }

    fn record_best(&mut self) {
        if self.score < self.best_score {
            self.best_score = self.score;
            self.best_order.clone_from(&self.order);
        }
    }

    #[inline(always)]
    pub fn evolve(&mut self, steps: usize) -> (usize, usize) {
        let n = self.order.len();
        let mut accepted = 0;
        if n < 2 {
            return (accepted, steps);
        }

        for _ in 0..steps {
            if self.temperature < 1.0 && self.rng.f32() < 0.002 && self.try_window_move(5) {
                accepted += 1;
                continue;
            }

            let a = self.rng.usize(0..n);
            let b = self.rng.usize(0..n);
            if a == b {
                continue;
            }

            let delta = self.calc_delta(a, b);

            // Metropolis Criterion
            if delta <= 0 || self.rng.f32() < fast_exp(-(delta as f32) / self.temperature) {
                self.order.swap(a, b);
                self.score = (self.score as i64 + delta) as u64;
                self.record_best();
                accepted += 1;
            }
        }
        (accepted, steps)
    }
}
