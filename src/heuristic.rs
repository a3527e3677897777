use crate::mapping::ReferenceSets;
use rayon::prelude::*;

/// Locality cost of visiting `sets` in `ordering`: the number of elements
/// newly introduced at each step, summed over adjacent positions.
pub fn transition_cost(sets: &ReferenceSets, ordering: &[usize]) -> usize {
    ordering
        .windows(2)
        .map(|w| sets[w[1]].difference(&sets[w[0]]).count())
        .sum()
}

/// Cost of the unmodified ordering, the baseline every candidate is held to.
pub fn identity_cost(sets: &ReferenceSets) -> usize {
    let identity: Vec<usize> = (0..sets.len()).collect();
    transition_cost(sets, &identity)
}

/// Dense table of step costs: `at(i, j) = |S[j] \ S[i]|`.
///
/// Row-major and flattened so the search loop stays in one allocation.
/// Takes `4 * K * K` bytes (about 400 MB at K = 10 000), and the build is
/// not interruptible: the solve deadline is first checked once it returns.
#[derive(Debug, Clone)]
pub struct TransitionMatrix {
    n: usize,
    costs: Vec<u32>,
}

impl TransitionMatrix {
    pub fn build(sets: &ReferenceSets) -> Self {
        let n = sets.len();
        let costs: Vec<u32> = (0..n * n)
            .into_par_iter()
            .map(|idx| {
                let (from, to) = (idx / n, idx % n);
                if from == to {
                    0
                } else {
                    sets[to].difference(&sets[from]).count() as u32
                }
            })
            .collect();
        Self { n, costs }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    /// Heap size of the cost table.
    pub fn memory_bytes(&self) -> usize {
        self.costs.len() * std::mem::size_of::<u32>()
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline(always)]
    pub fn at(&self, from: usize, to: usize) -> u32 {
        self.costs[from * self.n + to]
    }

    pub fn sequence_cost(&self, order: &[usize]) -> u64 {
        order
            .windows(2)
            .map(|w| self.at(w[0], w[1]) as u64)
            .sum()
    }

    /// Cheapest incoming step for each index, used as a lower bound.
    pub fn min_incoming(&self) -> Vec<u32> {
        (0..self.n)
            .map(|to| {
                (0..self.n)
                    .filter(|&from| from != to)
                    .map(|from| self.at(from, to))
                    .min()
                    .unwrap_or(0)
            })
            .collect()
    }
}
