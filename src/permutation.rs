use crate::error::{MechOrderError, MoResult};
use serde::{Deserialize, Serialize};

/// A bijection over `0..len`.
///
/// Two views are kept in sync:
/// * `placement[original] = new position` (what an assignment model produces)
/// * `sequence[position] = original index` (what loops iterate over)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Permutation {
    placement: Vec<usize>,
    sequence: Vec<usize>,
}

impl Permutation {
    pub fn identity(len: usize) -> Self {
        let ids: Vec<usize> = (0..len).collect();
        Self {
            placement: ids.clone(),
            sequence: ids,
        }
    }

    /// Builds from the new-position -> original-index view.
    pub fn from_sequence(sequence: Vec<usize>) -> MoResult<Self> {
        let placement = invert_checked(&sequence)?;
        Ok(Self {
            placement,
            sequence,
        })
    }

    /// Builds from the original-index -> new-position view.
    pub fn from_placement(placement: Vec<usize>) -> MoResult<Self> {
        let sequence = invert_checked(&placement)?;
        Ok(Self {
            placement,
            sequence,
        })
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.sequence.iter().enumerate().all(|(i, &v)| i == v)
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn placement(&self) -> &[usize] {
        &self.placement
    }

    /// Swaps the two views.
    pub fn invert(&self) -> Self {
        Self {
            placement: self.sequence.clone(),
            sequence: self.placement.clone(),
        }
    }

    /// Reorders `items` so that `out[pos] = items[sequence[pos]]`.
    pub fn apply<T: Clone>(&self, items: &[T]) -> MoResult<Vec<T>> {
        if items.len() != self.len() {
            return Err(MechOrderError::InvalidPermutation(format!(
                "permutation of length {} applied to {} items",
                self.len(),
                items.len()
            )));
        }
        Ok(self.sequence.iter().map(|&i| items[i].clone()).collect())
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = MechOrderError;

    fn try_from(sequence: Vec<usize>) -> MoResult<Self> {
        Self::from_sequence(sequence)
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(p: Permutation) -> Self {
        p.sequence
    }
}

/// Inverts `map`, failing unless every index in `0..map.len()` appears once.
pub fn invert_checked(map: &[usize]) -> MoResult<Vec<usize>> {
    let n = map.len();
    let mut inverse = vec![usize::MAX; n];
    for (i, &v) in map.iter().enumerate() {
        if v >= n {
            return Err(MechOrderError::InvalidPermutation(format!(
                "index {} out of range for length {}",
                v, n
            )));
        }
        if inverse[v] != usize::MAX {
            return Err(MechOrderError::InvalidPermutation(format!(
                "index {} appears more than once",
                v
            )));
        }
        inverse[v] = i;
    }
    Ok(inverse)
}
