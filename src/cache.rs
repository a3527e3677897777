use crate::error::{MechOrderError, MoResult};
use crate::mechanism::{Mechanism, Reaction, Species};
use crate::permutation::Permutation;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CHECKPOINT_FILE: &str = "optimized.json";
pub const CHECKPOINT_VERSION: u32 = 1;

/// Per-routine evaluation orders computed by the code generator.
/// Carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvaluationOrders {
    pub rxn_rate: Vec<usize>,
    pub pdep_rate: Vec<usize>,
    pub spec_rate: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub fingerprint: String,
    pub species: Vec<Species>,
    pub reactions: Vec<Reaction>,
    pub eval_orders: EvaluationOrders,
    /// new position -> index into `species`
    pub species_order: Permutation,
    /// new position -> index into `reactions`
    pub reaction_order: Permutation,
}

/// Why a checkpoint could not be reused. Never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheMiss {
    #[error("no checkpoint found")]
    Missing,
    #[error("checkpoint unreadable: {0}")]
    Corrupt(String),
    #[error("checkpoint format version {0} is not supported")]
    Stale(u32),
    #[error("checkpoint belongs to a different mechanism")]
    Mismatch,
}

/// SHA-256 over the serialized species and reaction lists.
pub fn fingerprint(species: &[Species], reactions: &[Reaction]) -> String {
    let mut hasher = Sha256::new();
    // Serializing plain data structs cannot fail.
    if let Ok(json) = serde_json::to_string(species) {
        hasher.update(json.as_bytes());
    }
    if let Ok(json) = serde_json::to_string(reactions) {
        hasher.update(json.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn same_as_set<T: PartialEq>(stored: &[T], current: &[T]) -> bool {
    stored.len() == current.len()
        && stored.iter().all(|s| current.iter().any(|c| c == s))
        && current.iter().all(|c| stored.iter().any(|s| s == c))
}

impl Checkpoint {
    pub fn new(
        mechanism: &Mechanism,
        eval_orders: EvaluationOrders,
        species_order: Permutation,
        reaction_order: Permutation,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            fingerprint: fingerprint(&mechanism.species, &mechanism.reactions),
            species: mechanism.species.clone(),
            reactions: mechanism.reactions.clone(),
            eval_orders,
            species_order,
            reaction_order,
        }
    }

    /// Structural checks on a freshly decoded checkpoint. Anything that
    /// fails here is treated as a full miss.
    pub fn check_integrity(&self) -> Result<(), CacheMiss> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CacheMiss::Stale(self.version));
        }
        if self.species_order.len() != self.species.len() {
            return Err(CacheMiss::Corrupt(format!(
                "species order has {} entries for {} species",
                self.species_order.len(),
                self.species.len()
            )));
        }
        if self.reaction_order.len() != self.reactions.len() {
            return Err(CacheMiss::Corrupt(format!(
                "reaction order has {} entries for {} reactions",
                self.reaction_order.len(),
                self.reactions.len()
            )));
        }
        if fingerprint(&self.species, &self.reactions) != self.fingerprint {
            return Err(CacheMiss::Corrupt("fingerprint does not match contents".into()));
        }
        Ok(())
    }

    /// Order-independent equality of the stored snapshot and `mechanism`.
    pub fn matches(&self, mechanism: &Mechanism) -> bool {
        if fingerprint(&mechanism.species, &mechanism.reactions) == self.fingerprint {
            return true;
        }
        same_as_set(&self.species, &mechanism.species)
            && same_as_set(&self.reactions, &mechanism.reactions)
    }
}

/// Durable home for checkpoints, keyed by build directory.
pub trait CheckpointStore: Send + Sync {
    fn load(&self, build_path: &Path) -> Result<Checkpoint, CacheMiss>;

    fn save(&self, build_path: &Path, checkpoint: &Checkpoint) -> MoResult<()>;
}

fn decode(content: &str) -> Result<Checkpoint, CacheMiss> {
    let checkpoint: Checkpoint =
        serde_json::from_str(content).map_err(|e| CacheMiss::Corrupt(e.to_string()))?;
    checkpoint.check_integrity()?;
    Ok(checkpoint)
}

/// Stores `optimized.json` inside the build directory.
#[derive(Debug, Default, Clone)]
pub struct FileCheckpointStore;

impl FileCheckpointStore {
    pub fn path_for(build_path: &Path) -> PathBuf {
        build_path.join(CHECKPOINT_FILE)
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self, build_path: &Path) -> Result<Checkpoint, CacheMiss> {
        let path = Self::path_for(build_path);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(CacheMiss::Missing),
            Err(e) => return Err(CacheMiss::Corrupt(e.to_string())),
        };
        decode(&content)
    }

    fn save(&self, build_path: &Path, checkpoint: &Checkpoint) -> MoResult<()> {
        fs::create_dir_all(build_path)?;
        let path = Self::path_for(build_path);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(checkpoint)?)?;
        fs::rename(&tmp, &path)?;
        debug!("Checkpoint written to {:?}", path);
        Ok(())
    }
}

/// Keeps serialized checkpoints in memory.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw content as-is, bypassing serialization.
    pub fn insert_raw(&self, build_path: &Path, content: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(build_path.to_path_buf(), content.to_string());
        }
    }

    pub fn contains(&self, build_path: &Path) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(build_path))
            .unwrap_or(false)
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, build_path: &Path) -> Result<Checkpoint, CacheMiss> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheMiss::Corrupt(e.to_string()))?;
        let content = entries.get(build_path).ok_or(CacheMiss::Missing)?;
        decode(content)
    }

    fn save(&self, build_path: &Path, checkpoint: &Checkpoint) -> MoResult<()> {
        let content = serde_json::to_string(checkpoint)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| MechOrderError::Validation(e.to_string()))?;
        entries.insert(build_path.to_path_buf(), content);
        Ok(())
    }
}

/// Loads a checkpoint and keeps it only if it describes `mechanism`.
pub fn lookup(
    store: &dyn CheckpointStore,
    build_path: &Path,
    mechanism: &Mechanism,
) -> Result<Checkpoint, CacheMiss> {
    let checkpoint = store.load(build_path).map_err(|miss| {
        match &miss {
            CacheMiss::Missing => debug!("Cache miss: {}", miss),
            _ => warn!("Cache miss: {}", miss),
        }
        miss
    })?;

    if !checkpoint.matches(mechanism) {
        info!("Cache miss: {}", CacheMiss::Mismatch);
        return Err(CacheMiss::Mismatch);
    }
    Ok(checkpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanism::{Arrhenius, Participant};

    fn mech() -> Mechanism {
        Mechanism::new(
            vec![Species::new("A", 1.0), Species::new("B", 2.0)],
            vec![Reaction::new(
                vec![Participant::new("A", 1.0)],
                vec![Participant::new("B", 1.0)],
                Arrhenius { a: 1e10, b: 0.0, e: 100.0 },
            )],
        )
    }

    #[test]
    fn reordered_mechanism_still_matches() {
        let m = mech();
        let cp = Checkpoint::new(
            &m,
            EvaluationOrders::default(),
            Permutation::identity(2),
            Permutation::identity(1),
        );
        let mut shuffled = m.clone();
        shuffled.species.reverse();
        assert!(cp.matches(&shuffled));

        let mut grown = m.clone();
        grown.species.push(Species::new("C", 3.0));
        assert!(!cp.matches(&grown));
    }

    #[test]
    fn tampered_contents_fail_integrity() {
        let m = mech();
        let mut cp = Checkpoint::new(
            &m,
            EvaluationOrders::default(),
            Permutation::identity(2),
            Permutation::identity(1),
        );
        cp.species[0].molecular_weight = 9.0;
        assert!(matches!(cp.check_integrity(), Err(CacheMiss::Corrupt(_))));
    }

    #[test]
    fn set_equality_ignores_order_not_length() {
        assert!(same_as_set(&[1, 2, 3], &[3, 1, 2]));
        assert!(!same_as_set(&[1, 2, 3], &[1, 2, 4]));
        assert!(!same_as_set(&[1, 2], &[1, 2, 2]));
    }
}
