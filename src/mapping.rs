use crate::mechanism::{Reaction, Species};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumIter};

/// Per-index set of counterpart indices (species of a reaction, or
/// reactions of a species).
pub type ReferenceSets = Vec<BTreeSet<usize>>;

/// Which index set an ordering applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum IndexSpace {
    Reaction,
    Species,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappingOptions {
    /// Count third-body species with non-zero efficiency as touched.
    pub consider_third_body: bool,
    /// Presence in the raw lists suffices, regardless of net coefficient.
    pub load_non_participating: bool,
}

impl MappingOptions {
    /// Settings used when building the reordering model.
    pub fn for_reordering() -> Self {
        Self {
            consider_third_body: false,
            load_non_participating: true,
        }
    }
}

pub struct Mappings {
    pub reaction_to_species: ReferenceSets,
    pub species_to_reaction: ReferenceSets,
}

impl Mappings {
    pub fn sets(&self, space: IndexSpace) -> &ReferenceSets {
        match space {
            IndexSpace::Reaction => &self.reaction_to_species,
            IndexSpace::Species => &self.species_to_reaction,
        }
    }
}

pub fn build_mappings(species: &[Species], reactions: &[Reaction], opts: MappingOptions) -> Mappings {
    let mut reaction_to_species = vec![BTreeSet::new(); reactions.len()];
    let mut species_to_reaction = vec![BTreeSet::new(); species.len()];

    for (rind, rxn) in reactions.iter().enumerate() {
        let touched = rxn.touched_names(opts.consider_third_body);
        if touched.is_empty() {
            continue;
        }
        for (sind, sp) in species.iter().enumerate() {
            if !touched.contains(sp.name.as_str()) {
                continue;
            }
            let participates = match rxn.net_coefficient(&sp.name) {
                Some(nu) => nu != 0.0,
                None => false,
            };
            if participates || opts.load_non_participating {
                reaction_to_species[rind].insert(sind);
                species_to_reaction[sind].insert(rind);
            }
        }
    }

    Mappings {
        reaction_to_species,
        species_to_reaction,
    }
}
