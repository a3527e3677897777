use crate::reports;
use clap::Args;
use mechorder::error::{MechOrderError, MoResult};
use mechorder::heuristic::{identity_cost, transition_cost};
use mechorder::mapping::{build_mappings, IndexSpace, MappingOptions};
use mechorder::mechanism::Mechanism;
use mechorder::permutation::Permutation;
use strum::IntoEnumIterator;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Comma separated species order (new position -> original index).
    #[arg(long)]
    pub species_order: Option<String>,

    /// Comma separated reaction order (new position -> original index).
    #[arg(long)]
    pub reaction_order: Option<String>,

    /// Count third-body species with non-zero efficiency.
    #[arg(long, default_value_t = false)]
    pub third_body: bool,

    /// Count only species with a non-zero net coefficient.
    #[arg(long, default_value_t = false)]
    pub participating_only: bool,
}

fn parse_order(raw: &str) -> MoResult<Permutation> {
    let indices = raw
        .split(',')
        .map(|s| {
            s.trim().parse::<usize>().map_err(|_| {
                MechOrderError::Validation(format!("invalid index '{}' in ordering", s.trim()))
            })
        })
        .collect::<MoResult<Vec<usize>>>()?;
    Permutation::from_sequence(indices)
}

pub fn run(args: ScoreArgs, mechanism: &Mechanism) -> MoResult<()> {
    let opts = MappingOptions {
        consider_third_body: args.third_body,
        load_non_participating: !args.participating_only,
    };
    let mappings = build_mappings(&mechanism.species, &mechanism.reactions, opts);

    let mut rows = Vec::new();
    for space in IndexSpace::iter() {
        let raw = match space {
            IndexSpace::Reaction => &args.reaction_order,
            IndexSpace::Species => &args.species_order,
        };
        let sets = mappings.sets(space);
        let baseline = identity_cost(sets);
        let candidate = match raw {
            Some(r) => {
                let p = parse_order(r)?;
                if p.len() != sets.len() {
                    return Err(MechOrderError::Validation(format!(
                        "{} order has {} entries, mechanism has {}",
                        space,
                        p.len(),
                        sets.len()
                    )));
                }
                Some(transition_cost(sets, p.sequence()))
            }
            None => None,
        };
        rows.push((space, sets.len(), baseline, candidate));
    }

    reports::print_score_report(&rows);
    Ok(())
}
