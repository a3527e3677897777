#![allow(dead_code)]

use mechorder::config::{OptimizerConfig, SearchParams};
use mechorder::mechanism::{Arrhenius, Mechanism, Participant, Reaction, Species};

pub fn species(names: &[&str]) -> Vec<Species> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| Species::new(n, 1.0 + i as f64))
        .collect()
}

/// Reaction from (name, coefficient) pairs. `a` makes otherwise identical
/// reactions distinct.
pub fn reaction(reactants: &[(&str, f64)], products: &[(&str, f64)], a: f64) -> Reaction {
    let side = |parts: &[(&str, f64)]| {
        parts
            .iter()
            .map(|(n, c)| Participant::new(n, *c))
            .collect::<Vec<_>>()
    };
    Reaction::new(
        side(reactants),
        side(products),
        Arrhenius {
            a,
            b: 0.0,
            e: 1000.0,
        },
    )
}

/// Small hydrogen-like mechanism with a mix of overlapping reactions.
pub fn h2_mechanism() -> Mechanism {
    let sp = species(&["H2", "O2", "H", "O", "OH", "H2O", "HO2", "N2"]);
    let reactions = vec![
        reaction(&[("H", 1.0), ("O2", 1.0)], &[("O", 1.0), ("OH", 1.0)], 3.5e15),
        reaction(&[("H2O", 1.0), ("O", 1.0)], &[("OH", 2.0)], 6.7e7),
        reaction(&[("O", 1.0), ("H2", 1.0)], &[("H", 1.0), ("OH", 1.0)], 5.1e4),
        reaction(&[("HO2", 1.0), ("H", 1.0)], &[("OH", 2.0)], 7.1e13),
        reaction(&[("H2", 1.0), ("OH", 1.0)], &[("H2O", 1.0), ("H", 1.0)], 2.2e8),
        reaction(&[("H", 1.0), ("O2", 1.0)], &[("HO2", 1.0)], 4.6e12),
        reaction(&[("HO2", 1.0), ("O", 1.0)], &[("OH", 1.0), ("O2", 1.0)], 3.25e13),
    ];
    Mechanism::new(sp, reactions)
}

pub fn fast_config() -> OptimizerConfig {
    OptimizerConfig {
        threads: 2,
        time_limit_minutes: 0.5,
        search: SearchParams {
            search_epochs: 30,
            search_steps: 2_000,
            search_patience: 10,
            seed: Some(1234),
            ..Default::default()
        },
        ..Default::default()
    }
}
