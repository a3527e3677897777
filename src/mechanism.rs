use crate::error::MoResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// NASA 7-coefficient polynomial fit, split at `t_mid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ThermoFit {
    pub t_low: f64,
    pub t_mid: f64,
    pub t_high: f64,
    pub lo: [f64; 7],
    pub hi: [f64; 7],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub molecular_weight: f64,
    #[serde(default)]
    pub thermo: ThermoFit,
}

impl Species {
    pub fn new(name: &str, molecular_weight: f64) -> Self {
        Self {
            name: name.to_string(),
            molecular_weight,
            thermo: ThermoFit::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Arrhenius {
    pub a: f64,
    pub b: f64,
    pub e: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub coefficient: f64,
}

impl Participant {
    pub fn new(name: &str, coefficient: f64) -> Self {
        Self {
            name: name.to_string(),
            coefficient,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ThirdBody {
    /// (species name, collision efficiency)
    pub efficiencies: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FalloffKind {
    Lindemann,
    Troe {
        alpha: f64,
        t3: f64,
        t1: f64,
        t2: Option<f64>,
    },
    Sri {
        a: f64,
        b: f64,
        c: f64,
        d: Option<f64>,
        e: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Falloff {
    pub low: Arrhenius,
    pub kind: FalloffKind,
    /// Single bath-gas species, `None` when the mixture acts as third body.
    #[serde(default)]
    pub bath: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub reactants: Vec<Participant>,
    pub products: Vec<Participant>,
    #[serde(default = "default_true")]
    pub reversible: bool,
    pub rate: Arrhenius,
    #[serde(default)]
    pub reverse_rate: Option<Arrhenius>,
    #[serde(default)]
    pub third_body: Option<ThirdBody>,
    #[serde(default)]
    pub falloff: Option<Falloff>,
    #[serde(default)]
    pub duplicate: bool,
}

fn default_true() -> bool {
    true
}

impl Reaction {
    pub fn new(reactants: Vec<Participant>, products: Vec<Participant>, rate: Arrhenius) -> Self {
        Self {
            reactants,
            products,
            reversible: true,
            rate,
            reverse_rate: None,
            third_body: None,
            falloff: None,
            duplicate: false,
        }
    }

    /// Net stoichiometric coefficient (products minus reactants).
    /// `None` when the species appears on neither side.
    pub fn net_coefficient(&self, species: &str) -> Option<f64> {
        let mut seen = false;
        let mut nu = 0.0;
        for p in self.products.iter().filter(|p| p.name == species) {
            seen = true;
            nu += p.coefficient;
        }
        for r in self.reactants.iter().filter(|r| r.name == species) {
            seen = true;
            nu -= r.coefficient;
        }
        seen.then_some(nu)
    }

    /// Names referenced by the reaction. Third-body species count only
    /// with a non-zero efficiency.
    pub fn touched_names(&self, consider_third_body: bool) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self
            .reactants
            .iter()
            .chain(self.products.iter())
            .map(|p| p.name.as_str())
            .collect();

        if consider_third_body {
            if let Some(thd) = &self.third_body {
                names.extend(
                    thd.efficiencies
                        .iter()
                        .filter(|(_, eff)| *eff != 0.0)
                        .map(|(name, _)| name.as_str()),
                );
            }
        }
        names
    }

    pub fn is_pressure_dependent(&self) -> bool {
        self.third_body.is_some() || self.falloff.is_some()
    }

    pub fn equation(&self) -> String {
        let side = |parts: &[Participant]| {
            parts
                .iter()
                .map(|p| {
                    if p.coefficient == 1.0 {
                        p.name.clone()
                    } else {
                        format!("{}{}", p.coefficient, p.name)
                    }
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        let arrow = if self.reversible { "<=>" } else { "=>" };
        format!("{} {} {}", side(&self.reactants), arrow, side(&self.products))
    }
}

/// Species and reactions in the order produced by the mechanism parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Mechanism {
    pub species: Vec<Species>,
    pub reactions: Vec<Reaction>,
}

impl Mechanism {
    pub fn new(species: Vec<Species>, reactions: Vec<Reaction>) -> Self {
        Self { species, reactions }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MoResult<Self> {
        let content = fs::read_to_string(path)?;
        let mech = serde_json::from_str(&content)?;
        Ok(mech)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> MoResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
