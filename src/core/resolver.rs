//! Quantity resolver - fills the parameter store from an ordered rule table
//!
//! Each rule states which quantities it reads and which it writes. Rules are
//! applied in table order, repeatedly, until a pass adds nothing new; a rule
//! fires at most once per run. The default table is then applied to whatever
//! is still absent, and the derivation pass runs once more so defaults can
//! feed downstream rules.
//!
//! The first value written for a quantity wins (supplied values are written
//! before any rule runs). Later rules that would produce the same quantity
//! only check it for consistency, see [`ParameterStore::offer`].

use crate::core::constants::{
    capacity_from_max_concentration, max_concentration_from_capacity, AREAL_CAPACITY_FACTOR,
};
use crate::core::error::{TeaError, TeaResult};
use crate::core::names::{self, Electrode};
use crate::core::store::{NoteKind, Offer, ParameterStore};

/// Pure derivation over the rule's inputs, in declaration order
pub type RuleFn = fn(&[f64]) -> Result<Vec<f64>, String>;

/// One derivation: `outputs := eval(inputs)` once all inputs are present
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    eval: RuleFn,
}

impl Rule {
    pub fn new(id: impl Into<String>, inputs: Vec<String>, outputs: Vec<String>, eval: RuleFn) -> Self {
        Self {
            id: id.into(),
            inputs,
            outputs,
            eval,
        }
    }

    /// Evaluate the rule on explicit input values
    pub fn apply(&self, inputs: &[f64]) -> Result<Vec<f64>, String> {
        let values = (self.eval)(inputs)?;
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(format!("result {} is not finite", bad));
        }
        Ok(values)
    }

    fn gather(&self, store: &ParameterStore) -> Option<Vec<f64>> {
        self.inputs.iter().map(|name| store.number(name)).collect()
    }

    fn source(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|i| format!("'{}'", i)).collect();
        format!("{} ({})", self.id, inputs.join(", "))
    }
}

/// Fallback value for a quantity nobody supplied or derived
#[derive(Debug, Clone)]
pub struct DefaultRule {
    pub quantity: String,
    pub value: f64,
    /// The default is not applied when any of these is present
    pub unless: Vec<String>,
    pub reason: &'static str,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    rules: Vec<Rule>,
    defaults: Vec<DefaultRule>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl Resolver {
    pub fn new(rules: Vec<Rule>, defaults: Vec<DefaultRule>) -> Self {
        Self { rules, defaults }
    }

    /// The full electrode-stack rule table
    pub fn standard() -> Self {
        let mut rules = separator_rules();
        for electrode in Electrode::ALL {
            rules.extend(electrode_rules(electrode));
        }
        rules.extend(cell_rules());
        for electrode in Electrode::ALL {
            rules.extend(loss_rules(electrode));
        }
        rules.extend(inventory_rules());

        Self::new(rules, default_rules())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn defaults(&self) -> &[DefaultRule] {
        &self.defaults
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Resolve every derivable quantity in place
    pub fn resolve(&self, store: &mut ParameterStore) -> TeaResult<()> {
        if store.number(names::ELECTROLYTE_DENSITY).is_none() {
            return Err(TeaError::MissingRequired(names::ELECTROLYTE_DENSITY.to_string()));
        }

        let mut fired = vec![false; self.rules.len()];
        self.derive(store, &mut fired);

        let mut defaulted = false;
        for default in &self.defaults {
            if default.unless.iter().any(|name| store.contains(name)) {
                continue;
            }
            defaulted |= store.set_default(&default.quantity, default.value, default.reason);
        }
        if defaulted {
            self.derive(store, &mut fired);
        }

        tracing::debug!(quantities = store.len(), "parameter resolution finished");
        Ok(())
    }

    fn derive(&self, store: &mut ParameterStore, fired: &mut [bool]) {
        loop {
            let mut progress = false;
            for (idx, rule) in self.rules.iter().enumerate() {
                if fired[idx] {
                    continue;
                }
                let Some(inputs) = rule.gather(store) else {
                    continue;
                };
                fired[idx] = true;
                match rule.apply(&inputs) {
                    Ok(values) => {
                        let source = rule.source();
                        for (name, value) in rule.outputs.iter().zip(values) {
                            if store.offer(name, value, &source) == Offer::Inserted {
                                progress = true;
                            }
                        }
                    }
                    Err(reason) => {
                        let quantity = rule.outputs.join(", ");
                        store.note(
                            NoteKind::Skipped,
                            &quantity,
                            format!("Rule {} not applied: {}", rule.id, reason),
                        );
                    }
                }
            }
            if !progress {
                break;
            }
        }
    }
}

fn fraction(name: &str, value: f64) -> Result<f64, String> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} = {} is outside [0, 1]", name, value))
    }
}

fn density(name: &str, value: f64) -> Result<f64, String> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{} = {} is negative", name, value))
    }
}

fn positive(name: &str, value: f64) -> Result<f64, String> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{} = {} must be positive", name, value))
    }
}

/// Inactive fractions below this are treated as a dense, binder-free layer
pub const ZERO_FRACTION: f64 = 1e-12;

fn separator_rules() -> Vec<Rule> {
    use names::{
        ELECTROLYTE_DENSITY as RHO_EL, SEPARATOR_DENSITY as RHO, SEPARATOR_DRY_DENSITY as DRY,
        SEPARATOR_MATERIAL_DENSITY as MAT, SEPARATOR_POROSITY as EPS,
    };

    vec![
        // Both raw densities over-determine the porosity
        Rule::new(
            "separator_porosity_from_densities",
            vec![DRY.into(), MAT.into()],
            vec![EPS.into()],
            |v| {
                let material = positive("material density", v[1])?;
                Ok(vec![fraction("porosity", 1.0 - v[0] / material)?])
            },
        ),
        Rule::new(
            "separator_dry_density_from_material",
            vec![EPS.into(), MAT.into()],
            vec![DRY.into()],
            |v| Ok(vec![(1.0 - v[0]) * v[1]]),
        ),
        Rule::new(
            "separator_material_density_from_dry",
            vec![EPS.into(), DRY.into()],
            vec![MAT.into()],
            |v| {
                if v[0] >= 1.0 {
                    return Err("porosity is 1, the separator has no solid phase".to_string());
                }
                Ok(vec![v[1] / (1.0 - v[0])])
            },
        ),
        Rule::new(
            "separator_density_from_material",
            vec![EPS.into(), RHO_EL.into(), MAT.into()],
            vec![RHO.into()],
            |v| Ok(vec![v[0] * v[1] + (1.0 - v[0]) * v[2]]),
        ),
        Rule::new(
            "separator_density_from_dry",
            vec![EPS.into(), RHO_EL.into(), DRY.into()],
            vec![RHO.into()],
            |v| Ok(vec![v[0] * v[1] + v[2]]),
        ),
        Rule::new(
            "separator_dry_density_from_density",
            vec![RHO.into(), EPS.into(), RHO_EL.into()],
            vec![DRY.into()],
            |v| Ok(vec![density("dry density", v[0] - v[1] * v[2])?]),
        ),
    ]
}

fn electrode_rules(e: Electrode) -> Vec<Rule> {
    let id = |name: &str| format!("{}_{}", e.short(), name);
    let rho_el: String = names::ELECTROLYTE_DENSITY.into();

    vec![
        Rule::new(
            id("composition_from_binder_and_additive"),
            vec![
                e.binder_mass_fraction(),
                e.additive_mass_fraction(),
                e.binder_density(),
                e.additive_density(),
            ],
            vec![e.active_mass_fraction(), e.inactive_density()],
            |v| {
                let (w_b, w_c, rho_b, rho_c) = (v[0], v[1], v[2], v[3]);
                let w_a = fraction("active material dry mass fraction", 1.0 - w_b - w_c)?;
                let inactive = w_b + w_c;
                if inactive <= 0.0 {
                    return Err("binder and additive fractions are both zero".to_string());
                }
                let rho_i = inactive / (w_b / positive("binder density", rho_b)? + w_c / positive("additive density", rho_c)?);
                Ok(vec![w_a, rho_i])
            },
        ),
        Rule::new(
            id("active_volume_fraction_from_mass_fraction"),
            vec![
                e.porosity(),
                e.active_mass_fraction(),
                e.active_density(),
                e.inactive_density(),
            ],
            vec![e.active_volume_fraction()],
            |v| {
                let (eps, w_a, rho_a, rho_i) = (v[0], v[1], v[2], v[3]);
                let active = w_a / positive("active material density", rho_a)?;
                let inactive = if w_a < 1.0 {
                    (1.0 - w_a) / positive("inactive material density", rho_i)?
                } else {
                    0.0
                };
                Ok(vec![fraction("active material volume fraction", (1.0 - eps) * active / (active + inactive))?])
            },
        ),
        Rule::new(
            id("dry_density_from_composition"),
            vec![
                e.porosity(),
                e.active_volume_fraction(),
                e.active_density(),
                e.inactive_density(),
            ],
            vec![e.dry_density()],
            |v| {
                let (eps, phi_a, rho_a, rho_i) = (v[0], v[1], v[2], v[3]);
                let phi_i = fraction("inactive material volume fraction", 1.0 - eps - phi_a)?;
                Ok(vec![phi_a * rho_a + phi_i * rho_i])
            },
        ),
        Rule::new(
            id("density_from_dry_density"),
            vec![e.dry_density(), e.porosity(), rho_el.clone()],
            vec![e.density()],
            |v| Ok(vec![v[0] + v[1] * v[2]]),
        ),
        Rule::new(
            id("dry_density_from_density"),
            vec![e.density(), e.porosity(), rho_el.clone()],
            vec![e.dry_density()],
            |v| Ok(vec![density("dry density", v[0] - v[1] * v[2])?]),
        ),
        Rule::new(
            id("inactive_density_from_dry_density"),
            vec![
                e.dry_density(),
                e.porosity(),
                e.active_volume_fraction(),
                e.active_density(),
            ],
            vec![e.inactive_density()],
            |v| {
                let (rho_dry, eps, phi_a, rho_a) = (v[0], v[1], v[2], v[3]);
                let phi_i = fraction("inactive material volume fraction", 1.0 - eps - phi_a)?;
                if phi_i < ZERO_FRACTION {
                    return Err("inactive material volume fraction is zero".to_string());
                }
                Ok(vec![density("inactive material density", (rho_dry - phi_a * rho_a) / phi_i)?])
            },
        ),
        Rule::new(
            id("active_volume_fraction_from_dry_density"),
            vec![e.dry_density(), e.active_mass_fraction(), e.active_density()],
            vec![e.active_volume_fraction()],
            |v| {
                let rho_a = positive("active material density", v[2])?;
                Ok(vec![fraction("active material volume fraction", v[1] * v[0] / rho_a)?])
            },
        ),
        Rule::new(
            id("mass_fraction_from_composition"),
            vec![e.active_volume_fraction(), e.active_density(), e.dry_density()],
            vec![e.active_mass_fraction()],
            |v| {
                let rho_dry = positive("dry density", v[2])?;
                Ok(vec![fraction("active material dry mass fraction", v[0] * v[1] / rho_dry)?])
            },
        ),
        Rule::new(
            id("max_concentration_from_capacity"),
            vec![e.active_capacity(), e.active_density()],
            vec![e.max_concentration()],
            |v| Ok(vec![max_concentration_from_capacity(v[0], v[1])]),
        ),
        Rule::new(
            id("capacity_from_max_concentration"),
            vec![e.max_concentration(), e.active_density()],
            vec![e.active_capacity()],
            |v| {
                let rho_a = positive("active material density", v[1])?;
                Ok(vec![capacity_from_max_concentration(v[0], rho_a)])
            },
        ),
        Rule::new(
            id("areal_capacity"),
            vec![e.max_concentration(), e.active_volume_fraction(), e.thickness()],
            vec![e.capacity()],
            |v| Ok(vec![v[0] * AREAL_CAPACITY_FACTOR * v[1] * v[2]]),
        ),
        Rule::new(
            id("thickness_from_areal_capacity"),
            vec![e.capacity(), e.max_concentration(), e.active_volume_fraction()],
            vec![e.thickness()],
            |v| {
                let per_metre = positive("capacity per metre", v[1] * AREAL_CAPACITY_FACTOR * v[2])?;
                Ok(vec![v[0] / per_metre])
            },
        ),
        Rule::new(
            id("initial_stoichiometry"),
            vec![e.initial_concentration(), e.max_concentration()],
            vec![e.initial_stoichiometry()],
            |v| {
                let c_max = positive("maximum concentration", v[1])?;
                Ok(vec![fraction("initial stoichiometry", v[0] / c_max)?])
            },
        ),
        Rule::new(
            id("initial_lithium"),
            vec![e.initial_concentration(), e.active_volume_fraction(), e.thickness()],
            vec![e.initial_lithium()],
            |v| Ok(vec![v[0] * AREAL_CAPACITY_FACTOR * v[1] * v[2]]),
        ),
    ]
}

fn cell_rules() -> Vec<Rule> {
    let n = Electrode::Negative;
    let p = Electrode::Positive;
    let np: String = names::THEORETICAL_NP_RATIO.into();

    vec![
        Rule::new(
            "theoretical_np_ratio",
            vec![n.capacity(), p.capacity()],
            vec![np.clone()],
            |v| Ok(vec![v[0] / positive("positive electrode capacity", v[1])?]),
        ),
        Rule::new(
            "negative_thickness_from_np_ratio",
            vec![np.clone(), p.capacity(), n.max_concentration(), n.active_volume_fraction()],
            vec![n.thickness()],
            |v| {
                let per_metre = positive("capacity per metre", v[2] * AREAL_CAPACITY_FACTOR * v[3])?;
                Ok(vec![v[0] * v[1] / per_metre])
            },
        ),
        Rule::new(
            "positive_thickness_from_np_ratio",
            vec![np, n.capacity(), p.max_concentration(), p.active_volume_fraction()],
            vec![p.thickness()],
            |v| {
                let ratio = positive("n/p ratio", v[0])?;
                let per_metre = positive("capacity per metre", v[2] * AREAL_CAPACITY_FACTOR * v[3])?;
                Ok(vec![v[1] / ratio / per_metre])
            },
        ),
        Rule::new(
            "initial_lithium_inventory",
            vec![n.initial_lithium(), p.initial_lithium()],
            vec![names::INITIAL_LITHIUM_INVENTORY.into()],
            |v| Ok(vec![v[0] + v[1]]),
        ),
        Rule::new(
            "lithium_inventory_loss_from_percent",
            vec![names::LLI_PERCENT.into(), names::INITIAL_LITHIUM_INVENTORY.into()],
            vec![names::LLI_ABSOLUTE.into()],
            |v| Ok(vec![v[0] / 100.0 * v[1]]),
        ),
        Rule::new(
            "lithium_inventory_loss_to_percent",
            vec![names::LLI_ABSOLUTE.into(), names::INITIAL_LITHIUM_INVENTORY.into()],
            vec![names::LLI_PERCENT.into()],
            |v| Ok(vec![v[0] / positive("initial lithium inventory", v[1])? * 100.0]),
        ),
    ]
}

fn loss_rules(e: Electrode) -> Vec<Rule> {
    let id = |name: &str| format!("{}_{}", e.short(), name);

    vec![
        Rule::new(
            id("lithium_loss_from_active_material_loss"),
            vec![e.active_material_loss(), e.capacity(), e.initial_stoichiometry()],
            vec![e.lithium_loss_from_active_material_loss()],
            |v| Ok(vec![v[0] / 100.0 * v[1] * v[2]]),
        ),
        Rule::new(
            id("available_capacity"),
            vec![e.capacity(), e.active_material_loss(), e.non_stoichiometric_loss()],
            vec![e.available_capacity()],
            |v| {
                let lam = fraction("active material loss", v[1] / 100.0)?;
                let nsl = fraction("non-stoichiometric loss", v[2])?;
                Ok(vec![v[0] * (1.0 - lam) * (1.0 - nsl)])
            },
        ),
    ]
}

fn inventory_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "total_lithium_inventory_loss",
            vec![
                names::LLI_ABSOLUTE.into(),
                Electrode::Negative.lithium_loss_from_active_material_loss(),
                Electrode::Positive.lithium_loss_from_active_material_loss(),
            ],
            vec![names::TOTAL_LLI.into()],
            |v| Ok(vec![v[0] + v[1] + v[2]]),
        ),
        Rule::new(
            "lithium_inventory",
            vec![names::INITIAL_LITHIUM_INVENTORY.into(), names::TOTAL_LLI.into()],
            vec![names::LITHIUM_INVENTORY.into()],
            |v| Ok(vec![v[0] - v[1]]),
        ),
    ]
}

fn default_rules() -> Vec<DefaultRule> {
    let mut defaults = vec![DefaultRule {
        quantity: names::LLI_PERCENT.into(),
        value: 0.0,
        unless: vec![names::LLI_ABSOLUTE.into()],
        reason: "no loss of lithium inventory",
    }];
    for e in Electrode::ALL {
        defaults.push(DefaultRule {
            quantity: e.active_material_loss(),
            value: 0.0,
            unless: Vec::new(),
            reason: "no loss of active material",
        });
        defaults.push(DefaultRule {
            quantity: e.non_stoichiometric_loss(),
            value: 0.0,
            unless: Vec::new(),
            reason: "no non-stoichiometric loss of capacity",
        });
    }
    defaults
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::Provenance;

    fn store_with(values: &[(&str, f64)]) -> ParameterStore {
        let mut store = ParameterStore::default();
        store.supply(names::ELECTROLYTE_DENSITY, 1276.0);
        for (name, value) in values {
            store.supply(name, *value);
        }
        store
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_electrolyte_density_is_required() {
        let mut store = ParameterStore::default();
        let err = Resolver::standard().resolve(&mut store).unwrap_err();
        assert!(matches!(err, TeaError::MissingRequired(name) if name == names::ELECTROLYTE_DENSITY));
    }

    #[test]
    fn test_rule_ids_are_unique() {
        let resolver = Resolver::standard();
        let mut ids: Vec<_> = resolver.rules().iter().map(|r| r.id.clone()).collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_every_rule_output_is_distinct_from_its_inputs() {
        for rule in Resolver::standard().rules() {
            for output in &rule.outputs {
                assert!(!rule.inputs.contains(output), "{} reads its own output", rule.id);
            }
        }
    }

    #[test]
    fn test_separator_density_from_material_density() {
        let rule = Resolver::standard().rule("separator_density_from_material").unwrap().clone();
        let out = rule.apply(&[0.5, 1276.0, 900.0]).unwrap();
        assert!(close(out[0], 0.5 * 1276.0 + 0.5 * 900.0));
    }

    #[test]
    fn test_separator_porosity_back_calculated_from_both_densities() {
        let mut store = store_with(&[
            (names::SEPARATOR_DRY_DENSITY, 450.0),
            (names::SEPARATOR_MATERIAL_DENSITY, 900.0),
        ]);
        Resolver::standard().resolve(&mut store).unwrap();

        assert!(close(store.number(names::SEPARATOR_POROSITY).unwrap(), 0.5));
        assert_eq!(store.provenance(names::SEPARATOR_POROSITY), Some(Provenance::Derived));
        assert!(close(store.number(names::SEPARATOR_DENSITY).unwrap(), 0.5 * 1276.0 + 450.0));
        assert!(store
            .notes()
            .iter()
            .any(|n| n.quantity == names::SEPARATOR_POROSITY && n.kind == NoteKind::Derived));
    }

    #[test]
    fn test_supplied_porosity_wins_over_densities() {
        let mut store = store_with(&[
            (names::SEPARATOR_POROSITY, 0.4),
            (names::SEPARATOR_DRY_DENSITY, 450.0),
            (names::SEPARATOR_MATERIAL_DENSITY, 900.0),
        ]);
        Resolver::standard().resolve(&mut store).unwrap();

        assert_eq!(store.number(names::SEPARATOR_POROSITY), Some(0.4));
        assert!(store
            .notes()
            .iter()
            .any(|n| n.quantity == names::SEPARATOR_POROSITY && n.kind == NoteKind::Conflict));
    }

    #[test]
    fn test_wet_density_round_trips_through_dry_density() {
        let e = Electrode::Negative;
        let mut store = store_with(&[(&e.density(), 1555.0), (&e.porosity(), 0.329)]);
        Resolver::standard().resolve(&mut store).unwrap();

        let dry = store.number(&e.dry_density()).unwrap();
        assert!(close(dry + 0.329 * 1276.0, 1555.0));
        // Recombination agrees, so no conflict is raised
        assert!(store.notes().iter().all(|n| n.kind != NoteKind::Conflict));
    }

    #[test]
    fn test_composition_from_mass_fractions() {
        let e = Electrode::Positive;
        let mut store = store_with(&[
            (&e.porosity(), 0.3),
            (&e.binder_mass_fraction(), 0.04),
            (&e.additive_mass_fraction(), 0.04),
            (&e.binder_density(), 1780.0),
            (&e.additive_density(), 1800.0),
            (&e.active_density(), 4750.0),
        ]);
        Resolver::standard().resolve(&mut store).unwrap();

        let w_a = store.number(&e.active_mass_fraction()).unwrap();
        assert!(close(w_a, 0.92));
        let rho_i = store.number(&e.inactive_density()).unwrap();
        assert!(close(rho_i, 0.08 / (0.04 / 1780.0 + 0.04 / 1800.0)));

        let phi_a = store.number(&e.active_volume_fraction()).unwrap();
        let expected = 0.7 * (0.92 / 4750.0) / (0.92 / 4750.0 + 0.08 / rho_i);
        assert!(close(phi_a, expected));

        // Mass fraction recomputed from the volume fractions matches the input
        let dry = store.number(&e.dry_density()).unwrap();
        assert!(close(phi_a * 4750.0 / dry, 0.92));
        let wet = store.number(&e.density()).unwrap();
        assert!(close(wet, dry + 0.3 * 1276.0));
    }

    #[test]
    fn test_inactive_density_skipped_for_dense_electrode() {
        let e = Electrode::Negative;
        let mut store = store_with(&[
            (&e.porosity(), 0.0),
            (&e.active_volume_fraction(), 1.0),
            (&e.density(), 534.0),
            (&e.active_density(), 534.0),
        ]);
        Resolver::standard().resolve(&mut store).unwrap();

        assert!(store.number(&e.inactive_density()).is_none());
        assert!(store
            .notes()
            .iter()
            .any(|n| n.kind == NoteKind::Skipped && n.message.contains("inactive_density_from_dry_density")));
    }

    #[test]
    fn test_max_concentration_and_capacity_are_bidirectional() {
        let e = Electrode::Negative;
        let mut forward = store_with(&[(&e.active_capacity(), 372.0), (&e.active_density(), 2266.0)]);
        Resolver::standard().resolve(&mut forward).unwrap();
        let c_max = forward.number(&e.max_concentration()).unwrap();
        assert!(close(c_max, 372.0 * 2266.0 * 3600.0 / 96485.0));

        let mut backward = store_with(&[(&e.max_concentration(), c_max), (&e.active_density(), 2266.0)]);
        Resolver::standard().resolve(&mut backward).unwrap();
        assert!(close(backward.number(&e.active_capacity()).unwrap(), 372.0));
    }

    #[test]
    fn test_thickness_from_np_ratio() {
        let n = Electrode::Negative;
        let p = Electrode::Positive;
        let mut store = store_with(&[
            (names::THEORETICAL_NP_RATIO, 1.1),
            (&n.max_concentration(), 30000.0),
            (&n.active_volume_fraction(), 0.6),
            (&p.max_concentration(), 50000.0),
            (&p.active_volume_fraction(), 0.5),
            (&p.thickness(), 60e-6),
        ]);
        Resolver::standard().resolve(&mut store).unwrap();

        let q_p = store.number(&p.capacity()).unwrap();
        let q_n = store.number(&n.capacity()).unwrap();
        assert!(close(q_n / q_p, 1.1));
        assert_eq!(store.provenance(&n.thickness()), Some(Provenance::Derived));
    }

    #[test]
    fn test_np_ratio_from_both_thicknesses() {
        let n = Electrode::Negative;
        let p = Electrode::Positive;
        let mut store = store_with(&[
            (&n.max_concentration(), 30000.0),
            (&n.active_volume_fraction(), 0.6),
            (&n.thickness(), 80e-6),
            (&p.max_concentration(), 50000.0),
            (&p.active_volume_fraction(), 0.5),
            (&p.thickness(), 60e-6),
        ]);
        Resolver::standard().resolve(&mut store).unwrap();

        let ratio = store.number(names::THEORETICAL_NP_RATIO).unwrap();
        assert!(close(ratio, (30000.0 * 0.6 * 80e-6) / (50000.0 * 0.5 * 60e-6)));
    }

    #[test]
    fn test_lithium_inventory_with_losses() {
        let n = Electrode::Negative;
        let p = Electrode::Positive;
        let mut store = store_with(&[
            (&n.max_concentration(), 30000.0),
            (&n.active_volume_fraction(), 0.6),
            (&n.thickness(), 80e-6),
            (&n.initial_concentration(), 3000.0),
            (&p.max_concentration(), 50000.0),
            (&p.active_volume_fraction(), 0.5),
            (&p.thickness(), 60e-6),
            (&p.initial_concentration(), 45000.0),
            (names::LLI_PERCENT, 10.0),
            (&p.active_material_loss(), 5.0),
        ]);
        Resolver::standard().resolve(&mut store).unwrap();

        let k = AREAL_CAPACITY_FACTOR;
        let initial = (3000.0 * 0.6 * 80e-6 + 45000.0 * 0.5 * 60e-6) * k;
        assert!(close(store.number(names::INITIAL_LITHIUM_INVENTORY).unwrap(), initial));
        assert!(close(store.number(names::LLI_ABSOLUTE).unwrap(), 0.1 * initial));

        let q_p = 50000.0 * k * 0.5 * 60e-6;
        let lam_loss = 0.05 * q_p * 0.9;
        assert!(close(store.number(&p.lithium_loss_from_active_material_loss()).unwrap(), lam_loss));
        assert_eq!(store.number(&n.lithium_loss_from_active_material_loss()), Some(0.0));

        let total = store.number(names::TOTAL_LLI).unwrap();
        assert!(close(total, 0.1 * initial + lam_loss));
        assert!(close(store.number(names::LITHIUM_INVENTORY).unwrap(), initial - total));
        assert!(close(store.number(&p.available_capacity()).unwrap(), 0.95 * q_p));
        assert_eq!(store.provenance(&n.active_material_loss()), Some(Provenance::Defaulted));
    }

    #[test]
    fn test_absolute_inventory_loss_suppresses_percent_default() {
        let mut store = store_with(&[(names::LLI_ABSOLUTE, 0.2)]);
        Resolver::standard().resolve(&mut store).unwrap();
        assert!(store.number(names::LLI_PERCENT).is_none());
    }

    #[test]
    fn test_unresolvable_quantities_stay_absent() {
        let e = Electrode::Negative;
        let mut store = store_with(&[(&e.porosity(), 0.3)]);
        Resolver::standard().resolve(&mut store).unwrap();
        assert!(store.get(&e.active_volume_fraction()).is_none());
        assert!(store.get(&e.dry_density()).is_none());
    }
}
