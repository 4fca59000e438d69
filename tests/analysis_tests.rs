//! End-to-end properties of the analysis through the library API

use tea::core::breakdown::{Kind, Part};
use tea::core::names::{self, Compartment, Electrode};
use tea::core::store::{ParameterTable, ParameterValue, Provenance};
use tea::entities::{ParameterSet, Tea};

fn builtin(name: &str) -> ParameterTable {
    ParameterSet::builtin(name).unwrap().to_table().unwrap()
}

fn overrides(values: &[(&str, f64)]) -> ParameterTable {
    values
        .iter()
        .map(|(name, v)| (name.to_string(), ParameterValue::Number(*v)))
        .collect()
}

#[test]
fn test_breakdown_closes_for_every_builtin() {
    for set in ["Ecker2015", "Chen2020"] {
        let tea = Tea::new(builtin(set), ParameterTable::new()).unwrap();
        let breakdown = tea.stack_breakdown().unwrap();

        for compartment in [Compartment::NegativeElectrode, Compartment::PositiveElectrode] {
            let fractions: f64 = [Part::ActiveMaterial, Part::InactiveMaterial, Part::Electrolyte]
                .into_iter()
                .map(|p| breakdown.entry(compartment, Some(p)).unwrap().volume_fraction)
                .sum();
            assert!((fractions - 1.0).abs() < 1e-7, "{} {}", set, compartment);
        }

        let separator: f64 = [Part::Dry, Part::Electrolyte]
            .into_iter()
            .map(|p| breakdown.entry(Compartment::Separator, Some(p)).unwrap().volume_fraction)
            .sum();
        assert!((separator - 1.0).abs() < 1e-7, "{}", set);

        for entry in breakdown.entries() {
            let expected = entry.value(Kind::VolumeLoading) * entry.value(Kind::Density);
            assert!((entry.value(Kind::MassLoading) - expected).abs() < 1e-7);
        }
    }
}

#[test]
fn test_wet_density_round_trip() {
    // Supplying only the wet density derives a dry density that recombines exactly
    let mut base = builtin("Ecker2015");
    base.remove("Negative electrode active material volume fraction");
    let tea = Tea::new(base.clone(), ParameterTable::new()).unwrap();
    let store = tea.store();

    let electrode = Electrode::Negative;
    let porosity = store.number(&electrode.porosity()).unwrap();
    let dry = store.number(&electrode.dry_density()).unwrap();
    let electrolyte = store.number(names::ELECTROLYTE_DENSITY).unwrap();
    let wet = base[&electrode.density()].as_number().unwrap();

    assert_eq!(store.provenance(&electrode.dry_density()), Some(Provenance::Derived));
    // Dry density is per electrode volume, so the pores add the electrolyte only
    assert!((dry + porosity * electrolyte - wet).abs() < 1e-9 * wet);
}

#[test]
fn test_window_round_trip_between_electrodes() {
    let positive = Tea::new(
        builtin("Chen2020"),
        overrides(&[
            ("Positive electrode minimum stoichiometry", 0.27),
            ("Positive electrode maximum stoichiometry", 0.85),
        ]),
    )
    .unwrap();
    let w = positive.stoichiometry().unwrap().window;

    let negative = Tea::new(
        builtin("Chen2020"),
        overrides(&[
            ("Negative electrode minimum stoichiometry", w.x0),
            ("Negative electrode maximum stoichiometry", w.x100),
        ]),
    )
    .unwrap();
    let back = negative.stoichiometry().unwrap().window;
    assert!((back.y100 - 0.27).abs() < 1e-9);
    assert!((back.y0 - 0.85).abs() < 1e-9);
}

#[test]
fn test_stack_capacity_is_limited_by_positive_loss() {
    let mut previous = f64::INFINITY;
    for loss in [0.0, 2.0, 4.0] {
        let tea = Tea::new(
            builtin("Ecker2015"),
            overrides(&[("Positive electrode loss of active material [%]", loss)]),
        )
        .unwrap();
        let capacity = tea.stack_energy().unwrap().capacity;
        assert!(capacity < previous, "loss {}%", loss);
        previous = capacity;
    }
}

#[test]
fn test_missing_collector_is_zeroed_and_reported() {
    let mut base = builtin("Ecker2015");
    base.remove("Positive current collector density [kg.m-3]");
    let tea = Tea::new(base, ParameterTable::new()).unwrap();
    let record = tea.stack_energy().unwrap();

    assert_eq!(record.missing_contributions.len(), 1);
    assert_eq!(record.missing_contributions[0].compartment, Compartment::PositiveCurrentCollector);
    // The breakdown has no partial form
    assert!(tea.stack_breakdown().is_err());
}
