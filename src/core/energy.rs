//! Stack capacity and energy densities

use serde::Serialize;

use crate::core::constants::MASS_LOADING_FACTOR;
use crate::core::error::{TeaError, TeaResult};
use crate::core::names::{self, Compartment, Electrode};
use crate::core::stoichiometry::{StoichiometryResult, StoichiometryWindow, WindowSource};
use crate::core::store::ParameterStore;

const CONSUMER: &str = "stack energy densities";

const FCE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct EnergyOptions {
    /// Points used to average an OCP curve over its window
    pub ocp_samples: usize,
}

impl Default for EnergyOptions {
    fn default() -> Self {
        Self { ocp_samples: 50 }
    }
}

/// Capacity figures of one electrode
#[derive(Debug, Clone, Serialize)]
pub struct ElectrodeCapacity {
    pub electrode: Electrode,
    /// Full theoretical areal capacity [mA.h.cm-2]
    pub theoretical_capacity: f64,
    /// After active material and non-stoichiometric losses [mA.h.cm-2]
    pub available_capacity: f64,
    /// Lower stoichiometry bound used for the practical capacity
    pub minimum_stoichiometry: f64,
    /// Upper stoichiometry bound used for the practical capacity
    pub maximum_stoichiometry: f64,
    /// [mA.h.cm-2]
    pub practical_capacity: f64,
    /// [Ah.L-1] of electrode coating
    pub volumetric_capacity: Option<f64>,
    /// [mA.h.g-1] of active material
    pub gravimetric_capacity: Option<f64>,
    /// [V]
    pub average_ocp: f64,
}

/// A compartment that could not contribute to the stack totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingContribution {
    pub compartment: Compartment,
    pub quantity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnergyRecord {
    pub window: StoichiometryWindow,
    pub window_source: WindowSource,
    pub lower_cutoff: Option<f64>,
    pub upper_cutoff: Option<f64>,
    pub negative: ElectrodeCapacity,
    pub positive: ElectrodeCapacity,
    pub theoretical_np_ratio: Option<f64>,
    pub practical_np_ratio: f64,
    /// Limiting practical capacity [mA.h.cm-2]
    pub capacity: f64,
    /// [V]
    pub stack_average_ocp: f64,
    /// Half current collectors included [m]
    pub stack_thickness: f64,
    /// Thickness-weighted, half current collectors included [kg.m-3]
    pub stack_density: f64,
    /// [Ah.L-1]
    pub volumetric_capacity: f64,
    /// [Wh.L-1]
    pub volumetric_energy_density: f64,
    /// [Ah.kg-1]
    pub gravimetric_capacity: f64,
    /// [Wh.kg-1]
    pub gravimetric_energy_density: f64,
    pub first_cycle_efficiency: Option<f64>,
    pub missing_contributions: Vec<MissingContribution>,
}

impl EnergyRecord {
    pub fn electrode(&self, electrode: Electrode) -> &ElectrodeCapacity {
        match electrode {
            Electrode::Negative => &self.negative,
            Electrode::Positive => &self.positive,
        }
    }

    /// Areal stack energy [mW.h.cm-2]
    pub fn areal_energy(&self) -> f64 {
        self.capacity * self.stack_average_ocp
    }

    /// Energy-density rows as (name, value)
    pub fn rows(&self) -> Vec<(String, f64)> {
        let mut rows = Vec::new();
        for e in [&self.negative, &self.positive] {
            let electrode = e.electrode;
            rows.push((electrode.capacity(), e.theoretical_capacity));
            rows.push((electrode.practical_capacity(), e.practical_capacity));
            if let Some(v) = e.volumetric_capacity {
                rows.push((format!("{} practical volumetric capacity [Ah.L-1]", electrode.label()), v));
            }
            if let Some(v) = e.gravimetric_capacity {
                rows.push((format!("{} practical gravimetric capacity [mA.h.g-1]", electrode.label()), v));
            }
        }
        if let Some(ratio) = self.theoretical_np_ratio {
            rows.push((names::THEORETICAL_NP_RATIO.to_string(), ratio));
        }
        rows.push(("Practical n/p ratio".to_string(), self.practical_np_ratio));
        rows.push(("Capacity [mA.h.cm-2]".to_string(), self.capacity));
        rows.push((Electrode::Negative.average_ocp(), self.negative.average_ocp));
        rows.push((Electrode::Positive.average_ocp(), self.positive.average_ocp));
        rows.push((names::STACK_AVERAGE_OCP.to_string(), self.stack_average_ocp));
        rows.push(("Areal stack energy [mW.h.cm-2]".to_string(), self.areal_energy()));
        rows.push(("Stack thickness [m]".to_string(), self.stack_thickness));
        rows.push(("Stack density [kg.m-3]".to_string(), self.stack_density));
        rows.push(("Volumetric stack capacity [Ah.L-1]".to_string(), self.volumetric_capacity));
        rows.push((
            "Volumetric stack energy density [Wh.L-1]".to_string(),
            self.volumetric_energy_density,
        ));
        rows.push(("Gravimetric stack capacity [Ah.kg-1]".to_string(), self.gravimetric_capacity));
        rows.push((
            "Gravimetric stack energy density [Wh.kg-1]".to_string(),
            self.gravimetric_energy_density,
        ));
        rows
    }

    /// Stoichiometry window, cut-off and efficiency rows as (name, value)
    pub fn capacity_rows(&self) -> Vec<(String, f64)> {
        let w = &self.window;
        let mut rows = vec![
            ("Negative electrode stoichiometry at 0% SoC".to_string(), w.x0),
            ("Negative electrode stoichiometry at 100% SoC".to_string(), w.x100),
            ("Positive electrode stoichiometry at 100% SoC".to_string(), w.y100),
            ("Positive electrode stoichiometry at 0% SoC".to_string(), w.y0),
        ];
        if let Some(v) = self.lower_cutoff {
            rows.push((names::LOWER_VOLTAGE_CUTOFF.to_string(), v));
        }
        if let Some(v) = self.upper_cutoff {
            rows.push((names::UPPER_VOLTAGE_CUTOFF.to_string(), v));
        }
        for e in [&self.negative, &self.positive] {
            rows.push((e.electrode.available_capacity(), e.available_capacity));
            rows.push((e.electrode.practical_capacity(), e.practical_capacity));
        }
        rows.push(("Capacity [mA.h.cm-2]".to_string(), self.capacity));
        if let Some(v) = self.first_cycle_efficiency {
            rows.push(("First cycle coulombic efficiency".to_string(), v));
        }
        rows
    }
}

fn electrode_capacity(
    store: &ParameterStore,
    electrode: Electrode,
    window: &StoichiometryWindow,
    options: &EnergyOptions,
) -> TeaResult<ElectrodeCapacity> {
    let theoretical_capacity = store.require(&electrode.capacity(), CONSUMER)?;
    let available_capacity = store.require(&electrode.available_capacity(), CONSUMER)?;

    // Without a supplied limit the negative electrode may be lithiated up to
    // its full capacity, which counts any excess above x100 as usable
    let (minimum_stoichiometry, maximum_stoichiometry) = match electrode {
        Electrode::Negative => (
            window.x0,
            store.number(&electrode.maximum_stoichiometry()).unwrap_or(1.0),
        ),
        Electrode::Positive => (window.y100, window.y0),
    };
    let practical_capacity = store
        .number(&electrode.practical_capacity())
        .unwrap_or(available_capacity * (maximum_stoichiometry - minimum_stoichiometry));

    let thickness = store.number(&electrode.thickness());
    let volumetric_capacity = thickness.filter(|l| *l > 0.0).map(|l| practical_capacity / l / 100.0);

    let active_mass = match (
        store.number(&electrode.active_volume_fraction()),
        store.number(&electrode.active_density()),
        thickness,
    ) {
        (Some(phi), Some(rho), Some(l)) => Some(phi * rho * l * MASS_LOADING_FACTOR),
        _ => None,
    };
    let gravimetric_capacity = active_mass.filter(|m| *m > 0.0).map(|m| practical_capacity / m * 1000.0);

    let average_ocp = match store.number(&electrode.average_ocp()) {
        Some(v) => v,
        None => {
            let curve = store
                .curve(&electrode.ocp())
                .ok_or_else(|| TeaError::missing(electrode.ocp(), CONSUMER))?;
            let (from, to) = match electrode {
                Electrode::Negative => (window.x0, window.x100),
                Electrode::Positive => (window.y0, window.y100),
            };
            curve.mean_between(from, to, options.ocp_samples)
        }
    };

    Ok(ElectrodeCapacity {
        electrode,
        theoretical_capacity,
        available_capacity,
        minimum_stoichiometry,
        maximum_stoichiometry,
        practical_capacity,
        volumetric_capacity,
        gravimetric_capacity,
        average_ocp,
    })
}

/// Thickness and thickness-weighted density of one repeat unit
pub fn stack_geometry(store: &ParameterStore) -> TeaResult<(f64, f64, Vec<MissingContribution>)> {
    let mut missing = Vec::new();
    let mut thickness = 0.0;
    let mut areal_mass = 0.0;

    for compartment in Compartment::ALL {
        let share = compartment.stack_share();
        let Some(l) = store.number(&compartment.thickness()) else {
            tracing::warn!("Missing '{}'", compartment.thickness());
            missing.push(MissingContribution {
                compartment,
                quantity: compartment.thickness(),
            });
            continue;
        };
        thickness += l * share;

        match store.number(&compartment.density()) {
            Some(rho) => areal_mass += l * share * rho,
            None => {
                tracing::warn!("Missing '{}'", compartment.density());
                missing.push(MissingContribution {
                    compartment,
                    quantity: compartment.density(),
                });
            }
        }
    }

    if thickness <= 0.0 {
        return Err(TeaError::ZeroStackThickness);
    }
    Ok((thickness, areal_mass / thickness, missing))
}

/// Discharge capacity over the first charge from the as-made positive lithiation
///
/// Only defined for an electrode made at or above its discharged state `y0`.
fn coulombic_efficiency(capacity: f64, positive_capacity: f64, y_init: f64, window: &StoichiometryWindow) -> Option<f64> {
    if y_init < window.y0 - FCE_TOLERANCE {
        tracing::warn!(
            "Positive electrode initial stoichiometry ({:.4}) is below y0 ({:.4}), \
             first cycle efficiency is not reported",
            y_init,
            window.y0
        );
        return None;
    }
    let charge = positive_capacity * (y_init - window.y100);
    let efficiency = capacity / charge;
    if !(charge > 0.0 && efficiency <= 1.0 + FCE_TOLERANCE) {
        tracing::warn!("First cycle efficiency of {:.4} is not physical and is not reported", efficiency);
        return None;
    }
    Some(efficiency)
}

/// Compute the energy record from a resolved store and its stoichiometry window
pub fn calculate(
    store: &ParameterStore,
    stoichiometry: &StoichiometryResult,
    options: &EnergyOptions,
) -> TeaResult<EnergyRecord> {
    let window = stoichiometry.window;
    let negative = electrode_capacity(store, Electrode::Negative, &window, options)?;
    let positive = electrode_capacity(store, Electrode::Positive, &window, options)?;

    let practical_np_ratio = negative.practical_capacity / positive.practical_capacity;
    let capacity = negative.practical_capacity.min(positive.practical_capacity);

    let stack_average_ocp = store
        .number(names::STACK_AVERAGE_OCP)
        .unwrap_or(positive.average_ocp - negative.average_ocp);

    let (stack_thickness, stack_density, missing_contributions) = stack_geometry(store)?;

    // mA.h.cm-2 / m / 100 = Ah.L-1
    let volumetric_capacity = capacity / stack_thickness / 100.0;
    let volumetric_energy_density = stack_average_ocp * volumetric_capacity;
    let gravimetric_capacity = volumetric_capacity / stack_density * 1000.0;
    let gravimetric_energy_density = volumetric_energy_density / stack_density * 1000.0;

    let first_cycle_efficiency = store
        .number(&Electrode::Positive.initial_stoichiometry())
        .and_then(|y_init| coulombic_efficiency(capacity, positive.available_capacity, y_init, &window));

    let lower_cutoff = stoichiometry.lower_cutoff.or(store.number(names::LOWER_VOLTAGE_CUTOFF));
    let upper_cutoff = stoichiometry.upper_cutoff.or(store.number(names::UPPER_VOLTAGE_CUTOFF));

    tracing::debug!(
        capacity,
        stack_thickness,
        stack_density,
        gravimetric_energy_density,
        "stack energy densities"
    );

    Ok(EnergyRecord {
        window,
        window_source: stoichiometry.source,
        lower_cutoff,
        upper_cutoff,
        negative,
        positive,
        theoretical_np_ratio: store.number(names::THEORETICAL_NP_RATIO),
        practical_np_ratio,
        capacity,
        stack_average_ocp,
        stack_thickness,
        stack_density,
        volumetric_capacity,
        volumetric_energy_density,
        gravimetric_capacity,
        gravimetric_energy_density,
        first_cycle_efficiency,
        missing_contributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ocp::OcpCurve;

    fn window() -> StoichiometryResult {
        StoichiometryResult {
            window: StoichiometryWindow {
                x0: 0.0,
                x100: 0.8,
                y100: 0.2,
                y0: 1.0,
            },
            source: WindowSource::PositiveWindow,
            lower_cutoff: None,
            upper_cutoff: None,
            warnings: Vec::new(),
        }
    }

    fn store() -> ParameterStore {
        let mut store = ParameterStore::default();
        for (compartment, thickness, density) in [
            (Compartment::NegativeCurrentCollector, 10e-6, 8900.0),
            (Compartment::NegativeElectrode, 80e-6, 1500.0),
            (Compartment::Separator, 20e-6, 1000.0),
            (Compartment::PositiveElectrode, 60e-6, 3000.0),
            (Compartment::PositiveCurrentCollector, 20e-6, 2700.0),
        ] {
            store.supply(&compartment.thickness(), thickness);
            store.supply(&compartment.density(), density);
        }
        for (electrode, capacity) in [(Electrode::Negative, 2.4), (Electrode::Positive, 2.2)] {
            store.supply(&electrode.capacity(), capacity);
            store.supply(&electrode.available_capacity(), capacity);
        }
        store.supply(&Electrode::Negative.ocp(), OcpCurve::from_fn(|x| 0.5 - 0.5 * x));
        store.supply(&Electrode::Positive.ocp(), OcpCurve::from_fn(|y| 4.5 - y));
        store
    }

    #[test]
    fn test_stack_geometry_halves_current_collectors() {
        let (thickness, density, missing) = stack_geometry(&store()).unwrap();
        let expected = 5e-6 + 80e-6 + 20e-6 + 60e-6 + 10e-6;
        assert!((thickness - expected).abs() < 1e-15);
        let mass = 5e-6 * 8900.0 + 80e-6 * 1500.0 + 20e-6 * 1000.0 + 60e-6 * 3000.0 + 10e-6 * 2700.0;
        assert!((density - mass / expected).abs() < 1e-9);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_energy_from_linear_curves() {
        let record = calculate(&store(), &window(), &EnergyOptions::default()).unwrap();

        assert!((record.negative.practical_capacity - 2.4).abs() < 1e-12);
        assert!((record.positive.practical_capacity - 2.2 * 0.8).abs() < 1e-12);
        assert!((record.capacity - 1.76).abs() < 1e-12);
        // Linear curves average to their midpoint values
        assert!((record.negative.average_ocp - 0.3).abs() < 1e-12);
        assert!((record.positive.average_ocp - 3.9).abs() < 1e-12);
        assert!((record.stack_average_ocp - 3.6).abs() < 1e-12);

        let expected = 3.6 * 1.76 / record.stack_thickness / 100.0;
        assert!((record.volumetric_energy_density - expected).abs() < 1e-9);
        assert!(
            (record.gravimetric_energy_density - expected / record.stack_density * 1000.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_active_material_loss_lowers_capacity() {
        let baseline = calculate(&store(), &window(), &EnergyOptions::default()).unwrap();

        let mut degraded = store();
        degraded.supply(&Electrode::Positive.available_capacity(), 2.2 * 0.95);
        let record = calculate(&degraded, &window(), &EnergyOptions::default()).unwrap();

        assert!(record.positive.practical_capacity < baseline.positive.practical_capacity);
        assert!(record.capacity < baseline.capacity);
    }

    #[test]
    fn test_missing_compartment_is_zeroed_and_recorded() {
        let mut partial = ParameterStore::default();
        for (name, value) in store().iter() {
            if name != &Compartment::Separator.density() {
                partial.supply(name, value.value.clone());
            }
        }
        let record = calculate(&partial, &window(), &EnergyOptions::default()).unwrap();
        assert_eq!(
            record.missing_contributions,
            vec![MissingContribution {
                compartment: Compartment::Separator,
                quantity: Compartment::Separator.density(),
            }]
        );
    }

    #[test]
    fn test_zero_thickness_is_fatal() {
        let mut empty = ParameterStore::default();
        for (electrode, capacity) in [(Electrode::Negative, 2.4), (Electrode::Positive, 2.2)] {
            empty.supply(&electrode.capacity(), capacity);
            empty.supply(&electrode.available_capacity(), capacity);
            empty.supply(&electrode.average_ocp(), 1.0);
        }
        let err = calculate(&empty, &window(), &EnergyOptions::default()).unwrap_err();
        assert!(matches!(err, TeaError::ZeroStackThickness));
    }

    #[test]
    fn test_average_ocp_override_wins() {
        let mut s = store();
        s.supply(names::STACK_AVERAGE_OCP, 3.7);
        let record = calculate(&s, &window(), &EnergyOptions::default()).unwrap();
        assert_eq!(record.stack_average_ocp, 3.7);
    }

    #[test]
    fn test_first_cycle_efficiency() {
        let mut s = store();
        s.supply(&Electrode::Positive.initial_stoichiometry(), 1.0);
        let record = calculate(&s, &window(), &EnergyOptions::default()).unwrap();
        // Charged from y = 1.0 to 0.2, discharged back over the same window
        assert!((record.first_cycle_efficiency.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_cycle_efficiency_needs_as_made_lithiation() {
        let mut s = store();
        // A charged-state initial concentration sits below y0
        s.supply(&Electrode::Positive.initial_stoichiometry(), 0.3);
        let record = calculate(&s, &window(), &EnergyOptions::default()).unwrap();
        assert!(record.first_cycle_efficiency.is_none());
    }

    #[test]
    fn test_supplied_negative_maximum_bounds_practical_capacity() {
        let mut s = store();
        let record = calculate(&s, &window(), &EnergyOptions::default()).unwrap();
        assert_eq!(record.negative.maximum_stoichiometry, 1.0);

        s.supply(&Electrode::Negative.maximum_stoichiometry(), 0.6);
        let record = calculate(&s, &window(), &EnergyOptions::default()).unwrap();
        assert_eq!(record.negative.maximum_stoichiometry, 0.6);
        assert!((record.negative.practical_capacity - 2.4 * 0.6).abs() < 1e-12);
    }
}
