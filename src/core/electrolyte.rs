//! Electrolyte excess
//!
//! The amount of electrolyte can be given in any of five equivalent forms.
//! The first one present (in [`ExcessInput::ALL`] order) is converted into
//! all the others. Without any of them the pores are taken as exactly filled.

use serde::Serialize;

use crate::core::constants::{KG_M3_TO_MG_UL, MASS_LOADING_FACTOR, UL_PER_CM2_PER_M};
use crate::core::error::{TeaError, TeaResult};
use crate::core::names::{self, Electrode};
use crate::core::store::ParameterStore;

const CONSUMER: &str = "electrolyte excess";

/// Form in which the electrolyte amount was supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcessInput {
    /// Electrolyte volume over pore volume
    ExcessRatio,
    VolumeLoading,
    MassLoading,
    /// Electrolyte mass over stack capacity [g.A-1.h-1]
    CapacityRatio,
    /// Electrolyte mass over active material mass
    ActiveMassRatio,
    /// None supplied, pores filled
    Default,
}

impl ExcessInput {
    pub const ALL: [ExcessInput; 5] = [
        ExcessInput::ExcessRatio,
        ExcessInput::VolumeLoading,
        ExcessInput::MassLoading,
        ExcessInput::CapacityRatio,
        ExcessInput::ActiveMassRatio,
    ];

    pub fn quantity(self) -> &'static str {
        match self {
            ExcessInput::ExcessRatio | ExcessInput::Default => names::ELECTROLYTE_EXCESS_RATIO,
            ExcessInput::VolumeLoading => names::ELECTROLYTE_VOLUME_LOADING,
            ExcessInput::MassLoading => names::ELECTROLYTE_MASS_LOADING,
            ExcessInput::CapacityRatio => names::ELECTROLYTE_TO_CAPACITY,
            ExcessInput::ActiveMassRatio => names::ELECTROLYTE_TO_ACTIVE_MASS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ElectrolyteExcess {
    pub input: ExcessInput,
    /// Pore volume of electrodes and separator [uL.cm-2]
    pub pore_volume_loading: f64,
    pub excess_ratio: f64,
    /// [uL.cm-2]
    pub volume_loading: f64,
    /// [mg.cm-2]
    pub mass_loading: f64,
    /// [g.A-1.h-1]
    pub capacity_ratio: Option<f64>,
    pub active_mass_ratio: Option<f64>,
}

impl ElectrolyteExcess {
    pub fn rows(&self) -> Vec<(String, f64)> {
        let mut rows = vec![
            ("Pore volume loading [uL.cm-2]".to_string(), self.pore_volume_loading),
            (names::ELECTROLYTE_EXCESS_RATIO.to_string(), self.excess_ratio),
            (names::ELECTROLYTE_VOLUME_LOADING.to_string(), self.volume_loading),
            (names::ELECTROLYTE_MASS_LOADING.to_string(), self.mass_loading),
        ];
        if let Some(v) = self.capacity_ratio {
            rows.push((names::ELECTROLYTE_TO_CAPACITY.to_string(), v));
        }
        if let Some(v) = self.active_mass_ratio {
            rows.push((names::ELECTROLYTE_TO_ACTIVE_MASS.to_string(), v));
        }
        rows
    }
}

/// Pore volume per unit area [uL.cm-2]
pub fn pore_volume_loading(store: &ParameterStore) -> TeaResult<f64> {
    let mut pores = store.require(names::SEPARATOR_POROSITY, CONSUMER)?
        * store.require(names::SEPARATOR_THICKNESS, CONSUMER)?;
    for e in Electrode::ALL {
        pores += store.require(&e.porosity(), CONSUMER)? * store.require(&e.thickness(), CONSUMER)?;
    }
    Ok(pores * UL_PER_CM2_PER_M)
}

fn active_mass_loading(store: &ParameterStore) -> Option<f64> {
    Electrode::ALL
        .into_iter()
        .map(|e| {
            Some(
                store.number(&e.active_volume_fraction())?
                    * store.number(&e.active_density())?
                    * store.number(&e.thickness())?
                    * MASS_LOADING_FACTOR,
            )
        })
        .sum()
}

/// Convert the supplied electrolyte amount into every form
///
/// `capacity` is the stack capacity [mA.h.cm-2], needed only for the
/// capacity ratio.
pub fn calculate(store: &ParameterStore, capacity: Option<f64>) -> TeaResult<ElectrolyteExcess> {
    let pores = pore_volume_loading(store)?;
    let rho = store.require(names::ELECTROLYTE_DENSITY, CONSUMER)? * KG_M3_TO_MG_UL;
    let active_mass = active_mass_loading(store);

    let supplied = ExcessInput::ALL
        .into_iter()
        .find_map(|input| store.number(input.quantity()).map(|v| (input, v)));

    let (input, volume_loading) = match supplied {
        Some((ExcessInput::ExcessRatio, ratio)) => (ExcessInput::ExcessRatio, ratio * pores),
        Some((ExcessInput::VolumeLoading, v)) => (ExcessInput::VolumeLoading, v),
        Some((ExcessInput::MassLoading, m)) => (ExcessInput::MassLoading, m / rho),
        Some((ExcessInput::CapacityRatio, ratio)) => {
            let q = capacity.ok_or_else(|| TeaError::missing("Capacity [mA.h.cm-2]", CONSUMER))?;
            // g.A-1.h-1 is mg per mA.h
            (ExcessInput::CapacityRatio, ratio * q / rho)
        }
        Some((ExcessInput::ActiveMassRatio, ratio)) => {
            let m = active_mass.ok_or_else(|| {
                TeaError::missing(Electrode::Negative.active_volume_fraction(), CONSUMER)
            })?;
            (ExcessInput::ActiveMassRatio, ratio * m / rho)
        }
        Some((ExcessInput::Default, _)) | None => {
            tracing::warn!(
                "Missing electrolyte amount, '{}' = 1 has been used (pores exactly filled)",
                names::ELECTROLYTE_EXCESS_RATIO
            );
            (ExcessInput::Default, pores)
        }
    };

    let mass_loading = volume_loading * rho;
    Ok(ElectrolyteExcess {
        input,
        pore_volume_loading: pores,
        excess_ratio: if pores > 0.0 { volume_loading / pores } else { 0.0 },
        volume_loading,
        mass_loading,
        capacity_ratio: capacity.filter(|q| *q > 0.0).map(|q| mass_loading / q),
        active_mass_ratio: active_mass.filter(|m| *m > 0.0).map(|m| mass_loading / m),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        let mut store = ParameterStore::default();
        store.supply(names::ELECTROLYTE_DENSITY, 1200.0);
        store.supply(names::SEPARATOR_POROSITY, 0.5);
        store.supply(names::SEPARATOR_THICKNESS, 20e-6);
        for e in Electrode::ALL {
            store.supply(&e.porosity(), 0.3);
            store.supply(&e.thickness(), 50e-6);
            store.supply(&e.active_volume_fraction(), 0.6);
            store.supply(&e.active_density(), 2000.0);
        }
        store
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_fills_pores() {
        let excess = calculate(&store(), None).unwrap();
        assert_eq!(excess.input, ExcessInput::Default);
        // (0.5 * 20 + 2 * 0.3 * 50) um = 40 um of pores = 4 uL.cm-2
        assert!(close(excess.pore_volume_loading, 4.0));
        assert!(close(excess.excess_ratio, 1.0));
        assert!(close(excess.mass_loading, 4.8));
        assert!(excess.capacity_ratio.is_none());
    }

    #[test]
    fn test_every_form_agrees() {
        let reference = {
            let mut s = store();
            s.supply(names::ELECTROLYTE_EXCESS_RATIO, 1.5);
            calculate(&s, Some(3.0)).unwrap()
        };
        let forms = [
            (names::ELECTROLYTE_VOLUME_LOADING, reference.volume_loading),
            (names::ELECTROLYTE_MASS_LOADING, reference.mass_loading),
            (names::ELECTROLYTE_TO_CAPACITY, reference.capacity_ratio.unwrap()),
            (names::ELECTROLYTE_TO_ACTIVE_MASS, reference.active_mass_ratio.unwrap()),
        ];
        for (name, value) in forms {
            let mut s = store();
            s.supply(name, value);
            let excess = calculate(&s, Some(3.0)).unwrap();
            assert!(close(excess.excess_ratio, 1.5), "{} gave {}", name, excess.excess_ratio);
        }
    }

    #[test]
    fn test_capacity_ratio_needs_capacity() {
        let mut s = store();
        s.supply(names::ELECTROLYTE_TO_CAPACITY, 2.0);
        assert!(matches!(calculate(&s, None), Err(TeaError::MissingParameter { .. })));
    }
}
