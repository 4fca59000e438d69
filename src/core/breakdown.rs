//! Mass and volume breakdown of the stack
//!
//! Each compartment is split into its constituents (active material,
//! inactive material and electrolyte for the electrodes, dry sheet and
//! electrolyte for the separator). Every entry carries a volume fraction, a
//! volume loading [uL.cm-2], a density [mg.uL-1] and a mass loading
//! [mg.cm-2]. Current collectors are stored at their full thickness.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::constants::{KG_M3_TO_MG_UL, UL_PER_CM2_PER_M};
use crate::core::error::{TeaError, TeaResult};
use crate::core::names::{self, Compartment, Electrode};
use crate::core::resolver::ZERO_FRACTION;
use crate::core::store::ParameterStore;

const CONSUMER: &str = "stack breakdown";

/// Closure tolerance on volume fractions and mass loadings
pub const CLOSURE_TOLERANCE: f64 = 1e-7;

/// Constituent of a compartment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    ActiveMaterial,
    InactiveMaterial,
    Electrolyte,
    /// All solids of a compartment
    Dry,
}

impl Part {
    pub fn label(self) -> &'static str {
        match self {
            Part::ActiveMaterial => "active material",
            Part::InactiveMaterial => "inactive material",
            Part::Electrolyte => "electrolyte",
            Part::Dry => "dry",
        }
    }
}

/// Quantity reported for every breakdown entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    VolumeFraction,
    VolumeLoading,
    Density,
    MassLoading,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::VolumeFraction, Kind::VolumeLoading, Kind::Density, Kind::MassLoading];

    pub fn label(self) -> &'static str {
        match self {
            Kind::VolumeFraction => "volume fraction",
            Kind::VolumeLoading => "volume loading [uL.cm-2]",
            Kind::Density => "density [mg.uL-1]",
            Kind::MassLoading => "mass loading [mg.cm-2]",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownEntry {
    pub compartment: Compartment,
    /// `None` for the compartment as a whole
    pub part: Option<Part>,
    pub volume_fraction: f64,
    pub volume_loading: f64,
    pub density: f64,
    pub mass_loading: f64,
}

impl BreakdownEntry {
    fn new(compartment: Compartment, part: Option<Part>, volume_fraction: f64, thickness: f64, density: f64) -> Self {
        let volume_loading = volume_fraction * thickness * UL_PER_CM2_PER_M;
        let density = density * KG_M3_TO_MG_UL;
        Self {
            compartment,
            part,
            volume_fraction,
            volume_loading,
            density,
            mass_loading: volume_loading * density,
        }
    }

    /// e.g. "Negative electrode active material"
    pub fn name(&self) -> String {
        match self.part {
            Some(part) => format!("{} {}", self.compartment.label(), part.label()),
            None => self.compartment.label().to_string(),
        }
    }

    pub fn value(&self, kind: Kind) -> f64 {
        match kind {
            Kind::VolumeFraction => self.volume_fraction,
            Kind::VolumeLoading => self.volume_loading,
            Kind::Density => self.density,
            Kind::MassLoading => self.mass_loading,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StackBreakdown {
    entries: Vec<BreakdownEntry>,
}

impl StackBreakdown {
    pub fn entries(&self) -> &[BreakdownEntry] {
        &self.entries
    }

    pub fn entry(&self, compartment: Compartment, part: Option<Part>) -> Option<&BreakdownEntry> {
        self.entries
            .iter()
            .find(|e| e.compartment == compartment && e.part == part)
    }

    /// Look up a value by its full key, e.g. "Separator dry mass loading [mg.cm-2]"
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find_map(|entry| {
            let name = entry.name();
            let rest = key.strip_prefix(name.as_str())?.strip_prefix(' ')?;
            Kind::ALL
                .into_iter()
                .find(|kind| kind.label() == rest)
                .map(|kind| entry.value(kind))
        })
    }

    /// Flat key-value view of every entry
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        for entry in &self.entries {
            let name = entry.name();
            for kind in Kind::ALL {
                map.insert(format!("{} {}", name, kind.label()), entry.value(kind));
            }
        }
        map
    }

    /// Areal mass of one repeat unit, current collectors halved [mg.cm-2]
    pub fn stack_mass_loading(&self) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.part.is_none())
            .map(|e| e.mass_loading * e.compartment.stack_share())
            .sum()
    }
}

fn electrode_entries(store: &ParameterStore, electrode: Electrode) -> TeaResult<Vec<BreakdownEntry>> {
    let compartment = electrode.compartment();
    let rho_el = store.require(names::ELECTROLYTE_DENSITY, CONSUMER)?;
    let thickness = store.require(&electrode.thickness(), CONSUMER)?;
    let porosity = store.require(&electrode.porosity(), CONSUMER)?;
    let phi_a = store.require(&electrode.active_volume_fraction(), CONSUMER)?;
    let rho = store.require(&electrode.density(), CONSUMER)?;
    let rho_a = store.require(&electrode.active_density(), CONSUMER)?;

    let mut phi_i = 1.0 - porosity - phi_a;
    if phi_i < -CLOSURE_TOLERANCE {
        return Err(TeaError::BreakdownClosure {
            component: compartment.label().to_string(),
            detail: format!(
                "porosity ({}) and active material volume fraction ({}) exceed 1",
                porosity, phi_a
            ),
        });
    }

    let solids = 1.0 - porosity;
    let dry_mass = rho - porosity * rho_el;
    let rho_dry = if solids > 0.0 { dry_mass / solids } else { 0.0 };

    let (rho_active, rho_inactive) = if phi_i.abs() < ZERO_FRACTION {
        // Dense layer without binder: the active material carries all solids
        phi_i = 0.0;
        (rho_dry, 0.0)
    } else {
        (rho_a, (dry_mass - phi_a * rho_a) / phi_i)
    };
    if rho_inactive < 0.0 {
        tracing::warn!(
            "{} inactive material density is negative ({:.1} kg.m-3)",
            electrode.label(),
            rho_inactive
        );
    }

    Ok(vec![
        BreakdownEntry::new(compartment, None, 1.0, thickness, rho),
        BreakdownEntry::new(compartment, Some(Part::Dry), solids, thickness, rho_dry),
        BreakdownEntry::new(compartment, Some(Part::ActiveMaterial), phi_a, thickness, rho_active),
        BreakdownEntry::new(compartment, Some(Part::InactiveMaterial), phi_i, thickness, rho_inactive),
        BreakdownEntry::new(compartment, Some(Part::Electrolyte), porosity, thickness, rho_el),
    ])
}

fn separator_entries(store: &ParameterStore) -> TeaResult<Vec<BreakdownEntry>> {
    let rho_el = store.require(names::ELECTROLYTE_DENSITY, CONSUMER)?;
    let thickness = store.require(names::SEPARATOR_THICKNESS, CONSUMER)?;
    let porosity = store.require(names::SEPARATOR_POROSITY, CONSUMER)?;
    let rho = store.require(names::SEPARATOR_DENSITY, CONSUMER)?;

    let solids = 1.0 - porosity;
    let rho_dry = if solids > 0.0 {
        (rho - porosity * rho_el) / solids
    } else {
        0.0
    };

    let s = Compartment::Separator;
    Ok(vec![
        BreakdownEntry::new(s, None, 1.0, thickness, rho),
        BreakdownEntry::new(s, Some(Part::Dry), solids, thickness, rho_dry),
        BreakdownEntry::new(s, Some(Part::Electrolyte), porosity, thickness, rho_el),
    ])
}

fn current_collector_entry(store: &ParameterStore, compartment: Compartment) -> TeaResult<BreakdownEntry> {
    let rho = store.require(&compartment.density(), CONSUMER)?;
    let thickness = match store.number(&compartment.thickness()) {
        Some(l) => l,
        None => {
            tracing::warn!("Missing '{}', 0 has been used", compartment.thickness());
            0.0
        }
    };
    Ok(BreakdownEntry::new(compartment, None, 1.0, thickness, rho))
}

fn check_closure(entries: &[BreakdownEntry]) -> TeaResult<()> {
    let Some(whole) = entries.iter().find(|e| e.part.is_none()) else {
        return Ok(());
    };
    // Electrode solids are split further, so their dry row is a subtotal
    let split_solids = entries
        .iter()
        .any(|e| matches!(e.part, Some(Part::ActiveMaterial | Part::InactiveMaterial)));
    let constituents: Vec<_> = entries
        .iter()
        .filter(|e| match e.part {
            Some(Part::Dry) => !split_solids,
            Some(_) => true,
            None => false,
        })
        .collect();
    if constituents.is_empty() {
        return Ok(());
    }

    let fraction: f64 = constituents.iter().map(|e| e.volume_fraction).sum();
    if (fraction - 1.0).abs() > CLOSURE_TOLERANCE {
        return Err(TeaError::BreakdownClosure {
            component: whole.name(),
            detail: format!("volume fractions sum to {}", fraction),
        });
    }

    let mass: f64 = constituents.iter().map(|e| e.mass_loading).sum();
    let scale = whole.mass_loading.abs().max(1.0);
    if (mass - whole.mass_loading).abs() > CLOSURE_TOLERANCE * scale {
        return Err(TeaError::BreakdownClosure {
            component: whole.name(),
            detail: format!(
                "constituent mass loadings sum to {} mg.cm-2, expected {} mg.cm-2",
                mass, whole.mass_loading
            ),
        });
    }
    Ok(())
}

/// Build the breakdown from a resolved store
pub fn calculate(store: &ParameterStore) -> TeaResult<StackBreakdown> {
    let mut entries = Vec::new();
    for compartment in Compartment::ALL {
        let group = match compartment {
            Compartment::NegativeElectrode => electrode_entries(store, Electrode::Negative)?,
            Compartment::PositiveElectrode => electrode_entries(store, Electrode::Positive)?,
            Compartment::Separator => separator_entries(store)?,
            cc => vec![current_collector_entry(store, cc)?],
        };
        check_closure(&group)?;
        entries.extend(group);
    }
    Ok(StackBreakdown { entries })
}
