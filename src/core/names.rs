//! Canonical quantity names
//!
//! Every quantity lives in the parameter store under one human-readable name
//! with its unit in brackets, e.g. `"Negative electrode porosity"` or
//! `"Separator density [kg.m-3]"`. Electrode- and compartment-specific names
//! are built here so there is exactly one spelling for each quantity.

use serde::{Deserialize, Serialize};

pub const ELECTROLYTE_DENSITY: &str = "Electrolyte density [kg.m-3]";
pub const LOWER_VOLTAGE_CUTOFF: &str = "Lower voltage cut-off [V]";
pub const UPPER_VOLTAGE_CUTOFF: &str = "Upper voltage cut-off [V]";
pub const STACK_AVERAGE_OCP: &str = "Stack average OCP [V]";
pub const THEORETICAL_NP_RATIO: &str = "Theoretical n/p ratio";

pub const INITIAL_LITHIUM_INVENTORY: &str = "Initial lithium inventory [mA.h.cm-2]";
pub const LLI_PERCENT: &str = "Loss of lithium inventory [%]";
pub const LLI_ABSOLUTE: &str = "Loss of lithium inventory [mA.h.cm-2]";
pub const TOTAL_LLI: &str = "Total loss of lithium inventory [mA.h.cm-2]";
pub const LITHIUM_INVENTORY: &str = "Lithium inventory [mA.h.cm-2]";

pub const SEPARATOR_POROSITY: &str = "Separator porosity";
pub const SEPARATOR_THICKNESS: &str = "Separator thickness [m]";
pub const SEPARATOR_DENSITY: &str = "Separator density [kg.m-3]";
pub const SEPARATOR_DRY_DENSITY: &str = "Separator dry density [kg.m-3]";
pub const SEPARATOR_MATERIAL_DENSITY: &str = "Separator material density [kg.m-3]";

pub const ELECTROLYTE_EXCESS_RATIO: &str = "Electrolyte excess ratio";
pub const ELECTROLYTE_VOLUME_LOADING: &str = "Electrolyte volume loading [uL.cm-2]";
pub const ELECTROLYTE_MASS_LOADING: &str = "Electrolyte mass loading [mg.cm-2]";
pub const ELECTROLYTE_TO_CAPACITY: &str = "Electrolyte to capacity ratio [g.A-1.h-1]";
pub const ELECTROLYTE_TO_ACTIVE_MASS: &str = "Electrolyte to active material mass ratio";

/// One of the two porous electrodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Electrode {
    Negative,
    Positive,
}

impl Electrode {
    pub const ALL: [Electrode; 2] = [Electrode::Negative, Electrode::Positive];

    /// Prefix used in quantity names, e.g. "Negative electrode"
    pub fn label(self) -> &'static str {
        match self {
            Electrode::Negative => "Negative electrode",
            Electrode::Positive => "Positive electrode",
        }
    }

    /// Lower-case form used inside concentration names
    pub fn short(self) -> &'static str {
        match self {
            Electrode::Negative => "negative",
            Electrode::Positive => "positive",
        }
    }

    pub fn other(self) -> Electrode {
        match self {
            Electrode::Negative => Electrode::Positive,
            Electrode::Positive => Electrode::Negative,
        }
    }

    pub fn compartment(self) -> Compartment {
        match self {
            Electrode::Negative => Compartment::NegativeElectrode,
            Electrode::Positive => Compartment::PositiveElectrode,
        }
    }

    fn key(self, suffix: &str) -> String {
        format!("{} {}", self.label(), suffix)
    }

    pub fn porosity(self) -> String {
        self.key("porosity")
    }

    pub fn thickness(self) -> String {
        self.key("thickness [m]")
    }

    pub fn active_volume_fraction(self) -> String {
        self.key("active material volume fraction")
    }

    pub fn active_mass_fraction(self) -> String {
        self.key("active material dry mass fraction")
    }

    pub fn binder_mass_fraction(self) -> String {
        self.key("binder dry mass fraction")
    }

    pub fn additive_mass_fraction(self) -> String {
        self.key("conductive additive dry mass fraction")
    }

    pub fn binder_density(self) -> String {
        self.key("binder density [kg.m-3]")
    }

    pub fn additive_density(self) -> String {
        self.key("conductive additive density [kg.m-3]")
    }

    pub fn active_density(self) -> String {
        self.key("active material density [kg.m-3]")
    }

    pub fn inactive_density(self) -> String {
        self.key("inactive material density [kg.m-3]")
    }

    pub fn dry_density(self) -> String {
        self.key("dry density [kg.m-3]")
    }

    /// Measured (electrolyte-filled) electrode density
    pub fn density(self) -> String {
        self.key("density [kg.m-3]")
    }

    pub fn max_concentration(self) -> String {
        format!("Maximum concentration in {} electrode [mol.m-3]", self.short())
    }

    pub fn initial_concentration(self) -> String {
        format!("Initial concentration in {} electrode [mol.m-3]", self.short())
    }

    pub fn active_capacity(self) -> String {
        self.key("active material capacity [mA.h.g-1]")
    }

    pub fn initial_stoichiometry(self) -> String {
        self.key("initial stoichiometry")
    }

    pub fn initial_lithium(self) -> String {
        self.key("initial lithium [mA.h.cm-2]")
    }

    /// Theoretical areal capacity (no window or loss correction)
    pub fn capacity(self) -> String {
        self.key("capacity [mA.h.cm-2]")
    }

    pub fn practical_capacity(self) -> String {
        self.key("practical capacity [mA.h.cm-2]")
    }

    pub fn active_material_loss(self) -> String {
        self.key("loss of active material [%]")
    }

    pub fn non_stoichiometric_loss(self) -> String {
        self.key("non-stoichiometric loss of capacity")
    }

    /// Theoretical capacity after active material and non-stoichiometric losses
    pub fn available_capacity(self) -> String {
        self.key("available capacity [mA.h.cm-2]")
    }

    pub fn lithium_loss_from_active_material_loss(self) -> String {
        self.key("lithium loss from active material loss [mA.h.cm-2]")
    }

    pub fn ocp(self) -> String {
        self.key("OCP [V]")
    }

    pub fn average_ocp(self) -> String {
        self.key("average OCP [V]")
    }

    pub fn minimum_stoichiometry(self) -> String {
        self.key("minimum stoichiometry")
    }

    pub fn maximum_stoichiometry(self) -> String {
        self.key("maximum stoichiometry")
    }
}

impl std::fmt::Display for Electrode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Electrode::Negative => write!(f, "negative electrode"),
            Electrode::Positive => write!(f, "positive electrode"),
        }
    }
}

/// A layer of the repeating stack unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compartment {
    NegativeCurrentCollector,
    NegativeElectrode,
    Separator,
    PositiveElectrode,
    PositiveCurrentCollector,
}

impl Compartment {
    /// Stack order from negative to positive current collector
    pub const ALL: [Compartment; 5] = [
        Compartment::NegativeCurrentCollector,
        Compartment::NegativeElectrode,
        Compartment::Separator,
        Compartment::PositiveElectrode,
        Compartment::PositiveCurrentCollector,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Compartment::NegativeCurrentCollector => "Negative current collector",
            Compartment::NegativeElectrode => "Negative electrode",
            Compartment::Separator => "Separator",
            Compartment::PositiveElectrode => "Positive electrode",
            Compartment::PositiveCurrentCollector => "Positive current collector",
        }
    }

    pub fn is_current_collector(self) -> bool {
        matches!(
            self,
            Compartment::NegativeCurrentCollector | Compartment::PositiveCurrentCollector
        )
    }

    /// Share of the layer that belongs to one repeat unit
    ///
    /// Current collector foils are coated on both sides and shared between
    /// adjacent cells, so only half of them counts towards a single stack.
    pub fn stack_share(self) -> f64 {
        if self.is_current_collector() {
            0.5
        } else {
            1.0
        }
    }

    pub fn thickness(self) -> String {
        format!("{} thickness [m]", self.label())
    }

    pub fn density(self) -> String {
        format!("{} density [kg.m-3]", self.label())
    }
}

impl std::fmt::Display for Compartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_electrode_names_match_compartment_names() {
        for electrode in Electrode::ALL {
            assert_eq!(electrode.thickness(), electrode.compartment().thickness());
            assert_eq!(electrode.density(), electrode.compartment().density());
        }
        assert_eq!(Compartment::Separator.thickness(), SEPARATOR_THICKNESS);
        assert_eq!(Compartment::Separator.density(), SEPARATOR_DENSITY);
    }

    #[test]
    fn test_concentration_names() {
        assert_eq!(
            Electrode::Negative.max_concentration(),
            "Maximum concentration in negative electrode [mol.m-3]"
        );
        assert_eq!(
            Electrode::Positive.initial_concentration(),
            "Initial concentration in positive electrode [mol.m-3]"
        );
    }

    #[test]
    fn test_current_collector_share() {
        let halves: Vec<_> = Compartment::ALL
            .iter()
            .filter(|c| c.stack_share() < 1.0)
            .collect();
        assert_eq!(
            halves,
            vec![
                &Compartment::NegativeCurrentCollector,
                &Compartment::PositiveCurrentCollector
            ]
        );
    }
}
