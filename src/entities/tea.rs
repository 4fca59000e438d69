//! Analysis instance
//!
//! A [`Tea`] owns one parameter store built from a base table and an
//! override table. Resolution runs once at construction; every result is
//! computed on first access and cached until [`Tea::reset`].

use std::cell::OnceCell;

use crate::core::breakdown::{self, StackBreakdown};
use crate::core::config::Config;
use crate::core::electrolyte::{self, ElectrolyteExcess};
use crate::core::energy::{self, EnergyRecord};
use crate::core::error::TeaResult;
use crate::core::names::{self, Electrode};
use crate::core::ocp::OcpCurve;
use crate::core::ragone::StackProfile;
use crate::core::resolver::Resolver;
use crate::core::stoichiometry::{self, StoichiometryResult};
use crate::core::store::{ParameterStore, ParameterTable, ResolutionNote};
use crate::entities::parameter_set::ParameterSet;

/// Return the cached value or compute, store and return it
fn cached<'a, T>(cell: &'a OnceCell<T>, compute: impl FnOnce() -> TeaResult<T>) -> TeaResult<&'a T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = compute()?;
    Ok(cell.get_or_init(|| value))
}

#[derive(Debug)]
pub struct Tea {
    label: String,
    base: ParameterTable,
    overrides: ParameterTable,
    config: Config,
    resolver: Resolver,
    store: ParameterStore,
    stoichiometry: OnceCell<StoichiometryResult>,
    breakdown: OnceCell<StackBreakdown>,
    energy: OnceCell<EnergyRecord>,
    electrolyte: OnceCell<ElectrolyteExcess>,
}

impl Tea {
    /// Build and resolve with the default configuration
    pub fn new(base: ParameterTable, overrides: ParameterTable) -> TeaResult<Self> {
        Self::with_config(base, overrides, Config::default())
    }

    pub fn with_config(base: ParameterTable, overrides: ParameterTable, config: Config) -> TeaResult<Self> {
        let resolver = Resolver::standard();
        let store = Self::resolve(&resolver, &base, &overrides, &config)?;
        Ok(Self {
            label: String::new(),
            base,
            overrides,
            config,
            resolver,
            store,
            stoichiometry: OnceCell::new(),
            breakdown: OnceCell::new(),
            energy: OnceCell::new(),
            electrolyte: OnceCell::new(),
        })
    }

    /// Build from a parameter set document, labelled with its title
    pub fn from_set(set: &ParameterSet, overrides: ParameterTable, config: Config) -> TeaResult<Self> {
        let mut tea = Self::with_config(set.to_table()?, overrides, config)?;
        tea.label = set.title.clone();
        Ok(tea)
    }

    fn resolve(
        resolver: &Resolver,
        base: &ParameterTable,
        overrides: &ParameterTable,
        config: &Config,
    ) -> TeaResult<ParameterStore> {
        let mut store = ParameterStore::from_tables(base, overrides, config.conflict_tolerance);
        resolver.resolve(&mut store)?;
        Ok(store)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn notes(&self) -> &[ResolutionNote] {
        self.store.notes()
    }

    pub fn stoichiometry(&self) -> TeaResult<&StoichiometryResult> {
        cached(&self.stoichiometry, || {
            stoichiometry::solve(
                &self.store,
                &self.config.window_options(),
                &self.config.equilibrium_solver(),
            )
        })
    }

    pub fn stack_breakdown(&self) -> TeaResult<&StackBreakdown> {
        cached(&self.breakdown, || breakdown::calculate(&self.store))
    }

    pub fn stack_energy(&self) -> TeaResult<&EnergyRecord> {
        cached(&self.energy, || {
            let window = self.stoichiometry()?;
            energy::calculate(&self.store, window, &self.config.energy_options())
        })
    }

    pub fn electrolyte_excess(&self) -> TeaResult<&ElectrolyteExcess> {
        cached(&self.electrolyte, || {
            let capacity = match self.stack_energy() {
                Ok(record) => Some(record.capacity),
                Err(e) => {
                    tracing::debug!("stack capacity unavailable for electrolyte excess: {}", e);
                    None
                }
            };
            electrolyte::calculate(&self.store, capacity)
        })
    }

    /// Stack summary handed to a discharge simulation
    pub fn stack_profile(&self) -> TeaResult<StackProfile> {
        let record = self.stack_energy()?;
        let window = record.window;
        let ocv = match (
            self.store.curve(&Electrode::Negative.ocp()),
            self.store.curve(&Electrode::Positive.ocp()),
        ) {
            (Some(n), Some(p)) if self.store.number(names::STACK_AVERAGE_OCP).is_none() => {
                let (n, p) = (n.clone(), p.clone());
                OcpCurve::from_fn(move |soc| p.evaluate(window.positive_at(soc)) - n.evaluate(window.negative_at(soc)))
            }
            _ => {
                let ocp = record.stack_average_ocp;
                OcpCurve::from_fn(move |_| ocp)
            }
        };
        Ok(StackProfile {
            label: self.label.clone(),
            capacity: record.capacity,
            thickness: record.stack_thickness,
            density: record.stack_density,
            ocv,
            lower_cutoff: record.lower_cutoff,
        })
    }

    /// Rebuild the store from the saved inputs and drop every cached result
    pub fn reset(&mut self) -> TeaResult<()> {
        self.store = Self::resolve(&self.resolver, &self.base, &self.overrides, &self.config)?;
        self.stoichiometry = OnceCell::new();
        self.breakdown = OnceCell::new();
        self.energy = OnceCell::new();
        self.electrolyte = OnceCell::new();
        Ok(())
    }
}
