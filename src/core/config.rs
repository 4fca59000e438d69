//! Layered configuration
//!
//! Built-in defaults, then the user file (`<config dir>/tea/config.yaml`),
//! then `tea.config.yaml` in the working directory, then an explicit file.
//! Each layer only overrides the keys it sets.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::energy::EnergyOptions;
use crate::core::ragone::QuasiStaticDischarge;
use crate::core::stoichiometry::{Bisection, WindowOptions};
use crate::yaml::{parse_yaml_file, YamlError};

pub const LOCAL_CONFIG_FILE: &str = "tea.config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagoneConfig {
    /// Area-specific resistance [Ohm.cm2]
    pub resistance: f64,
    pub soc_steps: usize,
}

impl Default for RagoneConfig {
    fn default() -> Self {
        let sim = QuasiStaticDischarge::default();
        Self {
            resistance: sim.resistance,
            soc_steps: sim.soc_steps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub ocp_samples: usize,
    pub stoichiometry_tolerance: f64,
    pub conflict_tolerance: f64,
    pub solver_tolerance: f64,
    pub solver_max_iterations: usize,
    /// Output format used when `--format` is not given
    pub default_format: Option<String>,
    pub ragone: RagoneConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocp_samples: 50,
            stoichiometry_tolerance: 1e-5,
            conflict_tolerance: 1e-9,
            solver_tolerance: 1e-12,
            solver_max_iterations: 200,
            default_format: None,
            ragone: RagoneConfig::default(),
        }
    }
}

/// One config file; every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub ocp_samples: Option<usize>,
    pub stoichiometry_tolerance: Option<f64>,
    pub conflict_tolerance: Option<f64>,
    pub solver_tolerance: Option<f64>,
    pub solver_max_iterations: Option<usize>,
    pub default_format: Option<String>,
    pub ragone: Option<RagoneLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RagoneLayer {
    pub resistance: Option<f64>,
    pub soc_steps: Option<usize>,
}

impl Config {
    /// Defaults plus the user and working-directory files
    ///
    /// Unreadable implicit files are skipped with a warning.
    pub fn load() -> Self {
        let mut config = Self::default();
        let implicit = [Self::user_config_path(), Some(PathBuf::from(LOCAL_CONFIG_FILE))];
        for path in implicit.into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match parse_yaml_file::<ConfigLayer>(&path) {
                Ok(layer) => {
                    tracing::debug!(path = %path.display(), "loaded config layer");
                    config.merge(layer);
                }
                Err(e) => tracing::warn!("Ignoring config file {}: {}", path.display(), e),
            }
        }
        config
    }

    /// [`Config::load`] followed by an explicit file, whose errors are fatal
    pub fn load_with(explicit: Option<&Path>) -> Result<Self, YamlError> {
        let mut config = Self::load();
        if let Some(path) = explicit {
            config.merge(parse_yaml_file::<ConfigLayer>(path)?);
        }
        Ok(config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "pybamm", "tea").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.ocp_samples {
            self.ocp_samples = v;
        }
        if let Some(v) = layer.stoichiometry_tolerance {
            self.stoichiometry_tolerance = v;
        }
        if let Some(v) = layer.conflict_tolerance {
            self.conflict_tolerance = v;
        }
        if let Some(v) = layer.solver_tolerance {
            self.solver_tolerance = v;
        }
        if let Some(v) = layer.solver_max_iterations {
            self.solver_max_iterations = v;
        }
        if layer.default_format.is_some() {
            self.default_format = layer.default_format;
        }
        if let Some(ragone) = layer.ragone {
            if let Some(v) = ragone.resistance {
                self.ragone.resistance = v;
            }
            if let Some(v) = ragone.soc_steps {
                self.ragone.soc_steps = v;
            }
        }
    }

    pub fn window_options(&self) -> WindowOptions {
        WindowOptions {
            tolerance: self.stoichiometry_tolerance,
        }
    }

    pub fn energy_options(&self) -> EnergyOptions {
        EnergyOptions {
            ocp_samples: self.ocp_samples,
        }
    }

    pub fn equilibrium_solver(&self) -> Bisection {
        Bisection {
            tolerance: self.solver_tolerance,
            max_iterations: self.solver_max_iterations,
        }
    }

    pub fn discharge(&self) -> QuasiStaticDischarge {
        QuasiStaticDischarge {
            resistance: self.ragone.resistance,
            soc_steps: self.ragone.soc_steps,
        }
    }
}
