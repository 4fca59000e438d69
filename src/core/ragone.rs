//! Ragone sweep - energy against power over a range of discharge rates
//!
//! The sweep itself only needs the stack capacity, thickness, density and
//! open-circuit voltage of each analysis. The discharge is delegated to a
//! [`DischargeSimulator`]; [`QuasiStaticDischarge`] is a lumped-resistance
//! estimate that steps through the state of charge without time integration.

use serde::{Deserialize, Serialize};

use crate::core::ocp::OcpCurve;

/// What the rate of a sweep point means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DischargeMode {
    /// Constant current, rate in C
    Current,
    /// Constant power, rate in W.kg-1 of stack
    Power,
}

impl std::fmt::Display for DischargeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DischargeMode::Current => write!(f, "current"),
            DischargeMode::Power => write!(f, "power"),
        }
    }
}

/// The stack as seen by a discharge simulation
#[derive(Debug, Clone)]
pub struct StackProfile {
    pub label: String,
    /// [mA.h.cm-2]
    pub capacity: f64,
    /// [m]
    pub thickness: f64,
    /// [kg.m-3]
    pub density: f64,
    /// Open-circuit voltage against state of charge
    pub ocv: OcpCurve,
    pub lower_cutoff: Option<f64>,
}

impl StackProfile {
    /// Areal mass of one repeat unit [kg.cm-2]
    pub fn areal_mass(&self) -> f64 {
        self.density * self.thickness / 10_000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RagonePoint {
    pub rate: f64,
    /// [Wh.kg-1]
    pub energy_density: f64,
    /// [W.kg-1]
    pub power_density: f64,
    /// Fraction of the capacity delivered before the cut-off
    pub utilisation: f64,
}

pub trait DischargeSimulator {
    /// Discharge at one rate; `None` when no energy can be delivered
    fn discharge(&self, stack: &StackProfile, mode: DischargeMode, rate: f64) -> Option<RagonePoint>;
}

/// Lumped area-specific resistance discharge
#[derive(Debug, Clone, Copy)]
pub struct QuasiStaticDischarge {
    /// Area-specific resistance [Ohm.cm2]
    pub resistance: f64,
    pub soc_steps: usize,
}

impl Default for QuasiStaticDischarge {
    fn default() -> Self {
        Self {
            resistance: 20.0,
            soc_steps: 200,
        }
    }
}

impl QuasiStaticDischarge {
    /// Terminal voltage and current density [A.cm-2] at one open-circuit voltage
    fn operating_point(&self, ocv: f64, mode: DischargeMode, load: f64) -> Option<(f64, f64)> {
        match mode {
            DischargeMode::Current => Some((ocv - load * self.resistance, load)),
            DischargeMode::Power => {
                if self.resistance <= 0.0 {
                    return Some((ocv, load / ocv));
                }
                let discriminant = ocv * ocv - 4.0 * load * self.resistance;
                if discriminant < 0.0 {
                    return None;
                }
                let voltage = (ocv + discriminant.sqrt()) / 2.0;
                Some((voltage, load / voltage))
            }
        }
    }
}

impl DischargeSimulator for QuasiStaticDischarge {
    fn discharge(&self, stack: &StackProfile, mode: DischargeMode, rate: f64) -> Option<RagonePoint> {
        let steps = self.soc_steps.max(1);
        let mass = stack.areal_mass();
        if rate <= 0.0 || mass <= 0.0 || stack.capacity <= 0.0 {
            return None;
        }
        // A.cm-2 for current mode, W.cm-2 for power mode
        let load = match mode {
            DischargeMode::Current => rate * stack.capacity / 1000.0,
            DischargeMode::Power => rate * mass,
        };
        let cutoff = stack.lower_cutoff.unwrap_or(0.0);
        let step_capacity = stack.capacity / steps as f64;

        let mut energy = 0.0; // mW.h.cm-2
        let mut hours = 0.0;
        let mut delivered = 0;
        for k in 0..steps {
            let soc = 1.0 - (k as f64 + 0.5) / steps as f64;
            let Some((voltage, current)) = self.operating_point(stack.ocv.evaluate(soc), mode, load) else {
                break;
            };
            if voltage < cutoff || voltage <= 0.0 || current <= 0.0 {
                break;
            }
            energy += voltage * step_capacity;
            hours += step_capacity / (current * 1000.0);
            delivered += 1;
        }
        if delivered == 0 || hours <= 0.0 {
            return None;
        }

        let energy_density = energy / 1000.0 / mass;
        Some(RagonePoint {
            rate,
            energy_density,
            power_density: energy_density / hours,
            utilisation: delivered as f64 / steps as f64,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RagoneSeries {
    pub label: String,
    pub mode: DischargeMode,
    pub points: Vec<RagonePoint>,
}

/// One analysis of a comparison, with its own discharge settings
pub struct SweepCase<'a> {
    pub stack: StackProfile,
    pub mode: DischargeMode,
    pub simulator: &'a dyn DischargeSimulator,
}

/// Discharge every case at every rate
pub fn sweep(cases: &[SweepCase<'_>], rates: &[f64]) -> Vec<RagoneSeries> {
    cases
        .iter()
        .map(|case| {
            let points: Vec<RagonePoint> = rates
                .iter()
                .filter_map(|rate| {
                    let point = case.simulator.discharge(&case.stack, case.mode, *rate);
                    if point.is_none() {
                        tracing::warn!(
                            "{}: no energy delivered at {} {}",
                            case.stack.label,
                            rate,
                            match case.mode {
                                DischargeMode::Current => "C",
                                DischargeMode::Power => "W.kg-1",
                            }
                        );
                    }
                    point
                })
                .collect();
            RagoneSeries {
                label: case.stack.label.clone(),
                mode: case.mode,
                points,
            }
        })
        .collect()
}
