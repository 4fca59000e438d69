//! Stoichiometry window solver
//!
//! Produces the four stoichiometry limits (x0, x100, y100, y0) from one of
//! three input modes:
//!
//! - a positive electrode window, with the negative window derived by lithium
//!   conservation,
//! - a negative electrode window, with the positive window derived the same
//!   way,
//! - both OCP curves and the voltage cut-offs, solved for the two equilibrium
//!   states with an [`EquilibriumSolver`].
//!
//! Conservation is `Q_n x + Q_p y = Q_Li` at every state of charge, using the
//! available (loss-corrected) electrode capacities and the remaining lithium
//! inventory.

use serde::Serialize;

use crate::core::error::{TeaError, TeaResult};
use crate::core::names::{self, Electrode};
use crate::core::ocp::OcpCurve;
use crate::core::store::ParameterStore;

const CONSUMER: &str = "stoichiometry window";

/// Electrode lithiation limits at 0% and 100% state of charge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StoichiometryWindow {
    /// Negative electrode at 0% SoC
    pub x0: f64,
    /// Negative electrode at 100% SoC
    pub x100: f64,
    /// Positive electrode at 100% SoC
    pub y100: f64,
    /// Positive electrode at 0% SoC
    pub y0: f64,
}

impl StoichiometryWindow {
    /// Negative electrode stoichiometry at a state of charge in [0, 1]
    pub fn negative_at(&self, soc: f64) -> f64 {
        self.x0 + soc * (self.x100 - self.x0)
    }

    /// Positive electrode stoichiometry at a state of charge in [0, 1]
    pub fn positive_at(&self, soc: f64) -> f64 {
        self.y0 - soc * (self.y0 - self.y100)
    }

    /// Window of one electrode as (minimum, maximum)
    pub fn bounds(&self, electrode: Electrode) -> (f64, f64) {
        match electrode {
            Electrode::Negative => (self.x0, self.x100),
            Electrode::Positive => (self.y100, self.y0),
        }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x0, self.x100, self.y100, self.y0)
    }
}

/// Which input mode produced a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    PositiveWindow,
    NegativeWindow,
    Equilibrium,
}

impl std::fmt::Display for WindowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowSource::PositiveWindow => write!(f, "positive electrode window"),
            WindowSource::NegativeWindow => write!(f, "negative electrode window"),
            WindowSource::Equilibrium => write!(f, "OCP equilibrium"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoichiometryResult {
    pub window: StoichiometryWindow,
    pub source: WindowSource,
    /// Cut-offs implied by the window, when both OCP curves are known
    pub lower_cutoff: Option<f64>,
    pub upper_cutoff: Option<f64>,
    pub warnings: Vec<String>,
}

/// One-dimensional root finder for the equilibrium mode
pub trait EquilibriumSolver {
    /// Root of `f` in `[lower, upper]`, `None` when the bracket holds no sign change
    fn find_root(&self, f: &dyn Fn(f64) -> f64, lower: f64, upper: f64) -> Option<f64>;
}

/// Bracketing bisection
#[derive(Debug, Clone, Copy)]
pub struct Bisection {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for Bisection {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 200,
        }
    }
}

impl EquilibriumSolver for Bisection {
    fn find_root(&self, f: &dyn Fn(f64) -> f64, lower: f64, upper: f64) -> Option<f64> {
        let (mut a, mut b) = (lower, upper);
        let mut fa = f(a);
        let fb = f(b);

        if fa == 0.0 {
            return Some(a);
        }
        if fb == 0.0 {
            return Some(b);
        }
        if fa * fb > 0.0 || !(fa * fb).is_finite() {
            return None;
        }

        for _ in 0..self.max_iterations {
            let c = (a + b) / 2.0;
            let fc = f(c);

            if fc.abs() < self.tolerance || (b - a) / 2.0 < self.tolerance {
                return Some(c);
            }

            if fa * fc < 0.0 {
                b = c;
            } else {
                a = c;
                fa = fc;
            }
        }

        Some((a + b) / 2.0)
    }
}

/// Everything conservation needs, read once from the store
#[derive(Debug, Clone, Copy)]
pub struct LithiumBalance {
    pub negative_capacity: f64,
    pub positive_capacity: f64,
    pub inventory: f64,
}

impl LithiumBalance {
    pub fn from_store(store: &ParameterStore) -> TeaResult<Self> {
        Ok(Self {
            negative_capacity: store.require(&Electrode::Negative.available_capacity(), CONSUMER)?,
            positive_capacity: store.require(&Electrode::Positive.available_capacity(), CONSUMER)?,
            inventory: store.require(names::LITHIUM_INVENTORY, CONSUMER)?,
        })
    }

    fn capacity(&self, electrode: Electrode) -> f64 {
        match electrode {
            Electrode::Negative => self.negative_capacity,
            Electrode::Positive => self.positive_capacity,
        }
    }

    /// Stoichiometry of one electrode given the other's
    fn complement(&self, electrode: Electrode, sto: f64) -> f64 {
        let lithium = self.capacity(electrode.other()) * sto;
        (self.inventory - lithium) / self.capacity(electrode)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindowOptions {
    /// Slack allowed outside [0, 1] before a derived stoichiometry is rejected
    pub tolerance: f64,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self { tolerance: 1e-5 }
    }
}

/// Derive the window from one electrode's supplied (minimum, maximum)
///
/// `input` is the electrode whose window is known. At 0% SoC the negative
/// electrode sits at its minimum and the positive at its maximum.
pub fn window_from_electrode(
    balance: &LithiumBalance,
    input: Electrode,
    minimum: f64,
    maximum: f64,
    options: &WindowOptions,
) -> TeaResult<StoichiometryWindow> {
    let (discharged, charged) = match input {
        Electrode::Negative => (minimum, maximum),
        Electrode::Positive => (maximum, minimum),
    };

    let lithium = balance.capacity(input) * discharged;
    if lithium > balance.inventory {
        return Err(TeaError::InventoryExceeded {
            electrode: input,
            lithium,
            inventory: balance.inventory,
        });
    }

    let output = input.other();
    let out_discharged = balance.complement(output, discharged);
    let out_charged = balance.complement(output, charged);

    let window = match input {
        Electrode::Negative => StoichiometryWindow {
            x0: minimum,
            x100: maximum,
            y100: out_charged,
            y0: out_discharged,
        },
        Electrode::Positive => StoichiometryWindow {
            x0: out_discharged,
            x100: out_charged,
            y100: minimum,
            y0: maximum,
        },
    };
    check_bounds(&window, input, options)?;
    check_bounds(&window, output, options)?;
    Ok(window)
}

fn check_bounds(window: &StoichiometryWindow, electrode: Electrode, options: &WindowOptions) -> TeaResult<()> {
    let values = match electrode {
        Electrode::Negative => [("x0", window.x0), ("x100", window.x100)],
        Electrode::Positive => [("y100", window.y100), ("y0", window.y0)],
    };
    for (symbol, value) in values {
        if !(-options.tolerance..=1.0 + options.tolerance).contains(&value) {
            return Err(TeaError::StoichiometryOutOfRange {
                electrode,
                symbol,
                value,
            });
        }
    }
    Ok(())
}

/// Solve the window from both OCP curves and the voltage cut-offs
pub fn window_from_equilibrium(
    balance: &LithiumBalance,
    negative_ocp: &OcpCurve,
    positive_ocp: &OcpCurve,
    lower_cutoff: f64,
    upper_cutoff: f64,
    solver: &dyn EquilibriumSolver,
) -> TeaResult<StoichiometryWindow> {
    let q_n = balance.negative_capacity;
    let q_p = balance.positive_capacity;
    let q_li = balance.inventory;

    // Both stoichiometries must stay in [0, 1] along the conservation line
    let lower = ((q_li - q_p) / q_n).max(0.0);
    let upper = (q_li / q_n).min(1.0);
    if lower > upper {
        return Err(TeaError::NoStoichiometryWindow(format!(
            "the lithium inventory ({:.6} mA.h.cm-2) cannot be placed in the electrodes",
            q_li
        )));
    }

    let cell_voltage = |x: f64| {
        let y = balance.complement(Electrode::Positive, x);
        positive_ocp.evaluate(y) - negative_ocp.evaluate(x)
    };

    let x100 = solver
        .find_root(&|x: f64| cell_voltage(x) - upper_cutoff, lower, upper)
        .ok_or(TeaError::EquilibriumFailed {
            voltage: upper_cutoff,
            lower,
            upper,
        })?;
    let x0 = solver
        .find_root(&|x: f64| cell_voltage(x) - lower_cutoff, lower, x100)
        .ok_or(TeaError::EquilibriumFailed {
            voltage: lower_cutoff,
            lower,
            upper: x100,
        })?;

    Ok(StoichiometryWindow {
        x0,
        x100,
        y100: balance.complement(Electrode::Positive, x100),
        y0: balance.complement(Electrode::Positive, x0),
    })
}

fn supplied_window(store: &ParameterStore, electrode: Electrode) -> Option<(f64, f64)> {
    let minimum = store.number(&electrode.minimum_stoichiometry())?;
    let maximum = store.number(&electrode.maximum_stoichiometry())?;
    Some((minimum, maximum))
}

/// Pick the input mode from what the store holds and solve it
pub fn solve(
    store: &ParameterStore,
    options: &WindowOptions,
    solver: &dyn EquilibriumSolver,
) -> TeaResult<StoichiometryResult> {
    let balance = LithiumBalance::from_store(store)?;
    let negative_ocp = store.curve(&Electrode::Negative.ocp());
    let positive_ocp = store.curve(&Electrode::Positive.ocp());
    let mut warnings = Vec::new();

    let positive = supplied_window(store, Electrode::Positive);
    let negative = supplied_window(store, Electrode::Negative);

    let (window, source) = match (positive, negative) {
        (Some((minimum, maximum)), other) => {
            if other.is_some() {
                let message = "Both electrode stoichiometry windows supplied, \
                               the negative window is derived from the positive one"
                    .to_string();
                tracing::warn!("{}", message);
                warnings.push(message);
            }
            let window = window_from_electrode(&balance, Electrode::Positive, minimum, maximum, options)?;
            (window, WindowSource::PositiveWindow)
        }
        (None, Some((minimum, maximum))) => {
            let window = window_from_electrode(&balance, Electrode::Negative, minimum, maximum, options)?;
            (window, WindowSource::NegativeWindow)
        }
        (None, None) => {
            let (Some(n_ocp), Some(p_ocp)) = (negative_ocp, positive_ocp) else {
                return Err(TeaError::NoStoichiometryWindow(
                    "no electrode window is supplied and an OCP curve is missing".to_string(),
                ));
            };
            let lower = store.require(names::LOWER_VOLTAGE_CUTOFF, CONSUMER)?;
            let upper = store.require(names::UPPER_VOLTAGE_CUTOFF, CONSUMER)?;
            let window = window_from_equilibrium(&balance, n_ocp, p_ocp, lower, upper, solver)?;
            (window, WindowSource::Equilibrium)
        }
    };

    let (lower_cutoff, upper_cutoff) = match (negative_ocp, positive_ocp) {
        (Some(n_ocp), Some(p_ocp)) => (
            Some(p_ocp.evaluate(window.y0) - n_ocp.evaluate(window.x0)),
            Some(p_ocp.evaluate(window.y100) - n_ocp.evaluate(window.x100)),
        ),
        _ => (None, None),
    };

    tracing::debug!(
        x0 = window.x0,
        x100 = window.x100,
        y100 = window.y100,
        y0 = window.y0,
        %source,
        "stoichiometry window"
    );

    Ok(StoichiometryResult {
        window,
        source,
        lower_cutoff,
        upper_cutoff,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance() -> LithiumBalance {
        LithiumBalance {
            negative_capacity: 2.4,
            positive_capacity: 2.2,
            inventory: 2.1,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_bisection_finds_square_root() {
        let root = Bisection::default().find_root(&|x: f64| x * x - 2.0, 1.0, 2.0).unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_bisection_without_sign_change() {
        assert!(Bisection::default().find_root(&|x: f64| x * x + 1.0, -1.0, 1.0).is_none());
    }

    #[test]
    fn test_positive_window_conserves_lithium() {
        let b = balance();
        let w = window_from_electrode(&b, Electrode::Positive, 0.2, 0.9, &WindowOptions::default()).unwrap();
        assert!(close(b.negative_capacity * w.x0 + b.positive_capacity * w.y0, b.inventory));
        assert!(close(b.negative_capacity * w.x100 + b.positive_capacity * w.y100, b.inventory));
        assert!(w.x100 > w.x0);
    }

    #[test]
    fn test_window_round_trip_between_modes() {
        let b = balance();
        let options = WindowOptions::default();
        let from_positive = window_from_electrode(&b, Electrode::Positive, 0.2, 0.9, &options).unwrap();
        let from_negative =
            window_from_electrode(&b, Electrode::Negative, from_positive.x0, from_positive.x100, &options).unwrap();

        assert!((from_negative.y100 - 0.2).abs() < 1e-12);
        assert!((from_negative.y0 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_inventory_exceeded_is_an_error() {
        let b = balance();
        // 2.2 * 0.99 = 2.178 > 2.1
        let err = window_from_electrode(&b, Electrode::Positive, 0.1, 0.99, &WindowOptions::default()).unwrap_err();
        match err {
            TeaError::InventoryExceeded {
                electrode,
                lithium,
                inventory,
            } => {
                assert_eq!(electrode, Electrode::Positive);
                assert!(lithium > inventory);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_derived_window_outside_unit_interval() {
        let b = LithiumBalance {
            negative_capacity: 1.0,
            positive_capacity: 2.2,
            inventory: 2.1,
        };
        // x100 = (2.1 - 2.2 * 0.1) / 1.0 = 1.88
        let err = window_from_electrode(&b, Electrode::Positive, 0.1, 0.9, &WindowOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            TeaError::StoichiometryOutOfRange {
                electrode: Electrode::Negative,
                ..
            }
        ));
    }

    #[test]
    fn test_supplied_window_outside_unit_interval() {
        let err = window_from_electrode(&balance(), Electrode::Negative, -0.05, 0.5, &WindowOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TeaError::StoichiometryOutOfRange {
                electrode: Electrode::Negative,
                symbol: "x0",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_electrode_gives_no_window() {
        let b = LithiumBalance {
            negative_capacity: 2.0,
            positive_capacity: 0.0,
            inventory: 1.0,
        };
        // (1.0 - 2.0 * 0.5) / 0.0 is NaN
        let err = window_from_electrode(&b, Electrode::Negative, 0.5, 0.5, &WindowOptions::default()).unwrap_err();
        match err {
            TeaError::StoichiometryOutOfRange { electrode, value, .. } => {
                assert_eq!(electrode, Electrode::Positive);
                assert!(value.is_nan());
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_equilibrium_reproduces_linear_cutoffs() {
        let b = balance();
        let negative = OcpCurve::from_fn(|x| 1.0 - x);
        let positive = OcpCurve::from_fn(|y| 5.0 - 2.0 * y);
        let w = window_from_equilibrium(&b, &negative, &positive, 2.5, 4.0, &Bisection::default()).unwrap();

        let voltage = |x: f64, y: f64| positive.evaluate(y) - negative.evaluate(x);
        assert!((voltage(w.x0, w.y0) - 2.5).abs() < 1e-9);
        assert!((voltage(w.x100, w.y100) - 4.0).abs() < 1e-9);
        assert!(close(b.negative_capacity * w.x0 + b.positive_capacity * w.y0, b.inventory));
    }

    #[test]
    fn test_unreachable_cutoff_fails() {
        let b = balance();
        let negative = OcpCurve::from_fn(|x| 1.0 - x);
        let positive = OcpCurve::from_fn(|y| 5.0 - 2.0 * y);
        let err = window_from_equilibrium(&b, &negative, &positive, 2.5, 9.0, &Bisection::default()).unwrap_err();
        assert!(matches!(err, TeaError::EquilibriumFailed { voltage, .. } if voltage == 9.0));
    }

    #[test]
    fn test_soc_interpolation() {
        let w = StoichiometryWindow {
            x0: 0.0,
            x100: 0.8,
            y100: 0.2,
            y0: 1.0,
        };
        assert!(close(w.negative_at(0.5), 0.4));
        assert!(close(w.positive_at(0.5), 0.6));
        assert_eq!(w.bounds(Electrode::Positive), (0.2, 1.0));
    }

    #[test]
    fn test_solve_prefers_positive_window() {
        let mut store = ParameterStore::default();
        store.supply(&Electrode::Negative.available_capacity(), 2.4);
        store.supply(&Electrode::Positive.available_capacity(), 2.2);
        store.supply(names::LITHIUM_INVENTORY, 2.1);
        store.supply(&Electrode::Positive.minimum_stoichiometry(), 0.2);
        store.supply(&Electrode::Positive.maximum_stoichiometry(), 0.9);
        store.supply(&Electrode::Negative.minimum_stoichiometry(), 0.0);
        store.supply(&Electrode::Negative.maximum_stoichiometry(), 0.5);

        let result = solve(&store, &WindowOptions::default(), &Bisection::default()).unwrap();
        assert_eq!(result.source, WindowSource::PositiveWindow);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.lower_cutoff.is_none());
    }

    #[test]
    fn test_solve_without_any_mode() {
        let mut store = ParameterStore::default();
        store.supply(&Electrode::Negative.available_capacity(), 2.4);
        store.supply(&Electrode::Positive.available_capacity(), 2.2);
        store.supply(names::LITHIUM_INVENTORY, 2.1);
        let err = solve(&store, &WindowOptions::default(), &Bisection::default()).unwrap_err();
        assert!(matches!(err, TeaError::NoStoichiometryWindow(_)));
    }
}
