//! Open-circuit potential curves
//!
//! Curves are supplied by the parameter set, either as one of the built-in
//! analytical fits, as a tabulated `(stoichiometry, potential)` list, or as an
//! arbitrary function when the library is used directly.

use std::str::FromStr;
use std::sync::Arc;

use crate::core::error::TeaError;

/// Analytical OCP fits shipped with the built-in parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOcp {
    /// Graphite, Ecker et al. (2015)
    GraphiteEcker2015,
    /// LiNiCoO2, Ecker et al. (2015)
    NcoEcker2015,
    /// Graphite-SiOx of the LG M50 cell, Chen et al. (2020)
    GraphiteChen2020,
    /// NMC811 of the LG M50 cell, Chen et al. (2020)
    NmcChen2020,
}

impl BuiltinOcp {
    pub const ALL: [BuiltinOcp; 4] = [
        BuiltinOcp::GraphiteEcker2015,
        BuiltinOcp::NcoEcker2015,
        BuiltinOcp::GraphiteChen2020,
        BuiltinOcp::NmcChen2020,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinOcp::GraphiteEcker2015 => "graphite_ocp_Ecker2015",
            BuiltinOcp::NcoEcker2015 => "nco_ocp_Ecker2015",
            BuiltinOcp::GraphiteChen2020 => "graphite_LGM50_ocp_Chen2020",
            BuiltinOcp::NmcChen2020 => "nmc_LGM50_ocp_Chen2020",
        }
    }

    pub fn evaluate(self, sto: f64) -> f64 {
        match self {
            BuiltinOcp::GraphiteEcker2015 => graphite_ocp_ecker2015(sto),
            BuiltinOcp::NcoEcker2015 => nco_ocp_ecker2015(sto),
            BuiltinOcp::GraphiteChen2020 => graphite_ocp_chen2020(sto),
            BuiltinOcp::NmcChen2020 => nmc_ocp_chen2020(sto),
        }
    }
}

impl FromStr for BuiltinOcp {
    type Err = TeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinOcp::ALL
            .into_iter()
            .find(|ocp| ocp.name() == s)
            .ok_or_else(|| TeaError::UnknownOcp(s.to_string()))
    }
}

fn graphite_ocp_ecker2015(sto: f64) -> f64 {
    let a = 0.716502;
    let b = 369.028;
    let c = 0.12193;
    let d = 35.6478;
    let e = 0.0530947;
    let g = 0.0169644;
    let h = 27.1365;
    let i = 0.312832;
    let j = 0.0199313;
    let k = 28.5697;
    let m = 0.614221;
    let n = 0.931153;
    let o = 36.328;
    let p = 1.10743;
    let q = 0.140031;
    let r = 0.0189193;
    let s = 21.1967;
    let t = 0.196176;

    a * (-b * sto).exp() + c * (-d * (sto - e)).exp()
        - r * (s * (sto - t)).tanh()
        - g * (h * (sto - i)).tanh()
        - j * (k * (sto - m)).tanh()
        - n * (o * (sto - p)).exp()
        + q
}

fn nco_ocp_ecker2015(sto: f64) -> f64 {
    let a = -2.35211;
    let c = 0.0747061;
    let d = 31.886;
    let e = 0.0219921;
    let g = 0.640243;
    let h = 5.48623;
    let i = 0.439245;
    let j = 3.82383;
    let k = 4.12167;
    let m = 0.176187;
    let n = 0.0542123;
    let o = 18.2919;
    let p = 0.762272;
    let q = 4.23285;
    let r = -6.34984;
    let s = 2.66395;
    let t = 0.174352;

    a * sto
        - c * (d * (sto - e)).tanh()
        - r * (s * (sto - t)).tanh()
        - g * (h * (sto - i)).tanh()
        - j * (k * (sto - m)).tanh()
        - n * (o * (sto - p)).tanh()
        + q
}

fn graphite_ocp_chen2020(sto: f64) -> f64 {
    1.9793 * (-39.3631 * sto).exp() + 0.2482
        - 0.0909 * (29.8538 * (sto - 0.1234)).tanh()
        - 0.04478 * (14.9159 * (sto - 0.2769)).tanh()
        - 0.0205 * (30.4444 * (sto - 0.6103)).tanh()
}

fn nmc_ocp_chen2020(sto: f64) -> f64 {
    -0.8090 * sto + 4.4875
        - 0.0428 * (18.5138 * (sto - 0.5542)).tanh()
        - 17.7326 * (15.7890 * (sto - 0.3117)).tanh()
        + 17.5842 * (15.9308 * (sto - 0.3120)).tanh()
}

/// Piecewise-linear OCP table, clamped at both ends
#[derive(Debug, Clone, PartialEq)]
pub struct OcpTable {
    points: Vec<(f64, f64)>,
}

impl OcpTable {
    /// Build a table from `(stoichiometry, potential)` points
    ///
    /// Points are sorted by stoichiometry; at least two distinct points are
    /// required.
    pub fn new(name: &str, mut points: Vec<(f64, f64)>) -> Result<Self, TeaError> {
        if points.iter().any(|(x, v)| !x.is_finite() || !v.is_finite()) {
            return Err(TeaError::InvalidOcpTable {
                name: name.to_string(),
                reason: "all entries must be finite numbers".to_string(),
            });
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|a, b| a.0 == b.0);
        if points.len() < 2 {
            return Err(TeaError::InvalidOcpTable {
                name: name.to_string(),
                reason: "at least two distinct stoichiometries are needed".to_string(),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn evaluate(&self, sto: f64) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if sto <= first.0 {
            return first.1;
        }
        if sto >= last.0 {
            return last.1;
        }
        let idx = self.points.partition_point(|(x, _)| *x <= sto);
        let (x0, v0) = self.points[idx - 1];
        let (x1, v1) = self.points[idx];
        v0 + (v1 - v0) * (sto - x0) / (x1 - x0)
    }
}

/// An open-circuit potential as a function of stoichiometry
#[derive(Clone)]
pub enum OcpCurve {
    Builtin(BuiltinOcp),
    Table(OcpTable),
    Function(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl OcpCurve {
    pub fn from_fn(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        OcpCurve::Function(Arc::new(f))
    }

    pub fn evaluate(&self, sto: f64) -> f64 {
        match self {
            OcpCurve::Builtin(ocp) => ocp.evaluate(sto),
            OcpCurve::Table(table) => table.evaluate(sto),
            OcpCurve::Function(f) => f(sto),
        }
    }

    /// Mean potential over `samples` evenly spaced points between two stoichiometries
    pub fn mean_between(&self, from: f64, to: f64, samples: usize) -> f64 {
        let samples = samples.max(2);
        let step = (to - from) / (samples - 1) as f64;
        (0..samples)
            .map(|i| self.evaluate(from + step * i as f64))
            .sum::<f64>()
            / samples as f64
    }

    /// Short description for tables
    pub fn describe(&self) -> String {
        match self {
            OcpCurve::Builtin(ocp) => ocp.name().to_string(),
            OcpCurve::Table(table) => format!("table ({} points)", table.points().len()),
            OcpCurve::Function(_) => "function".to_string(),
        }
    }
}

impl std::fmt::Debug for OcpCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcpCurve::Builtin(ocp) => f.debug_tuple("Builtin").field(ocp).finish(),
            OcpCurve::Table(table) => f.debug_tuple("Table").field(table).finish(),
            OcpCurve::Function(_) => f.write_str("Function(..)"),
        }
    }
}
