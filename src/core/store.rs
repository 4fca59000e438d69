//! Parameter store - the single authoritative map of named quantities
//!
//! Supplied values are inserted once at construction. Derived and defaulted
//! values are added afterwards through [`ParameterStore::offer`] and
//! [`ParameterStore::set_default`]; neither ever replaces a value that is
//! already present, so a quantity is immutable once resolved.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::error::{TeaError, TeaResult};
use crate::core::ocp::OcpCurve;

/// Input table of named values (a base set or an override set)
pub type ParameterTable = BTreeMap<String, ParameterValue>;

/// Where a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Present in the base table or the overrides
    Supplied,
    /// Computed by a resolver rule
    Derived,
    /// Filled in by the default policy
    Defaulted,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Supplied => write!(f, "supplied"),
            Provenance::Derived => write!(f, "derived"),
            Provenance::Defaulted => write!(f, "defaulted"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ParameterValue {
    Number(f64),
    Curve(OcpCurve),
}

impl ParameterValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(v) => Some(*v),
            ParameterValue::Curve(_) => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ParameterValue::Number(v) => format!("{}", v),
            ParameterValue::Curve(curve) => curve.describe(),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Number(v)
    }
}

impl From<OcpCurve> for ParameterValue {
    fn from(curve: OcpCurve) -> Self {
        ParameterValue::Curve(curve)
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub value: ParameterValue,
    pub provenance: Provenance,
    /// Rule or policy that produced the value (None for supplied values)
    pub source: Option<String>,
}

/// Kind of an advisory message produced while resolving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Derived,
    Defaulted,
    Conflict,
    Skipped,
    Missing,
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteKind::Derived => write!(f, "derived"),
            NoteKind::Defaulted => write!(f, "defaulted"),
            NoteKind::Conflict => write!(f, "conflict"),
            NoteKind::Skipped => write!(f, "skipped"),
            NoteKind::Missing => write!(f, "missing"),
        }
    }
}

/// A non-fatal message about how a quantity was (or was not) resolved
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionNote {
    pub kind: NoteKind,
    pub quantity: String,
    pub message: String,
}

/// Outcome of offering a computed value to the store
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offer {
    Inserted,
    /// Already present with an equal value
    Consistent,
    /// Already present with a different value, which was kept
    Conflict { kept: f64 },
}

#[derive(Debug, Clone)]
pub struct ParameterStore {
    values: BTreeMap<String, Parameter>,
    notes: Vec<ResolutionNote>,
    conflict_tolerance: f64,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(1e-9)
    }
}

impl ParameterStore {
    pub fn new(conflict_tolerance: f64) -> Self {
        Self {
            values: BTreeMap::new(),
            notes: Vec::new(),
            conflict_tolerance,
        }
    }

    /// Build a store from a base table with overrides applied on top
    pub fn from_tables(base: &ParameterTable, overrides: &ParameterTable, conflict_tolerance: f64) -> Self {
        let mut store = Self::new(conflict_tolerance);
        for (name, value) in base.iter().chain(overrides.iter()) {
            store.supply(name, value.clone());
        }
        store
    }

    /// Insert a supplied value, replacing an earlier supplied one
    pub fn supply(&mut self, name: &str, value: impl Into<ParameterValue>) {
        self.values.insert(
            name.to_string(),
            Parameter {
                value: value.into(),
                provenance: Provenance::Supplied,
                source: None,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Numeric value, `None` when absent or when the entry is a curve
    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(|p| p.value.as_number())
    }

    /// Numeric value that a calculation cannot do without
    pub fn require(&self, name: &str, consumer: &str) -> TeaResult<f64> {
        match self.values.get(name) {
            Some(Parameter {
                value: ParameterValue::Number(v),
                ..
            }) => Ok(*v),
            Some(_) => Err(TeaError::NotANumber(name.to_string())),
            None => Err(TeaError::missing(name, consumer)),
        }
    }

    pub fn curve(&self, name: &str) -> Option<&OcpCurve> {
        match self.values.get(name) {
            Some(Parameter {
                value: ParameterValue::Curve(curve),
                ..
            }) => Some(curve),
            _ => None,
        }
    }

    /// Curve that a calculation cannot do without
    pub fn require_curve(&self, name: &str, consumer: &str) -> TeaResult<&OcpCurve> {
        match self.values.get(name) {
            Some(Parameter {
                value: ParameterValue::Curve(curve),
                ..
            }) => Ok(curve),
            Some(_) => Err(TeaError::NotACurve(name.to_string())),
            None => Err(TeaError::missing(name, consumer)),
        }
    }

    pub fn provenance(&self, name: &str) -> Option<Provenance> {
        self.values.get(name).map(|p| p.provenance)
    }

    /// Offer a derived value
    ///
    /// Inserts the value when the quantity is absent. When it is present the
    /// existing value is kept; a relative difference above the conflict
    /// tolerance is recorded as a conflict.
    pub fn offer(&mut self, name: &str, value: f64, source: &str) -> Offer {
        match self.values.get(name) {
            None => {
                self.values.insert(
                    name.to_string(),
                    Parameter {
                        value: ParameterValue::Number(value),
                        provenance: Provenance::Derived,
                        source: Some(source.to_string()),
                    },
                );
                tracing::debug!(quantity = name, value, source, "derived parameter");
                self.notes.push(ResolutionNote {
                    kind: NoteKind::Derived,
                    quantity: name.to_string(),
                    message: format!("'{}' = {} computed from {}", name, value, source),
                });
                Offer::Inserted
            }
            Some(existing) => {
                let Some(kept) = existing.value.as_number() else {
                    return Offer::Consistent;
                };
                let scale = kept.abs().max(value.abs());
                if (kept - value).abs() <= self.conflict_tolerance * scale {
                    return Offer::Consistent;
                }
                let message = format!(
                    "'{}' = {} ({}) kept, {} from {} rejected",
                    name, kept, existing.provenance, value, source
                );
                tracing::warn!("{}", message);
                self.notes.push(ResolutionNote {
                    kind: NoteKind::Conflict,
                    quantity: name.to_string(),
                    message,
                });
                Offer::Conflict { kept }
            }
        }
    }

    /// Fill an absent quantity with a default value
    ///
    /// Returns false (and changes nothing) when the quantity is present.
    pub fn set_default(&mut self, name: &str, value: f64, reason: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.values.insert(
            name.to_string(),
            Parameter {
                value: ParameterValue::Number(value),
                provenance: Provenance::Defaulted,
                source: Some(reason.to_string()),
            },
        );
        let message = format!("Missing '{}', {} has been used ({})", name, value, reason);
        tracing::warn!("{}", message);
        self.notes.push(ResolutionNote {
            kind: NoteKind::Defaulted,
            quantity: name.to_string(),
            message,
        });
        true
    }

    /// Record an advisory message without touching any value
    pub fn note(&mut self, kind: NoteKind, quantity: &str, message: String) {
        match kind {
            NoteKind::Derived | NoteKind::Skipped => tracing::debug!("{}", message),
            _ => tracing::warn!("{}", message),
        }
        self.notes.push(ResolutionNote {
            kind,
            quantity: quantity.to_string(),
            message,
        });
    }

    pub fn notes(&self) -> &[ResolutionNote] {
        &self.notes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Parameter)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
