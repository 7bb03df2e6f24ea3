//! # Warnings
//!
//! Non-fatal outcomes surfaced to the user. A warning never aborts a batch:
//! each relocation target, and each spectral point edit, succeeds or fails on
//! its own and reports through this type.

use serde::{Deserialize, Serialize};

/// Which edge of the allowed elevation band was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    pub fn display_name(&self) -> &'static str {
        match self {
            Bound::Min => "minimum",
            Bound::Max => "maximum",
        }
    }
}

/// User-visible warning event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// Requested elevation lies outside the band allowed by connected columns
    RangeViolation {
        element: String,
        requested: f64,
        bound: Bound,
        limit: f64,
    },

    /// Members that depend on the element would be left invalid by the move
    DependencyConflict {
        element: String,
        dependents: Vec<String>,
    },

    /// Two segments intersect without sharing a connection point
    CrossingConflict { first: String, second: String },

    /// A spectral point with this time period already exists
    DuplicateTimePeriod { time_period: f64 },

    /// A connection names an element that is not in the model
    DanglingReference { element: String, missing: String },

    /// Two elements share a name; the later one replaced the earlier
    DuplicateName { name: String },

    /// A relocation target is not in the model
    MissingElement { name: String },

    /// A relocation target is not a beam or cantilever
    NotRelocatable { name: String, kind: String },
}

impl Warning {
    /// Short code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Warning::RangeViolation { .. } => "RANGE_VIOLATION",
            Warning::DependencyConflict { .. } => "DEPENDENCY_CONFLICT",
            Warning::CrossingConflict { .. } => "CROSSING_CONFLICT",
            Warning::DuplicateTimePeriod { .. } => "DUPLICATE_TIME_PERIOD",
            Warning::DanglingReference { .. } => "DANGLING_REFERENCE",
            Warning::DuplicateName { .. } => "DUPLICATE_NAME",
            Warning::MissingElement { .. } => "MISSING_ELEMENT",
            Warning::NotRelocatable { .. } => "NOT_RELOCATABLE",
        }
    }

    /// Name of the element the warning is about, if any
    pub fn element(&self) -> Option<&str> {
        match self {
            Warning::RangeViolation { element, .. }
            | Warning::DependencyConflict { element, .. }
            | Warning::DanglingReference { element, .. } => Some(element),
            Warning::CrossingConflict { first, .. } => Some(first),
            Warning::DuplicateName { name }
            | Warning::MissingElement { name }
            | Warning::NotRelocatable { name, .. } => Some(name),
            Warning::DuplicateTimePeriod { .. } => None,
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::RangeViolation {
                element,
                requested,
                bound,
                limit,
            } => write!(
                f,
                "{}: elevation {} exceeds the {} allowed elevation of {}",
                element,
                requested,
                bound.display_name(),
                limit
            ),
            Warning::DependencyConflict { element, dependents } => write!(
                f,
                "{}: cannot move, additional elements are attached: {}",
                element,
                dependents.join(", ")
            ),
            Warning::CrossingConflict { first, second } => {
                write!(f, "{} crosses {} without a connection", first, second)
            }
            Warning::DuplicateTimePeriod { time_period } => {
                write!(f, "time period {} already exists", time_period)
            }
            Warning::DanglingReference { element, missing } => {
                write!(f, "{}: connected element {} does not exist", element, missing)
            }
            Warning::DuplicateName { name } => {
                write!(f, "duplicate element name {}, the last definition wins", name)
            }
            Warning::MissingElement { name } => write!(f, "element {} not found", name),
            Warning::NotRelocatable { name, kind } => {
                write!(f, "{}: {} elements cannot be relocated", name, kind)
            }
        }
    }
}
