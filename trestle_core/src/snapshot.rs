//! # Model Snapshots
//!
//! A [`Snapshot`] is the full element state of a set of models as handed over
//! by the caller. The engine never keeps one between calls; structural edits
//! build a [`ConnectivityMap`] from a single model, clash runs read every
//! model of a [`ClashRequest`].
//!
//! ## Structure
//!
//! ```text
//! ClashRequest
//! ├── project: Snapshot   (structural models)
//! └── process: Snapshot   (piping models)
//!
//! Snapshot
//! ├── version: schema version string
//! └── models: Vec<ModelSnapshot>
//!     ├── name, discipline
//!     └── elements (+ optional split beams/columns/cantilevers/pipes lists)
//! ```

use serde::{Deserialize, Serialize};

use crate::connectivity::ConnectivityMap;
use crate::element::{Element, ElementKind};
use crate::errors::{EngineError, EngineResult};
use crate::warnings::Warning;

/// Current schema version for snapshot and report files
pub const SCHEMA_VERSION: &str = "0.1.0";

fn schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Engineering discipline a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Discipline {
    #[default]
    Structural,
    Piping,
}

/// One model's elements.
///
/// Elements may come as one `elements` list or split per kind the way the
/// modelling UI stores them. Split lists are merged after `elements`, in the
/// order beams, columns, cantilevers, pipes, and take the list's kind when an
/// element has none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub name: String,

    #[serde(default)]
    pub discipline: Discipline,

    #[serde(default)]
    pub elements: Vec<Element>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beams: Vec<Element>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Element>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cantilevers: Vec<Element>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipes: Vec<Element>,
}

impl ModelSnapshot {
    pub fn new(name: impl Into<String>, discipline: Discipline) -> Self {
        ModelSnapshot {
            name: name.into(),
            discipline,
            ..Default::default()
        }
    }

    /// Builder: add an element to the combined list
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// All elements, combined list first, split lists after.
    pub fn all_elements(&self) -> Vec<Element> {
        let split = [
            (&self.beams, ElementKind::Beam),
            (&self.columns, ElementKind::Column),
            (&self.cantilevers, ElementKind::Cantilever),
            (&self.pipes, ElementKind::Pipe),
        ];

        let mut all = self.elements.clone();
        for (list, kind) in split {
            all.extend(list.iter().cloned().map(|mut e| {
                e.kind.get_or_insert(kind);
                e
            }));
        }
        all
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
            + self.beams.len()
            + self.columns.len()
            + self.cantilevers.len()
            + self.pipes.len()
    }

    /// Build a connectivity map for this model.
    pub fn connectivity_map(&self) -> (ConnectivityMap, Vec<Warning>) {
        ConnectivityMap::build(self.all_elements())
    }
}

/// Element state of a set of models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "schema_version")]
    pub version: String,

    #[serde(default)]
    pub models: Vec<ModelSnapshot>,
}

impl Snapshot {
    pub fn new() -> Self {
        Snapshot {
            version: schema_version(),
            models: Vec::new(),
        }
    }

    /// Builder: add a model
    pub fn with_model(mut self, model: ModelSnapshot) -> Self {
        self.models.push(model);
        self
    }

    pub fn model(&self, name: &str) -> Option<&ModelSnapshot> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Connectivity map of the named model.
    pub fn connectivity_map(&self, model: &str) -> EngineResult<(ConnectivityMap, Vec<Warning>)> {
        self.model(model)
            .map(ModelSnapshot::connectivity_map)
            .ok_or_else(|| {
                EngineError::invalid_input(
                    "model",
                    model,
                    "No model with this name in the snapshot",
                )
            })
    }

    pub fn element_count(&self) -> usize {
        self.models.iter().map(ModelSnapshot::element_count).sum()
    }
}

/// Input of a clash run: structural project plus process (piping) models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClashRequest {
    #[serde(default)]
    pub project: Snapshot,

    #[serde(default)]
    pub process: Snapshot,
}

impl ClashRequest {
    pub fn new(project: Snapshot, process: Snapshot) -> Self {
        ClashRequest { project, process }
    }

    /// Every model, project models first
    pub fn models(&self) -> impl Iterator<Item = &ModelSnapshot> {
        self.project.models.iter().chain(self.process.models.iter())
    }

    pub fn element_count(&self) -> usize {
        self.project.element_count() + self.process.element_count()
    }
}
