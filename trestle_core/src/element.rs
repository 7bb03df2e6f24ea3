//! # Structural Elements
//!
//! An [`Element`] is one named member of a model: a segment between two 3D
//! points plus the names of the members attached at each end. Elements are
//! plain values; the connectivity graph is expressed through names only, never
//! through references.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "name": "B1",
//!   "kind": "Beam",
//!   "start_pos": { "x": 0.0, "y": 3.0, "z": 0.0 },
//!   "end_pos": { "x": 6.0, "y": 3.0, "z": 0.0 },
//!   "start_connected": ["C1"],
//!   "end_connected": ["C2"]
//! }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::Point3;

static BEAM_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^B\d+$").expect("valid pattern"));
static COLUMN_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^C\d+$").expect("valid pattern"));
static CANTILEVER_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^CL\d+$").expect("valid pattern"));
static PIPE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^P\d+$").expect("valid pattern"));

/// Kind of structural or process member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementKind {
    Beam,
    Column,
    Cantilever,
    /// Piping run from a process model
    Pipe,
    /// Anything the engine does not specialize (bracing, secondary steel...)
    #[default]
    Other,
}

impl ElementKind {
    /// Infer the kind from the naming convention (`B1`, `C1`, `CL1`, `P1`).
    pub fn from_name(name: &str) -> Self {
        if COLUMN_NAME.is_match(name) {
            ElementKind::Column
        } else if CANTILEVER_NAME.is_match(name) {
            ElementKind::Cantilever
        } else if BEAM_NAME.is_match(name) {
            ElementKind::Beam
        } else if PIPE_NAME.is_match(name) {
            ElementKind::Pipe
        } else {
            ElementKind::Other
        }
    }

    /// Beams and cantilevers are the only members that can be relocated
    pub fn is_relocatable(&self) -> bool {
        matches!(self, ElementKind::Beam | ElementKind::Cantilever)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::Beam => "Beam",
            ElementKind::Column => "Column",
            ElementKind::Cantilever => "Cantilever",
            ElementKind::Pipe => "Pipe",
            ElementKind::Other => "Other",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which end of an element a connection is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum End {
    Start,
    End,
}

/// Insertion-ordered set of neighbor names.
///
/// Most members have one to three neighbors per end, so names live inline.
/// Serialized as a plain JSON array; duplicates in input collapse on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ConnectedSet(SmallVec<[String; 4]>);

impl ConnectedSet {
    pub fn new() -> Self {
        ConnectedSet(SmallVec::new())
    }

    /// Insert a name if absent. Returns true when the set changed.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    /// Remove a name. Returns true when the set changed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|n| n != name);
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for ConnectedSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<ConnectedSet> for Vec<String> {
    fn from(set: ConnectedSet) -> Self {
        set.0.into_vec()
    }
}

impl<S: Into<String>> FromIterator<S> for ConnectedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ConnectedSet::new();
        for name in iter {
            let name = name.into();
            set.insert(&name);
        }
        set
    }
}

/// One structural or process member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique name within its model (e.g., "B12", "C3")
    pub name: String,

    /// Member kind. Inferred from the name when missing in input.
    #[serde(default)]
    pub kind: Option<ElementKind>,

    pub start_pos: Point3,
    pub end_pos: Point3,

    #[serde(default)]
    pub start_connected: ConnectedSet,

    #[serde(default)]
    pub end_connected: ConnectedSet,

    /// Clash envelope half-size in meters (pipe radius, half flange width...)
    #[serde(default)]
    pub radius: f64,

    /// Section profile metadata, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,

    /// Material metadata, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<serde_json::Value>,
}

impl Element {
    /// Create an unconnected element of the given kind.
    pub fn new(
        name: impl Into<String>,
        kind: ElementKind,
        start_pos: Point3,
        end_pos: Point3,
    ) -> Self {
        Element {
            name: name.into(),
            kind: Some(kind),
            start_pos,
            end_pos,
            start_connected: ConnectedSet::new(),
            end_connected: ConnectedSet::new(),
            radius: 0.0,
            profile: None,
            material: None,
        }
    }

    /// Builder: attach neighbor names at the start end
    pub fn with_start_connected<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.start_connected = names.into_iter().collect();
        self
    }

    /// Builder: attach neighbor names at the end end
    pub fn with_end_connected<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.end_connected = names.into_iter().collect();
        self
    }

    /// Builder: set the clash envelope radius
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Declared kind, or the kind implied by the name
    pub fn kind(&self) -> ElementKind {
        self.kind.unwrap_or_else(|| ElementKind::from_name(&self.name))
    }

    pub fn position(&self, end: End) -> Point3 {
        match end {
            End::Start => self.start_pos,
            End::End => self.end_pos,
        }
    }

    pub fn connected(&self, end: End) -> &ConnectedSet {
        match end {
            End::Start => &self.start_connected,
            End::End => &self.end_connected,
        }
    }

    pub fn connected_mut(&mut self, end: End) -> &mut ConnectedSet {
        match end {
            End::Start => &mut self.start_connected,
            End::End => &mut self.end_connected,
        }
    }

    /// True if `name` appears at either end
    pub fn is_connected_to(&self, name: &str) -> bool {
        self.start_connected.contains(name) || self.end_connected.contains(name)
    }

    /// All neighbor names, start end first, without duplicates
    pub fn neighbor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            Vec::with_capacity(self.start_connected.len() + self.end_connected.len());
        for name in self.start_connected.iter().chain(self.end_connected.iter()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Lower elevation of the member
    pub fn bottom_elevation(&self) -> f64 {
        self.start_pos.y.min(self.end_pos.y)
    }

    /// Upper elevation of the member
    pub fn top_elevation(&self) -> f64 {
        self.start_pos.y.max(self.end_pos.y)
    }

    pub fn length(&self) -> f64 {
        self.start_pos.distance_to(&self.end_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(ElementKind::from_name("C12"), ElementKind::Column);
        assert_eq!(ElementKind::from_name("CL3"), ElementKind::Cantilever);
        assert_eq!(ElementKind::from_name("B7"), ElementKind::Beam);
        assert_eq!(ElementKind::from_name("P100"), ElementKind::Pipe);
        assert_eq!(ElementKind::from_name("BR1"), ElementKind::Other);
        assert_eq!(ElementKind::from_name("C1a"), ElementKind::Other);
    }

    #[test]
    fn test_connected_set_keeps_insertion_order() {
        let mut set = ConnectedSet::new();
        assert!(set.insert("C2"));
        assert!(set.insert("C1"));
        assert!(!set.insert("C2"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["C2", "C1"]);
        assert!(set.remove("C2"));
        assert!(!set.remove("C2"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_element_json_infers_kind() {
        let json = r#"{
            "name": "B1",
            "start_pos": { "x": 0.0, "y": 3.0, "z": 0.0 },
            "end_pos": { "x": 6.0, "y": 3.0, "z": 0.0 },
            "start_connected": ["C1", "C1"],
            "profile": { "section": "ISMB 300" }
        }"#;
        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(element.kind(), ElementKind::Beam);
        assert_eq!(element.start_connected.len(), 1);
        assert!(element.end_connected.is_empty());
        assert_eq!(element.profile.as_ref().unwrap()["section"], "ISMB 300");
    }

    #[test]
    fn test_neighbor_names_dedup() {
        let end = Point3::new(1.0, 0.0, 0.0);
        let element = Element::new("B1", ElementKind::Beam, Point3::default(), end)
            .with_start_connected(["C1", "B2"])
            .with_end_connected(["B2", "C2"]);
        assert_eq!(element.neighbor_names(), vec!["C1", "B2", "C2"]);
        assert!(element.is_connected_to("C2"));
    }
}
