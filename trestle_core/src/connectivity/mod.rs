//! # Connectivity Map
//!
//! Per-model index of elements by name. Elements live in an arena (`Vec`) in
//! insertion order; a name index gives O(1) lookup. Neighbor sets store names,
//! so the bidirectional graph never forms ownership cycles.
//!
//! A map is built fresh for one user action and thrown away afterwards. The
//! element list handed back by [`ConnectivityMap::into_elements`] is the only
//! thing worth keeping.
//!
//! ## Example
//!
//! ```rust
//! use trestle_core::connectivity::ConnectivityMap;
//! use trestle_core::element::{Element, ElementKind};
//! use trestle_core::geometry::Point3;
//!
//! let (map, warnings) = ConnectivityMap::build(vec![
//!     Element::new("C1", ElementKind::Column, Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 3.0, 0.0)),
//!     Element::new("B1", ElementKind::Beam, Point3::new(0.0, 3.0, 0.0), Point3::new(6.0, 3.0, 0.0))
//!         .with_start_connected(["C1"]),
//! ]);
//!
//! assert!(warnings.is_empty());
//! assert_eq!(map.get("B1").unwrap().start_connected.len(), 1);
//! ```

pub mod rewiring;

use std::collections::HashMap;

use tracing::warn;

use crate::element::Element;
use crate::errors::{EngineError, EngineResult};
use crate::warnings::Warning;

pub use rewiring::{detach, reconnect};

/// Name-keyed arena of one model's elements.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityMap {
    elements: Vec<Element>,
    index: HashMap<String, usize>,
}

impl ConnectivityMap {
    /// Build a map from an element list.
    ///
    /// Duplicate names are last-write-wins: the later element replaces the
    /// earlier one in its original slot and a `DuplicateName` warning is
    /// returned.
    pub fn build(elements: impl IntoIterator<Item = Element>) -> (Self, Vec<Warning>) {
        let mut map = ConnectivityMap::default();
        let mut warnings = Vec::new();

        for element in elements {
            match map.index.get(&element.name) {
                Some(&slot) => {
                    warn!(
                        name = %element.name,
                        "duplicate element name, replacing earlier definition"
                    );
                    warnings.push(Warning::DuplicateName {
                        name: element.name.clone(),
                    });
                    map.elements[slot] = element;
                }
                None => {
                    map.index.insert(element.name.clone(), map.elements.len());
                    map.elements.push(element);
                }
            }
        }

        (map, warnings)
    }

    /// Look up an element by name.
    pub fn get(&self, name: &str) -> Option<&Element> {
        self.index.get(name).map(|&i| &self.elements[i])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Element> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.elements[i]),
            None => None,
        }
    }

    /// Look up an element, failing with `ElementNotFound`.
    pub fn require(&self, name: &str) -> EngineResult<&Element> {
        self.get(name).ok_or_else(|| EngineError::element_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }

    /// Resolve the neighbors of `name`.
    ///
    /// Names that do not resolve are reported as `DanglingReference` warnings
    /// instead of being skipped silently.
    pub fn neighbors(&self, name: &str) -> EngineResult<(Vec<&Element>, Vec<Warning>)> {
        let element = self.require(name)?;
        let mut found = Vec::new();
        let mut warnings = Vec::new();

        for neighbor in element.neighbor_names() {
            match self.get(neighbor) {
                Some(e) => found.push(e),
                None => warnings.push(Warning::DanglingReference {
                    element: name.to_string(),
                    missing: neighbor.to_string(),
                }),
            }
        }

        Ok((found, warnings))
    }

    /// Every dangling reference in the map, in element order.
    pub fn dangling_references(&self) -> Vec<Warning> {
        self.elements
            .iter()
            .flat_map(|element| {
                element
                    .neighbor_names()
                    .into_iter()
                    .filter(|n| !self.contains(n))
                    .map(|missing| Warning::DanglingReference {
                        element: element.name.clone(),
                        missing: missing.to_string(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Consume the map, returning elements in insertion order.
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}
