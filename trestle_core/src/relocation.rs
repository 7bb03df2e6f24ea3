//! # Elevation Relocation
//!
//! Moves beams and cantilevers to a new elevation while keeping them within
//! the band their supporting columns allow.
//!
//! ## Algorithm
//!
//! For each target, in request order:
//!
//! 1. Start with `start_max = start_min = end_max = end_min = start_pos.y`.
//! 2. Each column at the start end widens `start_max` to the column top and
//!    lowers `start_min` to the column bottom. Same for the end end.
//! 3. The allowed band is `[max(start_min, end_min), min(start_max, end_max)]`.
//!    An end with no column keeps its `(y, y)` bounds and so pins the band
//!    to the current elevation, unless `free_ends_unconstrained` is set.
//! 4. Outside the band: one `RangeViolation`, element untouched.
//! 5. Non-column members attached to the element block the move with a
//!    `DependencyConflict`, unless they already moved in this batch or are
//!    later targets that will pass their own checks.
//! 6. Otherwise detach, set both ends to the new elevation, reconnect.
//!    Crossings found while reconnecting become `CrossingConflict` warnings;
//!    the move stays applied.
//!
//! Targets are processed strictly in order. A later target's band is computed
//! against the positions earlier targets already moved to.
//!
//! ## Example
//!
//! ```rust
//! use trestle_core::config::EngineConfig;
//! use trestle_core::connectivity::ConnectivityMap;
//! use trestle_core::element::{Element, ElementKind};
//! use trestle_core::geometry::Point3;
//! use trestle_core::relocation::{relocate, ElevationRelocationRequest};
//!
//! let (map, _) = ConnectivityMap::build(vec![
//!     Element::new("C1", ElementKind::Column, Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 5.0, 0.0)),
//!     Element::new("C2", ElementKind::Column, Point3::new(0.0, 0.0, 6.0), Point3::new(0.0, 5.0, 6.0)),
//!     Element::new("B1", ElementKind::Beam, Point3::new(0.0, 3.0, 0.0), Point3::new(0.0, 3.0, 6.0))
//!         .with_start_connected(["C1"])
//!         .with_end_connected(["C2"]),
//! ]);
//!
//! let request = ElevationRelocationRequest::new(["B1"], 4.0);
//! let outcome = relocate(map, &request, &EngineConfig::default()).unwrap();
//!
//! assert_eq!(outcome.relocated, vec!["B1".to_string()]);
//! assert!(outcome.warnings.is_empty());
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ColumnMatcher, EngineConfig};
use crate::connectivity::{detach, reconnect, ConnectivityMap};
use crate::element::{ConnectedSet, Element, ElementKind};
use crate::errors::{EngineError, EngineResult};
use crate::warnings::{Bound, Warning};

/// Target elements and the elevation (m) to move them to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationRelocationRequest {
    pub targets: Vec<String>,
    pub elevation: f64,
}

impl ElevationRelocationRequest {
    pub fn new<S: Into<String>>(targets: impl IntoIterator<Item = S>, elevation: f64) -> Self {
        ElevationRelocationRequest {
            targets: targets.into_iter().map(Into::into).collect(),
            elevation,
        }
    }
}

/// Inclusive elevation interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationBand {
    pub min: f64,
    pub max: f64,
}

impl ElevationBand {
    pub fn unbounded() -> Self {
        ElevationBand {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    pub fn contains(&self, elevation: f64) -> bool {
        elevation >= self.min && elevation <= self.max
    }

    /// The bound `elevation` violates, with its limit
    pub fn violation(&self, elevation: f64) -> Option<(Bound, f64)> {
        if elevation < self.min {
            Some((Bound::Min, self.min))
        } else if elevation > self.max {
            Some((Bound::Max, self.max))
        } else {
            None
        }
    }
}

/// Result of a relocation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocationOutcome {
    /// Full element collection; untouched elements are returned unchanged
    pub elements: Vec<Element>,

    /// Warnings for every target, in processing order
    pub warnings: Vec<Warning>,

    /// Names of the elements that were actually moved
    pub relocated: Vec<String>,
}

impl RelocationOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Relocate the request targets within `map`.
///
/// Only a non-finite elevation or an invalid column pattern fails the whole
/// call. Every per-element problem is a warning.
pub fn relocate(
    mut map: ConnectivityMap,
    request: &ElevationRelocationRequest,
    config: &EngineConfig,
) -> EngineResult<RelocationOutcome> {
    if !request.elevation.is_finite() {
        return Err(EngineError::invalid_input(
            "elevation",
            request.elevation.to_string(),
            "Elevation must be a finite number",
        ));
    }
    let matcher = config.column_matcher()?;

    let mut warnings = Vec::new();
    let mut relocated: Vec<String> = Vec::new();

    for (index, target) in request.targets.iter().enumerate() {
        let before = warnings.len();
        let batch = Batch {
            elevation: request.elevation,
            matcher: &matcher,
            config,
            relocated: &relocated,
            pending: &request.targets[index + 1..],
        };
        if relocate_one(&mut map, target, &batch, &mut warnings) {
            relocated.push(target.clone());
        }
        for warning in &warnings[before..] {
            debug!(element = %target, code = warning.code(), "{}", warning);
        }
    }

    info!(
        targets = request.targets.len(),
        relocated = relocated.len(),
        warnings = warnings.len(),
        elevation = request.elevation,
        "relocation batch finished"
    );

    Ok(RelocationOutcome {
        elements: map.into_elements(),
        warnings,
        relocated,
    })
}

/// Build a map from an element list and relocate within it.
///
/// Map construction warnings (duplicate names) lead the returned warnings.
pub fn relocate_elements(
    elements: Vec<Element>,
    request: &ElevationRelocationRequest,
    config: &EngineConfig,
) -> EngineResult<RelocationOutcome> {
    let (map, build_warnings) = ConnectivityMap::build(elements);
    let mut outcome = relocate(map, request, config)?;
    if !build_warnings.is_empty() {
        outcome.warnings.splice(0..0, build_warnings);
    }
    Ok(outcome)
}

/// Where the batch stands when a target is processed.
struct Batch<'a> {
    elevation: f64,
    matcher: &'a ColumnMatcher,
    config: &'a EngineConfig,
    /// Targets already moved, in order
    relocated: &'a [String],
    /// Targets still to come after the current one
    pending: &'a [String],
}

impl Batch<'_> {
    fn band(&self, map: &ConnectivityMap, element: &Element) -> (ElevationBand, Vec<Warning>) {
        elevation_band(map, element, self.matcher, self.config.free_ends_unconstrained)
    }

    fn has_relocated(&self, name: &str) -> bool {
        self.relocated.iter().any(|r| r == name)
    }

    fn is_pending(&self, name: &str) -> bool {
        self.pending.iter().any(|p| p == name)
    }
}

fn relocate_one(
    map: &mut ConnectivityMap,
    target: &str,
    batch: &Batch<'_>,
    warnings: &mut Vec<Warning>,
) -> bool {
    let elevation = batch.elevation;
    let Some(element) = map.get(target) else {
        warnings.push(Warning::MissingElement {
            name: target.to_string(),
        });
        return false;
    };

    let kind = element.kind();
    if !kind.is_relocatable() {
        warnings.push(Warning::NotRelocatable {
            name: target.to_string(),
            kind: kind.to_string(),
        });
        return false;
    }

    let (band, dangling) = batch.band(map, element);
    warnings.extend(dangling);

    if let Some((bound, limit)) = band.violation(elevation) {
        warnings.push(Warning::RangeViolation {
            element: target.to_string(),
            requested: elevation,
            bound,
            limit,
        });
        return false;
    }

    let dependents = additional_elements(map, element, batch);
    if !dependents.is_empty() {
        warnings.push(Warning::DependencyConflict {
            element: target.to_string(),
            dependents,
        });
        return false;
    }

    // Names outside this model cannot be recomputed from geometry; carry them over.
    let dangling_start = unresolved(map, &element.start_connected);
    let dangling_end = unresolved(map, &element.end_connected);

    if detach(map, target, true).is_err() {
        return false;
    }
    if let Some(element) = map.get_mut(target) {
        element.start_pos.y = elevation;
        element.end_pos.y = elevation;
    }
    let reconnected = reconnect(map, target, batch.config.connection_tolerance, |a, b| {
        warnings.push(Warning::CrossingConflict {
            first: a.to_string(),
            second: b.to_string(),
        });
    });
    if let Some(element) = map.get_mut(target) {
        for name in &dangling_start {
            element.start_connected.insert(name);
        }
        for name in &dangling_end {
            element.end_connected.insert(name);
        }
    }
    reconnected.is_ok()
}

fn unresolved(map: &ConnectivityMap, connected: &ConnectedSet) -> Vec<String> {
    connected
        .iter()
        .filter(|name| !map.contains(name))
        .map(str::to_string)
        .collect()
}

/// Elevation band allowed by the columns connected to `element`.
///
/// Both ends start at `(y, y)` with `y` the element's start elevation; each
/// present column widens its end to the column's extent. The band is the
/// intersection of the two ends. With `free_ends_unconstrained`, an end with
/// no present column is left out of the intersection instead.
///
/// Column-pattern names missing from the map come back as
/// `DanglingReference` warnings and do not widen anything.
pub fn elevation_band(
    map: &ConnectivityMap,
    element: &Element,
    matcher: &ColumnMatcher,
    free_ends_unconstrained: bool,
) -> (ElevationBand, Vec<Warning>) {
    let origin = element.start_pos.y;
    let mut warnings = Vec::new();

    let mut end_limits = |connected: &ConnectedSet| -> Option<(f64, f64)> {
        let mut low = origin;
        let mut high = origin;
        let mut constrained = false;
        for name in connected.iter().filter(|n| matcher.is_column(n)) {
            match map.get(name) {
                Some(column) => {
                    high = high.max(column.top_elevation());
                    low = low.min(column.bottom_elevation());
                    constrained = true;
                }
                None => warnings.push(Warning::DanglingReference {
                    element: element.name.clone(),
                    missing: name.to_string(),
                }),
            }
        }
        (constrained || !free_ends_unconstrained).then_some((low, high))
    };

    let start = end_limits(&element.start_connected);
    let end = end_limits(&element.end_connected);

    let mut band = ElevationBand::unbounded();
    for (low, high) in [start, end].into_iter().flatten() {
        band.min = band.min.max(low);
        band.max = band.max.min(high);
    }
    (band, warnings)
}

/// Members attached to `element` that a move would leave invalid.
///
/// Members that already moved in this batch are exempt, and so are later
/// targets that will pass their own band and dependency checks.
fn additional_elements<'m>(
    map: &'m ConnectivityMap,
    element: &'m Element,
    batch: &Batch<'_>,
) -> Vec<String> {
    let mut assumed: HashSet<&str> = HashSet::from([element.name.as_str()]);
    attached_members(map, element, batch.matcher)
        .into_iter()
        .filter(|name| !batch.has_relocated(name))
        .filter(|name| !will_follow(map, *name, batch, &mut assumed))
        .map(str::to_string)
        .collect()
}

/// Non-column members attached to `element` in either direction.
fn attached_members<'m>(
    map: &'m ConnectivityMap,
    element: &Element,
    matcher: &ColumnMatcher,
) -> Vec<&'m str> {
    let mut candidates: Vec<&str> = element.neighbor_names();
    for other in map.iter().filter(|o| o.name != element.name && o.is_connected_to(&element.name)) {
        if !candidates.contains(&other.name.as_str()) {
            candidates.push(&other.name);
        }
    }

    candidates
        .into_iter()
        .filter(|name| *name != element.name)
        .filter_map(|name| map.get(name))
        .filter(|other| !is_simple_column(other, matcher))
        .map(|other| other.name.as_str())
        .collect()
}

/// True when `name` is a later target whose own move will go through.
///
/// `assumed` holds members already taken to be moving, which breaks cycles
/// between members that hang off each other.
fn will_follow<'m>(
    map: &'m ConnectivityMap,
    name: &'m str,
    batch: &Batch<'_>,
    assumed: &mut HashSet<&'m str>,
) -> bool {
    if assumed.contains(name) {
        return true;
    }
    if !batch.is_pending(name) {
        return false;
    }
    let Some(element) = map.get(name) else {
        return false;
    };
    if !element.kind().is_relocatable() || !batch.band(map, element).0.contains(batch.elevation) {
        return false;
    }

    assumed.insert(name);
    let follows = attached_members(map, element, batch.matcher)
        .into_iter()
        .filter(|other| !batch.has_relocated(other))
        .all(|other| will_follow(map, other, batch, assumed));
    if !follows {
        assumed.remove(name);
    }
    follows
}

fn is_simple_column(element: &Element, matcher: &ColumnMatcher) -> bool {
    match element.kind() {
        ElementKind::Column => true,
        ElementKind::Beam | ElementKind::Cantilever | ElementKind::Pipe | ElementKind::Other => {
            matcher.is_column(&element.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;
    use proptest::prelude::*;

    fn column(name: &str, x: f64, bottom: f64, top: f64) -> Element {
        let (start, end) = (Point3::new(x, bottom, 0.0), Point3::new(x, top, 0.0));
        Element::new(name, ElementKind::Column, start, end)
    }

    fn beam(name: &str, x0: f64, x1: f64, y: f64) -> Element {
        Element::new(name, ElementKind::Beam, Point3::new(x0, y, 0.0), Point3::new(x1, y, 0.0))
    }

    /// C1 spans 0..3, C2 spans 0..5, B1 sits on top of C1.
    fn portal() -> Vec<Element> {
        vec![
            column("C1", 0.0, 0.0, 3.0).with_end_connected(["B1"]),
            column("C2", 6.0, 0.0, 5.0).with_end_connected(["B1"]),
            beam("B1", 0.0, 6.0, 3.0).with_start_connected(["C1"]).with_end_connected(["C2"]),
        ]
    }

    fn positions(elements: &[Element], name: &str) -> (f64, f64) {
        let e = elements.iter().find(|e| e.name == name).unwrap();
        (e.start_pos.y, e.end_pos.y)
    }

    #[test]
    fn test_band_is_intersection_of_column_ranges() {
        let (map, _) = ConnectivityMap::build(portal());
        let b1 = map.get("B1").unwrap();
        let (band, warnings) = elevation_band(&map, b1, &ColumnMatcher::default(), false);
        assert!(warnings.is_empty());
        assert_eq!(band, ElevationBand { min: 0.0, max: 3.0 });
    }

    #[test]
    fn test_above_band_rejected_with_max_bound() {
        let request = ElevationRelocationRequest::new(["B1"], 4.0);
        let outcome = relocate_elements(portal(), &request, &EngineConfig::default()).unwrap();

        assert!(outcome.relocated.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![Warning::RangeViolation {
                element: "B1".to_string(),
                requested: 4.0,
                bound: Bound::Max,
                limit: 3.0,
            }]
        );
        assert_eq!(positions(&outcome.elements, "B1"), (3.0, 3.0));
    }

    #[test]
    fn test_below_band_rejected_with_min_bound() {
        let request = ElevationRelocationRequest::new(["B1"], -0.5);
        let outcome = relocate_elements(portal(), &request, &EngineConfig::default()).unwrap();
        assert!(matches!(
            outcome.warnings.as_slice(),
            [Warning::RangeViolation { bound: Bound::Min, limit, .. }] if *limit == 0.0
        ));
    }

    #[test]
    fn test_inside_band_moves_and_rewires() {
        let request = ElevationRelocationRequest::new(["B1"], 2.0);
        let outcome = relocate_elements(portal(), &request, &EngineConfig::default()).unwrap();

        assert_eq!(outcome.relocated, vec!["B1".to_string()]);
        assert!(outcome.warnings.is_empty());
        assert_eq!(positions(&outcome.elements, "B1"), (2.0, 2.0));
        assert_eq!(positions(&outcome.elements, "C1"), (0.0, 3.0));

        let b1 = outcome.elements.iter().find(|e| e.name == "B1").unwrap();
        assert!(b1.start_connected.contains("C1"));
        assert!(b1.end_connected.contains("C2"));
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let request = ElevationRelocationRequest::new(["B1"], 0.0);
        let outcome = relocate_elements(portal(), &request, &EngineConfig::default()).unwrap();
        assert_eq!(outcome.relocated.len(), 1);
    }

    #[test]
    fn test_dependent_beam_blocks_move() {
        let mut elements = portal();
        let (start, end) = (Point3::new(3.0, 3.0, 0.0), Point3::new(3.0, 3.0, 4.0));
        elements
            .push(Element::new("B5", ElementKind::Beam, start, end).with_start_connected(["B1"]));
        let request = ElevationRelocationRequest::new(["B1"], 2.0);
        let outcome = relocate_elements(elements, &request, &EngineConfig::default()).unwrap();

        assert!(outcome.relocated.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![Warning::DependencyConflict {
                element: "B1".to_string(),
                dependents: vec!["B5".to_string()],
            }]
        );
        assert_eq!(positions(&outcome.elements, "B1"), (3.0, 3.0));
    }

    /// Portal plus B5 hanging off B1, carried by C3 and C4 (C4 spans `c4_bottom..4`).
    fn portal_with_secondary(c4_bottom: f64) -> Vec<Element> {
        let mut elements = portal();
        let near = |y: f64| Point3::new(3.0, y, 1.0);
        let far = |y: f64| Point3::new(3.0, y, 4.0);
        elements.extend([
            Element::new("C3", ElementKind::Column, near(0.0), near(5.0)),
            Element::new("C4", ElementKind::Column, far(c4_bottom), far(4.0)),
            Element::new("B5", ElementKind::Beam, near(3.0), far(3.0))
                .with_start_connected(["B1", "C3"])
                .with_end_connected(["C4"]),
        ]);
        elements
    }

    #[test]
    fn test_dependent_moving_in_same_request_does_not_block() {
        let request = ElevationRelocationRequest::new(["B1", "B5"], 2.0);
        let config = EngineConfig::default();
        let outcome = relocate_elements(portal_with_secondary(0.0), &request, &config).unwrap();
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        assert_eq!(outcome.relocated, vec!["B1".to_string(), "B5".to_string()]);
        assert_eq!(positions(&outcome.elements, "B5"), (2.0, 2.0));
    }

    #[test]
    fn test_dependent_that_cannot_follow_still_blocks() {
        // B5's own band is [2.5, 4], so it cannot follow B1 down to 2.0.
        let request = ElevationRelocationRequest::new(["B1", "B5"], 2.0);
        let config = EngineConfig::default();
        let outcome = relocate_elements(portal_with_secondary(2.5), &request, &config).unwrap();

        assert!(outcome.relocated.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![
                Warning::DependencyConflict {
                    element: "B1".to_string(),
                    dependents: vec!["B5".to_string()],
                },
                Warning::RangeViolation {
                    element: "B5".to_string(),
                    requested: 2.0,
                    bound: Bound::Min,
                    limit: 2.5,
                },
            ]
        );
        assert_eq!(positions(&outcome.elements, "B1"), (3.0, 3.0));
        let b5 = outcome.elements.iter().find(|e| e.name == "B5").unwrap();
        assert!(b5.start_connected.contains("B1"));
    }

    #[test]
    fn test_dependents_listed_earlier_in_request_are_exempt() {
        // B5 goes first; B1 no longer blocks it once B5 has moved.
        let request = ElevationRelocationRequest::new(["B5", "B1"], 2.0);
        let config = EngineConfig::default();
        let outcome = relocate_elements(portal_with_secondary(0.0), &request, &config).unwrap();
        assert_eq!(outcome.relocated, vec!["B5".to_string(), "B1".to_string()]);
    }

    #[test]
    fn test_crossing_reported_but_move_applied() {
        let mut elements = portal();
        elements.push(Element::new(
            "B9",
            ElementKind::Other,
            Point3::new(3.0, 2.0, -2.0),
            Point3::new(3.0, 2.0, 2.0),
        ));
        let request = ElevationRelocationRequest::new(["B1"], 2.0);
        let outcome = relocate_elements(elements, &request, &EngineConfig::default()).unwrap();

        assert_eq!(outcome.relocated, vec!["B1".to_string()]);
        assert_eq!(
            outcome.warnings,
            vec![Warning::CrossingConflict {
                first: "B1".to_string(),
                second: "B9".to_string(),
            }]
        );
        assert_eq!(positions(&outcome.elements, "B1"), (2.0, 2.0));
    }

    #[test]
    fn test_batch_continues_after_failures() {
        let mut elements = portal();
        elements.extend([
            column("C3", 10.0, 0.0, 9.0),
            column("C4", 12.0, 0.0, 9.0),
            beam("B2", 10.0, 12.0, 1.0).with_start_connected(["C3"]).with_end_connected(["C4"]),
        ]);
        let request = ElevationRelocationRequest::new(["B404", "C1", "B2"], 8.0);
        let outcome = relocate_elements(elements, &request, &EngineConfig::default()).unwrap();

        let codes: Vec<_> = outcome.warnings.iter().map(Warning::code).collect();
        assert_eq!(codes, vec!["MISSING_ELEMENT", "NOT_RELOCATABLE"]);
        assert_eq!(outcome.relocated, vec!["B2".to_string()]);
        assert_eq!(positions(&outcome.elements, "B2"), (8.0, 8.0));
    }

    fn cantilever_on_tall_column() -> Vec<Element> {
        vec![
            column("C1", 0.0, 0.0, 5.0),
            Element::new(
                "CL1",
                ElementKind::Cantilever,
                Point3::new(0.0, 3.0, 0.0),
                Point3::new(2.0, 3.0, 0.0),
            )
            .with_start_connected(["C1"]),
        ]
    }

    #[test]
    fn test_free_end_pins_band_by_default() {
        let (map, _) = ConnectivityMap::build(cantilever_on_tall_column());
        let cl1 = map.get("CL1").unwrap();
        let (band, _) = elevation_band(&map, cl1, &ColumnMatcher::default(), false);
        assert_eq!(band, ElevationBand { min: 3.0, max: 3.0 });

        let request = ElevationRelocationRequest::new(["CL1"], 4.5);
        let config = EngineConfig::default();
        let outcome = relocate_elements(cantilever_on_tall_column(), &request, &config).unwrap();
        assert!(outcome.relocated.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![Warning::RangeViolation {
                element: "CL1".to_string(),
                requested: 4.5,
                bound: Bound::Max,
                limit: 3.0,
            }]
        );
    }

    #[test]
    fn test_free_end_unconstrained_when_configured() {
        let config = EngineConfig {
            free_ends_unconstrained: true,
            ..EngineConfig::default()
        };
        let request = ElevationRelocationRequest::new(["CL1"], 4.5);
        let outcome = relocate_elements(cantilever_on_tall_column(), &request, &config).unwrap();
        assert_eq!(outcome.relocated, vec!["CL1".to_string()]);
        assert_eq!(positions(&outcome.elements, "CL1"), (4.5, 4.5));

        // No columns at all leaves the band open on both sides.
        let (map, _) = ConnectivityMap::build(vec![beam("B1", 0.0, 6.0, 3.0)]);
        let b1 = map.get("B1").unwrap();
        let (band, _) = elevation_band(&map, b1, &ColumnMatcher::default(), true);
        assert_eq!(band, ElevationBand::unbounded());
    }

    #[test]
    fn test_dangling_column_reported() {
        let elements = vec![beam("B1", 0.0, 6.0, 3.0).with_start_connected(["C7"])];
        let request = ElevationRelocationRequest::new(["B1"], 3.0);
        let outcome = relocate_elements(elements, &request, &EngineConfig::default()).unwrap();
        assert_eq!(outcome.warnings[0].code(), "DANGLING_REFERENCE");
        assert_eq!(outcome.relocated, vec!["B1".to_string()]);
        // Dangling names are never dropped.
        assert!(outcome.elements[0].start_connected.contains("C7"));
    }

    #[test]
    fn test_non_finite_elevation_is_an_error() {
        let request = ElevationRelocationRequest::new(["B1"], f64::NAN);
        assert!(relocate_elements(portal(), &request, &EngineConfig::default()).is_err());
    }

    proptest! {
        #[test]
        fn prop_outside_band_leaves_element_unchanged(
            elevation in prop_oneof![-50.0f64..-0.001, 3.001f64..50.0],
        ) {
            let request = ElevationRelocationRequest::new(["B1"], elevation);
            let outcome = relocate_elements(portal(), &request, &EngineConfig::default()).unwrap();
            prop_assert_eq!(outcome.warnings.len(), 1);
            prop_assert_eq!(outcome.warnings[0].code(), "RANGE_VIOLATION");
            prop_assert_eq!(positions(&outcome.elements, "B1"), (3.0, 3.0));
        }

        #[test]
        fn prop_inside_band_moves_only_target(elevation in 0.001f64..2.999) {
            let request = ElevationRelocationRequest::new(["B1"], elevation);
            let outcome = relocate_elements(portal(), &request, &EngineConfig::default()).unwrap();
            prop_assert_eq!(positions(&outcome.elements, "B1"), (elevation, elevation));
            prop_assert_eq!(positions(&outcome.elements, "C1"), (0.0, 3.0));
            prop_assert_eq!(positions(&outcome.elements, "C2"), (0.0, 5.0));
        }
    }
}
