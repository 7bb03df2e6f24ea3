//! Broad-phase / narrow-phase clash search.
//!
//! Every element is treated as a capsule: its axis segment grown by `radius`.
//! The broad phase sorts inflated bounding boxes along x and sweeps; the
//! narrow phase computes the exact closest approach of the surviving pairs.
//! Pairs are normalized to input order before the narrow phase, so one pair
//! yields one record and the output order depends only on input order.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info};

use super::{ClashRecord, ElementRef};
use crate::element::Element;
use crate::errors::{EngineError, EngineResult};
use crate::geometry::{segment_closest_approach, Aabb};
use crate::snapshot::ClashRequest;

/// Slack so exactly touching axes survive floating-point noise.
const CONTACT_EPS: f64 = 1e-9;

struct Candidate<'a> {
    model: &'a str,
    element: &'a Element,
    aabb: Aabb,
}

/// Run clash detection over a full request snapshot.
///
/// Two elements clash when their axes pass within
/// `radius_a + radius_b + tolerance` of each other. Elements of the same model
/// that reference each other as connected never clash.
///
/// # Example
///
/// ```rust
/// use trestle_core::clash::detect_clashes;
/// use trestle_core::element::{Element, ElementKind};
/// use trestle_core::geometry::Point3;
/// use trestle_core::snapshot::{ClashRequest, Discipline, ModelSnapshot, Snapshot};
///
/// let steel = ModelSnapshot::new("Steel", Discipline::Structural).with_element(
///     Element::new("B1", ElementKind::Beam, Point3::new(0.0, 3.0, 0.0), Point3::new(6.0, 3.0, 0.0)),
/// );
/// let pipes = ModelSnapshot::new("Pipes", Discipline::Piping).with_element(
///     Element::new("P1", ElementKind::Pipe, Point3::new(3.0, 3.0, -2.0), Point3::new(3.0, 3.0, 2.0))
///         .with_radius(0.1),
/// );
/// let request = ClashRequest::new(Snapshot::new().with_model(steel), Snapshot::new().with_model(pipes));
///
/// let records = detect_clashes(&request, 0.0).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].pos, Point3::new(3.0, 3.0, 0.0));
/// ```
pub fn detect_clashes(request: &ClashRequest, tolerance: f64) -> EngineResult<Vec<ClashRecord>> {
    let never = AtomicBool::new(false);
    detect_clashes_cancellable(request, tolerance, &never)?
        .ok_or_else(|| EngineError::Internal {
            message: "uncancellable clash run reported cancellation".to_string(),
        })
}

/// Cancellable clash detection.
///
/// Returns `Ok(None)` as soon as `cancel` is observed set.
pub fn detect_clashes_cancellable(
    request: &ClashRequest,
    tolerance: f64,
    cancel: &AtomicBool,
) -> EngineResult<Option<Vec<ClashRecord>>> {
    if !(tolerance >= 0.0) || !tolerance.is_finite() {
        return Err(EngineError::invalid_input(
            "tolerance",
            tolerance.to_string(),
            "Tolerance must be a finite, non-negative number",
        ));
    }

    let elements: Vec<(&str, Element)> = request
        .models()
        .flat_map(|model| {
            model
                .all_elements()
                .into_iter()
                .map(move |e| (model.name.as_str(), e))
        })
        .collect();

    let mut candidates = Vec::with_capacity(elements.len());
    for (model, element) in &elements {
        validate_element(model, element)?;
        candidates.push(Candidate {
            model,
            element,
            aabb: Aabb::from_segment(
                &element.start_pos,
                &element.end_pos,
                element.radius + tolerance / 2.0,
            ),
        });
    }

    let pairs = broad_phase(&candidates);
    debug!(elements = candidates.len(), pairs = pairs.len(), "broad phase complete");
    if cancel.load(Ordering::Relaxed) {
        return Ok(None);
    }

    let hits: Vec<Option<ClashRecord>> = pairs
        .par_iter()
        .map(|&(i, j)| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            narrow_phase(&candidates[i], &candidates[j], tolerance)
        })
        .collect();

    if cancel.load(Ordering::Relaxed) {
        return Ok(None);
    }

    let records: Vec<ClashRecord> = hits
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(n, mut record)| {
            record.id = n as u32 + 1;
            record
        })
        .collect();

    info!(
        elements = candidates.len(),
        candidate_pairs = pairs.len(),
        clashes = records.len(),
        "clash detection finished"
    );
    Ok(Some(records))
}

fn validate_element(model: &str, element: &Element) -> EngineResult<()> {
    let coords = [
        element.start_pos.x,
        element.start_pos.y,
        element.start_pos.z,
        element.end_pos.x,
        element.end_pos.y,
        element.end_pos.z,
    ];
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(EngineError::invalid_input(
            format!("{}/{}", model, element.name),
            format!("{:?} -> {:?}", element.start_pos, element.end_pos),
            "Element coordinates must be finite",
        ));
    }
    if !(element.radius >= 0.0) || !element.radius.is_finite() {
        return Err(EngineError::invalid_input(
            format!("{}/{}.radius", model, element.name),
            element.radius.to_string(),
            "Radius must be a finite, non-negative number",
        ));
    }
    Ok(())
}

/// Sort-and-sweep on x. Returns overlapping pairs as `(i, j)` with `i < j`,
/// sorted, so the narrow phase sees them in input order.
fn broad_phase(candidates: &[Candidate<'_>]) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[a]
            .aabb
            .min
            .x
            .total_cmp(&candidates[b].aabb.min.x)
            .then(a.cmp(&b))
    });

    let mut pairs = Vec::new();
    for (k, &a) in order.iter().enumerate() {
        let reach = candidates[a].aabb.max.x;
        for &b in &order[k + 1..] {
            if candidates[b].aabb.min.x > reach {
                break;
            }
            if candidates[a].aabb.overlaps(&candidates[b].aabb) {
                pairs.push((a.min(b), a.max(b)));
            }
        }
    }
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

fn narrow_phase(a: &Candidate<'_>, b: &Candidate<'_>, tolerance: f64) -> Option<ClashRecord> {
    if a.model == b.model
        && (a.element.name == b.element.name
            || a.element.is_connected_to(&b.element.name)
            || b.element.is_connected_to(&a.element.name))
    {
        return None;
    }

    let approach = segment_closest_approach(
        &a.element.start_pos,
        &a.element.end_pos,
        &b.element.start_pos,
        &b.element.end_pos,
    );
    let reach = a.element.radius + b.element.radius + tolerance + CONTACT_EPS;
    if approach.distance > reach {
        return None;
    }

    Some(ClashRecord {
        id: 0,
        elements: vec![
            ElementRef::new(a.model, a.element.name.clone()),
            ElementRef::new(b.model, b.element.name.clone()),
        ],
        pos: approach.midpoint(),
        distance: approach.distance,
        ignore: false,
        remark: String::new(),
    })
}
