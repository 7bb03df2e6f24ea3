//! # Connection Rewiring
//!
//! Detaches stale connections and recomputes new ones from geometry. Two
//! elements are connected when an endpoint of one lies on the other's segment
//! within the connection tolerance. Segments that meet anywhere else are
//! reported as crossings through a callback; the callback is informational
//! and never rolls anything back.

use tracing::debug;

use super::ConnectivityMap;
use crate::element::{Element, End};
use crate::errors::{EngineError, EngineResult};
use crate::geometry::{point_segment_distance, segment_closest_approach, Point3};

/// Remove an element's connections.
///
/// The element's own neighbor sets are always cleared. With `bidirectional`,
/// its name is also stripped from every other element's sets; without it the
/// caller is expected to recompute neighbors immediately.
pub fn detach(map: &mut ConnectivityMap, name: &str, bidirectional: bool) -> EngineResult<()> {
    let element = map.get_mut(name).ok_or_else(|| EngineError::element_not_found(name))?;
    element.start_connected.clear();
    element.end_connected.clear();

    if bidirectional {
        for other in map.iter_mut().filter(|e| e.name != name) {
            other.start_connected.remove(name);
            other.end_connected.remove(name);
        }
    }

    debug!(element = name, bidirectional, "detached connections");
    Ok(())
}

/// Recompute the connections of `name` from its current position.
///
/// Every element touching one of `name`'s endpoints, or touched by
/// `name` at one of its own endpoints, is recorded on both sides. The touched
/// side records the contact at its nearest endpoint. `on_crossing(name, other)`
/// fires for every element whose segment meets `name`'s segment without such a
/// contact. Calling this twice on an unchanged map yields the same sets.
///
/// Returns the element's new neighbor names.
pub fn reconnect<F>(
    map: &mut ConnectivityMap,
    name: &str,
    tolerance: f64,
    mut on_crossing: F,
) -> EngineResult<Vec<String>>
where
    F: FnMut(&str, &str),
{
    let (start, end) = {
        let element = map.require(name)?;
        (element.start_pos, element.end_pos)
    };
    detach(map, name, true)?;

    let mut own_links: Vec<(End, String)> = Vec::new();
    let mut back_links: Vec<(String, End)> = Vec::new();
    let mut crossings: Vec<String> = Vec::new();

    for other in map.iter().filter(|e| e.name != name) {
        let mut touched = false;

        for (own_end, point) in [(End::Start, start), (End::End, end)] {
            if point_segment_distance(&point, &other.start_pos, &other.end_pos) <= tolerance {
                own_links.push((own_end, other.name.clone()));
                back_links.push((other.name.clone(), nearest_end(other, &point)));
                touched = true;
            }
        }

        for (other_end, point) in [(End::Start, other.start_pos), (End::End, other.end_pos)] {
            if point_segment_distance(&point, &start, &end) <= tolerance {
                back_links.push((other.name.clone(), other_end));
                own_links.push((nearest_end_of(&start, &end, &point), other.name.clone()));
                touched = true;
            }
        }

        let approach = segment_closest_approach(&start, &end, &other.start_pos, &other.end_pos);
        if !touched && approach.distance <= tolerance {
            crossings.push(other.name.clone());
        }
    }

    if let Some(element) = map.get_mut(name) {
        for (own_end, neighbor) in &own_links {
            element.connected_mut(*own_end).insert(neighbor);
        }
    }
    for (neighbor, neighbor_end) in &back_links {
        if let Some(other) = map.get_mut(neighbor) {
            other.connected_mut(*neighbor_end).insert(name);
        }
    }

    for other in &crossings {
        debug!(element = name, other = %other, "segments cross without a connection");
        on_crossing(name, other);
    }

    let neighbors = map
        .require(name)?
        .neighbor_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    debug!(element = name, neighbors = neighbors.len(), "reconnected");
    Ok(neighbors)
}

fn nearest_end(element: &Element, point: &Point3) -> End {
    nearest_end_of(&element.start_pos, &element.end_pos, point)
}

fn nearest_end_of(start: &Point3, end: &Point3, point: &Point3) -> End {
    if point.distance_to(start) <= point.distance_to(end) {
        End::Start
    } else {
        End::End
    }
}
