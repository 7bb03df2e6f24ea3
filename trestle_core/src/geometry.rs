//! # Geometry Kernels
//!
//! Positions are stored as plain serializable [`Point3`] values (meters, `y` is
//! elevation) so JSON stays clean. Distance and intersection math runs on
//! `nalgebra` types.

use nalgebra::{Point3 as NaPoint3, Vector3};
use serde::{Deserialize, Serialize};

/// Squared-length threshold below which a segment is treated as a point.
const DEGENERATE_EPS: f64 = 1e-12;

/// A 3D position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    /// Convert to an nalgebra point for vector math
    pub fn to_na(self) -> NaPoint3<f64> {
        NaPoint3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point3) -> f64 {
        nalgebra::distance(&self.to_na(), &other.to_na())
    }

    /// Midpoint between two points
    pub fn midpoint(&self, other: &Point3) -> Point3 {
        nalgebra::center(&self.to_na(), &other.to_na()).into()
    }
}

impl From<NaPoint3<f64>> for Point3 {
    fn from(p: NaPoint3<f64>) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

/// Result of a closest-approach query between two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestApproach {
    /// Closest point on the first segment
    pub on_first: Point3,
    /// Closest point on the second segment
    pub on_second: Point3,
    /// Parameter along the first segment (0 = start, 1 = end)
    pub s: f64,
    /// Parameter along the second segment (0 = start, 1 = end)
    pub t: f64,
    /// Distance between the two closest points
    pub distance: f64,
}

impl ClosestApproach {
    /// Point halfway between the two closest points
    pub fn midpoint(&self) -> Point3 {
        self.on_first.midpoint(&self.on_second)
    }
}

/// Closest point to `p` on segment `a`-`b`.
pub fn closest_point_on_segment(p: &Point3, a: &Point3, b: &Point3) -> Point3 {
    let (p, a, b) = (p.to_na(), a.to_na(), b.to_na());
    let ab: Vector3<f64> = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= DEGENERATE_EPS {
        return a.into();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).into()
}

/// Shortest distance from `p` to segment `a`-`b`.
pub fn point_segment_distance(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    p.distance_to(&closest_point_on_segment(p, a, b))
}

/// Closest approach between segments `p1`-`q1` and `p2`-`q2`.
///
/// Handles degenerate (zero-length) segments and parallel segments. For
/// parallel overlapping segments an arbitrary but deterministic pair of
/// closest points is returned.
pub fn segment_closest_approach(
    p1: &Point3,
    q1: &Point3,
    p2: &Point3,
    q2: &Point3,
) -> ClosestApproach {
    let (p1n, q1n, p2n, q2n) = (p1.to_na(), q1.to_na(), p2.to_na(), q2.to_na());
    let d1 = q1n - p1n;
    let d2 = q2n - p2n;
    let r = p1n - p2n;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (s, t) = if a <= DEGENERATE_EPS && e <= DEGENERATE_EPS {
        (0.0, 0.0)
    } else if a <= DEGENERATE_EPS {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= DEGENERATE_EPS {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s = if denom > DEGENERATE_EPS {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    let c1 = p1n + d1 * s;
    let c2 = p2n + d2 * t;
    ClosestApproach {
        on_first: c1.into(),
        on_second: c2.into(),
        s,
        t,
        distance: nalgebra::distance(&c1, &c2),
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// Bounding box of a segment, grown by `inflate` on every side.
    pub fn from_segment(a: &Point3, b: &Point3, inflate: f64) -> Self {
        Aabb {
            min: Point3::new(
                a.x.min(b.x) - inflate,
                a.y.min(b.y) - inflate,
                a.z.min(b.z) - inflate,
            ),
            max: Point3::new(
                a.x.max(b.x) + inflate,
                a.y.max(b.y) + inflate,
                a.z.max(b.z) + inflate,
            ),
        }
    }

    /// True when the two boxes overlap or touch.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}
