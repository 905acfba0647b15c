//! Geometric primitives over surveyed points.
//!
//! Planar distance, slope angle and elevation extent helpers shared by the
//! segment filter, the banding step and the `inspect` command.

use super::loaders::Point3D;

/// Planar (x/y) distance between two points.
#[inline]
pub fn horizontal_distance(a: &Point3D, b: &Point3D) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Slope from `a` to `b` in degrees.
///
/// Positive when `b` is higher than `a`. A purely vertical move yields ±90°
/// and a zero-length move yields 0°, both without dividing by zero.
#[inline]
pub fn slope_degrees(a: &Point3D, b: &Point3D) -> f64 {
    let dz = b.z - a.z;
    dz.atan2(horizontal_distance(a, b)).to_degrees()
}

/// Mean elevation of two points.
#[inline]
pub fn midpoint_elevation(a: &Point3D, b: &Point3D) -> f64 {
    (a.z + b.z) / 2.0
}

/// Minimum and maximum elevation of a point slice, or `None` if it is empty.
pub fn elevation_range(points: &[Point3D]) -> Option<(f64, f64)> {
    let first = points.first()?;
    let mut z_min = first.z;
    let mut z_max = first.z;

    for p in &points[1..] {
        if p.z < z_min {
            z_min = p.z;
        }
        if p.z > z_max {
            z_max = p.z;
        }
    }

    Some((z_min, z_max))
}

/// Index of the first point with a non-finite coordinate, if any.
pub fn first_non_finite(points: &[Point3D]) -> Option<usize> {
    points.iter().position(|p| !p.is_finite())
}
