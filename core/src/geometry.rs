//! Pure 2D geometry helpers shared by the simulation and the adapters.
//!
//! All functions operate on continuous cell units. The track is a polyline of
//! axis-aligned segments, so the containment tests favour the cheap
//! normalized-direction comparison over a general projection.

use glam::Vec2;

use crate::CellCoord;

/// Default tolerance used by the path containment helpers.
pub const CONTAINMENT_TOLERANCE: f32 = 0.001;

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Reports whether `point` lies on the segment from `start` to `end`.
///
/// A point within `tolerance` of `start` always counts as contained. The
/// remaining cases compare the normalized point direction against the
/// normalized segment direction and bound the travelled length.
#[must_use]
pub fn point_on_segment(point: Vec2, start: Vec2, end: Vec2, tolerance: f32) -> bool {
    let line = end - start;
    let toward_point = point - start;
    let line_length = line.length();
    let point_length = toward_point.length();

    if point_length <= tolerance {
        return true;
    }

    if point_length > line_length + tolerance {
        return false;
    }

    let alignment = line.normalize_or_zero().dot(toward_point.normalize_or_zero());
    (alignment - 1.0).abs() < tolerance
}

/// Reports whether `point` lies on any segment of the waypoint polyline.
#[must_use]
pub fn point_on_path(point: Vec2, waypoints: &[Vec2], tolerance: f32) -> bool {
    waypoints
        .windows(2)
        .any(|pair| point_on_segment(point, pair[0], pair[1], tolerance))
}

/// Converts a pointer position into the grid cell underneath it.
///
/// Returns `None` when the pointer lies outside the grid; callers treat that
/// as "no interaction this frame" rather than an error.
#[must_use]
pub fn cell_under_pointer(
    pointer: Vec2,
    grid_origin: Vec2,
    cell_length: f32,
    columns: u32,
    rows: u32,
) -> Option<CellCoord> {
    if cell_length <= f32::EPSILON {
        return None;
    }

    let local = (pointer - grid_origin) / cell_length;
    if local.x < 0.0 || local.y < 0.0 {
        return None;
    }

    let column = local.x.floor() as u32;
    let row = local.y.floor() as u32;
    if column >= columns || row >= rows {
        return None;
    }

    Some(CellCoord::new(column, row))
}
