//! Zig-zag track generation and rasterization onto the cell grid.

use glam::Vec2;

/// Generates the waypoint polyline for a zig-zag track.
///
/// The x anchor alternates between the grid's left edge (column 1) and right
/// edge (column `columns - 2`) every segment while y advances by a fixed step
/// of `rows / segments` (integer division, computed before the odd-count
/// rounding). An odd `segments` is incremented to force an even number of
/// turns. Two waypoints are emitted per segment, so every consecutive pair is
/// axis-aligned: vertical inside a segment, horizontal between segments.
#[must_use]
pub fn generate(columns: u32, rows: u32, segments: u32) -> Vec<Vec2> {
    if columns < 3 || rows == 0 || segments == 0 {
        return Vec::new();
    }

    let step = (rows / segments).max(1) as f32;
    let mut count = segments;
    if count % 2 != 0 {
        count += 1;
    }

    let mut waypoints = Vec::with_capacity(count as usize * 2);
    for index in 0..count {
        let mut x = ((index % 2) * (columns - 2)) as f32;
        if x == 0.0 {
            x = 1.0;
        }
        let y = index as f32 * step - 1.0;
        waypoints.push(Vec2::new(x, y));
        waypoints.push(Vec2::new(x, y + step));
    }

    waypoints
}

/// Stamps the cells covered by the waypoint polyline into a dense track mask.
///
/// Each segment is walked in whole-cell increments from its start; positions
/// outside the grid are skipped, which also swallows the off-grid lead-in and
/// tail the generator produces.
#[must_use]
pub fn rasterize(columns: u32, rows: u32, waypoints: &[Vec2]) -> Vec<bool> {
    let capacity = columns as usize * rows as usize;
    let mut mask = vec![false; capacity];

    for pair in waypoints.windows(2) {
        let start = pair[0];
        let delta = pair[1] - start;
        let length = delta.length();
        let direction = delta.normalize_or_zero();

        let mut travelled = 0.0;
        while travelled < length {
            let position = start + direction * travelled;
            if position.x >= 0.0
                && position.y >= 0.0
                && (position.x as u32) < columns
                && (position.y as u32) < rows
            {
                let index = position.y as usize * columns as usize + position.x as usize;
                mask[index] = true;
            }
            travelled += 1.0;
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical_segments(waypoints: &[Vec2]) -> usize {
        waypoints.len() / 2
    }

    #[test]
    fn odd_segment_counts_round_up_to_even() {
        for requested in [1_u32, 3, 5, 7] {
            let waypoints = generate(20, 10, requested);
            assert_eq!(logical_segments(&waypoints) % 2, 0, "requested {requested}");
        }
        assert_eq!(logical_segments(&generate(20, 10, 4)), 4);
    }

    #[test]
    fn consecutive_waypoints_are_axis_aligned() {
        for segments in 1..=8 {
            let waypoints = generate(20, 10, segments);
            for pair in waypoints.windows(2) {
                let same_x = (pair[0].x - pair[1].x).abs() < f32::EPSILON;
                let same_y = (pair[0].y - pair[1].y).abs() < f32::EPSILON;
                assert!(same_x || same_y, "{:?} -> {:?}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn three_segments_on_a_twenty_by_ten_grid() {
        let waypoints = generate(20, 10, 3);

        assert_eq!(waypoints.len(), 8);
        for (index, pair) in waypoints.chunks(2).enumerate() {
            let expected_x = if index % 2 == 0 { 1.0 } else { 18.0 };
            assert!((pair[0].x - expected_x).abs() < f32::EPSILON);
            assert!((pair[1].x - expected_x).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn degenerate_grids_produce_no_track() {
        assert!(generate(2, 10, 3).is_empty());
        assert!(generate(20, 0, 3).is_empty());
        assert!(generate(20, 10, 0).is_empty());
    }

    #[test]
    fn rasterize_stamps_cells_between_waypoints() {
        let waypoints = generate(20, 10, 3);
        let mask = rasterize(20, 10, &waypoints);

        // The first in-grid run descends column 1.
        assert!(mask[1]);
        assert!(mask[20 + 1]);
        // Horizontal crossover between the first two segments sits on row 2.
        assert!(mask[2 * 20 + 10]);
        // A cell far from the corridor stays grass.
        assert!(!mask[5 * 20 + 10]);
    }

    #[test]
    fn rasterize_skips_out_of_grid_lead_in() {
        let waypoints = generate(20, 10, 3);
        let mask = rasterize(20, 10, &waypoints);
        assert_eq!(mask.len(), 200);
        // Nothing outside the grid panics and the tail row stays clear of
        // the out-of-bounds waypoint at y = 11.
        assert!(waypoints.iter().any(|w| w.y < 0.0 || w.y >= 10.0));
    }
}
