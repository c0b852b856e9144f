//! Hexagon math for a flat-topped tiling of arbitrary pitch.
//!
//! All functions are pure. `pitch` must be positive; this is checked once when
//! the configuration is validated, not here.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Derived dimensions of one hex tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexMetrics {
    /// Flat-to-flat width the metrics were derived from.
    pub pitch: f64,
    /// `pitch / sqrt(3)`; also the vertex radius.
    pub side_length: f64,
    /// `2 * side_length`.
    pub height: f64,
    /// Distance between adjacent row centers.
    pub vert_spacing: f64,
    /// Distance between adjacent cells of one row.
    pub horiz_spacing: f64,
}

impl HexMetrics {
    pub fn from_pitch(pitch: f64) -> Self {
        let side_length = side_length(pitch);
        let height = 2.0 * side_length;
        let (vert_spacing, horiz_spacing) = spacing(pitch);
        Self {
            pitch,
            side_length,
            height,
            vert_spacing,
            horiz_spacing,
        }
    }
}

pub fn side_length(pitch: f64) -> f64 {
    pitch / 3.0_f64.sqrt()
}

/// `(vert_spacing, horiz_spacing)` for an odd-r tiling of the given pitch.
pub fn spacing(pitch: f64) -> (f64, f64) {
    let height = 2.0 * side_length(pitch);
    (0.75 * height, pitch)
}

/// The six vertices of a flat-topped hexagon, counter-clockwise from 0°.
pub fn hexagon_vertices(center: Point, pitch: f64) -> [Point; 6] {
    let radius = side_length(pitch);
    std::array::from_fn(|i| {
        let angle = (60.0 * i as f64).to_radians();
        Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_metrics_for_reference_pitch() {
        let m = HexMetrics::from_pitch(0.95);
        assert!((m.side_length - 0.5485).abs() < 1e-4);
        assert!((m.height - 1.0969).abs() < 1e-4);
        assert!((m.vert_spacing - 0.8227).abs() < 1e-4);
        assert!((m.horiz_spacing - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_first_vertex_points_right() {
        let v = hexagon_vertices(Point::new(1.0, 2.0), 3.0_f64.sqrt());
        assert!((v[0].x - 2.0).abs() < 1e-12);
        assert!((v[0].y - 2.0).abs() < 1e-12);
        // Flat top: vertices 1 and 2 share y.
        assert!((v[1].y - v[2].y).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn vertices_are_equidistant_and_sixty_degrees_apart(
            pitch in 0.01f64..10.0,
            cx in -100.0f64..100.0,
            cy in -100.0f64..100.0,
        ) {
            let center = Point::new(cx, cy);
            let side = side_length(pitch);
            let verts = hexagon_vertices(center, pitch);
            for (i, v) in verts.iter().enumerate() {
                prop_assert!((v.distance_to(&center) - side).abs() < 1e-9 * side.max(1.0));
                let next = verts[(i + 1) % 6];
                let a0 = (v.y - cy).atan2(v.x - cx);
                let a1 = (next.y - cy).atan2(next.x - cx);
                let mut delta = (a1 - a0).to_degrees();
                if delta < 0.0 {
                    delta += 360.0;
                }
                prop_assert!((delta - 60.0).abs() < 1e-6);
            }
        }

        #[test]
        fn spacing_matches_metrics(pitch in 0.01f64..10.0) {
            let (vert, horiz) = spacing(pitch);
            let m = HexMetrics::from_pitch(pitch);
            prop_assert!((vert - 0.75 * m.height).abs() < 1e-12);
            prop_assert!((horiz - pitch).abs() < 1e-12);
        }
    }
}
