use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{BBox, Point, Polygon};

/// Closed lens outline used for tile containment tests.
///
/// The outline is stored as given; the closing edge from the last vertex back
/// to the first is implied. Self-intersecting outlines are not rejected but
/// containment on them follows the even-odd rule.
///
/// Serialized as its vertex list; deserializing runs the same checks as
/// [`BoundaryPolygon::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct BoundaryPolygon {
    vertices: Vec<Point>,
    bbox: BBox,
}

impl BoundaryPolygon {
    pub fn new(vertices: Vec<Point>) -> Result<Self, ConfigError> {
        if vertices.len() < 3 {
            return Err(ConfigError::TooFewBoundaryPoints(vertices.len()));
        }
        if let Some(index) = vertices.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(ConfigError::NonFiniteBoundaryPoint { index });
        }
        let area = Polygon::new(vertices.clone()).signed_area();
        if area.abs() <= f64::EPSILON {
            return Err(ConfigError::ZeroAreaBoundary);
        }
        let bbox = BBox::from_points(&vertices).ok_or(ConfigError::TooFewBoundaryPoints(0))?;
        Ok(Self { vertices, bbox })
    }

    /// Wayfarer-style outline of a single (left) lens.
    ///
    /// Angled top edge, near-vertical temple side, flattened rounded bottom and
    /// a straight bridge side. Vertices run clockwise from the top-left.
    pub fn wayfarer_points(width: f64, height: f64, center: Point) -> Vec<Point> {
        let w = width / 2.0;
        let h = height / 2.0;
        let at = |fx: f64, fy: f64| Point::new(center.x + w * fx, center.y + h * fy);
        vec![
            // Top edge
            at(-1.0, 0.9),
            at(-0.3, 1.0),
            at(0.7, 1.0),
            // Temple side
            at(1.0, 0.6),
            at(1.0, 0.2),
            at(1.0, -0.2),
            // Bottom edge
            at(0.8, -1.0),
            at(0.4, -0.95),
            at(0.0, -0.95),
            at(-0.4, -0.95),
            at(-0.8, -1.0),
            // Bridge side
            at(-1.0, -0.4),
            at(-1.0, 0.0),
            at(-1.0, 0.4),
        ]
    }

    pub fn wayfarer(width: f64, height: f64, center: Point) -> Result<Self, ConfigError> {
        Self::new(Self::wayfarer_points(width, height, center))
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn signed_area(&self) -> f64 {
        Polygon::new(self.vertices.clone()).signed_area()
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.vertices.clone())
    }

    /// Even-odd containment: cast a ray towards +x and count edge crossings.
    ///
    /// Each edge is treated as half-open in y, so a ray through a shared
    /// vertex is counted once.
    pub fn contains(&self, p: &Point) -> bool {
        if !self.bbox.contains_point(p) {
            return false;
        }
        let n = self.vertices.len();
        let mut inside = false;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

impl TryFrom<Vec<Point>> for BoundaryPolygon {
    type Error = ConfigError;

    fn try_from(vertices: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<BoundaryPolygon> for Vec<Point> {
    fn from(boundary: BoundaryPolygon) -> Self {
        boundary.vertices
    }
}
