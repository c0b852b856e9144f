use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hexlens_core::document::LayoutDocument;
use hexlens_core::geometry::{Point, Shape};
use hexlens_core::layer::{FillPattern, LayerId, Plane};
use hexlens_core::spatial::SpatialIndex;

use crate::viewport::Viewport;

/// Render data for a single layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLayer {
    pub layer_id: LayerId,
    pub name: String,
    pub plane: Plane,
    pub color: [f32; 4], // RGBA
    pub fill_pattern: String, // "solid", "hatched", "outline"
    pub visible: bool,
    pub polygons: Vec<RenderPolygon>,
    pub polylines: Vec<RenderPolyline>,
}

/// A closed outline (electrode, chip body, lens boundary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPolygon {
    /// Flat array of vertices: [x0, y0, x1, y1, ...]
    pub vertices: Vec<f64>,
    /// Row or column index for electrodes and conductors.
    pub line: Option<usize>,
}

/// An open conductor centerline drawn with a stroke width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPolyline {
    /// Flat array of points: [x0, y0, x1, y1, ...]
    pub points: Vec<f64>,
    pub width: f64,
    pub line: Option<usize>,
}

/// Everything a preview canvas needs to draw one view of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub name: String,
    pub layers: Vec<RenderLayer>,
    pub viewport: Viewport,
    pub warnings: Vec<String>,
}

impl RenderFrame {
    pub fn empty(name: &str, viewport: Viewport) -> Self {
        Self {
            name: name.to_string(),
            layers: Vec::new(),
            viewport,
            warnings: Vec::new(),
        }
    }

    /// Collect the shapes of each visible layer that fall inside `viewport`.
    ///
    /// Layers keep their stack order and shapes keep their document order.
    pub fn from_document(doc: &LayoutDocument, viewport: Viewport) -> Self {
        Self::for_plane(doc, Plane::Both, viewport)
    }

    /// Like [`RenderFrame::from_document`], limited to the layers of `plane`.
    pub fn for_plane(doc: &LayoutDocument, plane: Plane, viewport: Viewport) -> Self {
        let index = SpatialIndex::from_document(doc);
        let mut hits: BTreeMap<LayerId, Vec<usize>> = BTreeMap::new();
        for entry in index.query_viewport(&viewport.visible_bounds()) {
            hits.entry(entry.layer_id).or_default().push(entry.shape_index);
        }

        let mut frame = Self::empty(doc.name(), viewport);
        for layer in doc
            .layer_stack()
            .visible_layers()
            .filter(|l| l.plane.includes(plane))
        {
            let mut indices = hits.remove(&layer.id).unwrap_or_default();
            indices.sort_unstable();
            let shapes = doc.shapes_on(layer.id);

            let mut polygons = Vec::new();
            let mut polylines = Vec::new();
            for &i in &indices {
                let Some(shape) = shapes.get(i) else {
                    continue;
                };
                let line = doc.line_of(layer.id, i);
                match shape {
                    Shape::Rect(r) => polygons.push(RenderPolygon {
                        vertices: flatten(&r.corners()),
                        line,
                    }),
                    Shape::Polygon(p) => polygons.push(RenderPolygon {
                        vertices: flatten(&p.vertices),
                        line,
                    }),
                    Shape::Polyline(l) => polylines.push(RenderPolyline {
                        points: flatten(&l.points),
                        width: l.width,
                        line,
                    }),
                }
            }

            frame.layers.push(RenderLayer {
                layer_id: layer.id,
                name: layer.name.clone(),
                plane: layer.plane,
                color: layer.color.to_f32_array(layer.opacity),
                fill_pattern: pattern_name(layer.fill_pattern).to_string(),
                visible: layer.visible,
                polygons,
                polylines,
            });
        }
        frame.warnings = doc.warnings().iter().map(ToString::to_string).collect();

        log::debug!(
            "Render frame '{}': {} of {} shapes in view",
            frame.name,
            frame.primitive_count(),
            index.len()
        );
        frame
    }

    /// Frame the whole document on a canvas of the given size.
    pub fn fit(doc: &LayoutDocument, canvas_width: f64, canvas_height: f64) -> Self {
        let mut viewport = Viewport::new(canvas_width, canvas_height);
        if let Some(bbox) = doc.bbox() {
            viewport.fit_bbox(&bbox);
        }
        Self::from_document(doc, viewport)
    }

    pub fn primitive_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.polygons.len() + l.polylines.len())
            .sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn flatten(points: &[Point]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

fn pattern_name(pattern: FillPattern) -> &'static str {
    match pattern {
        FillPattern::Solid => "solid",
        FillPattern::Hatched => "hatched",
        FillPattern::Outline => "outline",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexlens_core::geometry::{BBox, Point};
    use hexlens_core::layer::{OUTLINE, ROW_CHIP, ROW_ELECTRODES, ROW_TRACES};
    use hexlens_core::{generate, LayoutConfig};

    #[test]
    fn test_fit_includes_every_shape() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let frame = RenderFrame::fit(&doc, 1600.0, 900.0);
        assert_eq!(frame.primitive_count(), doc.shape_count());
        assert_eq!(frame.layers.len(), 7);
        let outline = frame.layers.iter().find(|l| l.layer_id == OUTLINE).unwrap();
        assert_eq!(outline.fill_pattern, "outline");
        assert_eq!(outline.polygons[0].vertices.len(), 2 * doc.boundary().vertices().len());
    }

    #[test]
    fn test_zoomed_view_is_culled() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let mut viewport = Viewport::new(200.0, 200.0);
        viewport.fit_bbox(&BBox::new(Point::new(-2.0, 0.0), Point::new(2.0, 4.0)));
        let frame = RenderFrame::from_document(&doc, viewport);

        let electrodes = frame
            .layers
            .iter()
            .find(|l| l.layer_id == ROW_ELECTRODES)
            .unwrap();
        assert!(!electrodes.polygons.is_empty());
        assert!(electrodes.polygons.len() < doc.shapes_on(ROW_ELECTRODES).len());
        let chip = frame.layers.iter().find(|l| l.layer_id == ROW_CHIP).unwrap();
        assert!(chip.polygons.is_empty());
    }

    #[test]
    fn test_plane_frames_split_the_stack() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.fit_bbox(&doc.bbox().unwrap());

        let bottom = RenderFrame::for_plane(&doc, Plane::Bottom, viewport);
        let ids: Vec<LayerId> = bottom.layers.iter().map(|l| l.layer_id).collect();
        assert_eq!(ids, vec![OUTLINE, ROW_ELECTRODES, ROW_TRACES, ROW_CHIP]);

        let top = RenderFrame::for_plane(&doc, Plane::Top, viewport);
        assert_eq!(top.layers.len(), 4);
        assert_eq!(
            bottom.primitive_count() + top.primitive_count(),
            doc.shape_count() + 1
        );
    }

    #[test]
    fn test_primitives_carry_their_line() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let frame = RenderFrame::fit(&doc, 800.0, 600.0);
        let traces = frame.layers.iter().find(|l| l.layer_id == ROW_TRACES).unwrap();
        let tagged = traces.polylines.iter().filter(|p| p.line.is_some()).count();
        assert_eq!(tagged, doc.rows().paths.len());
        assert_eq!(traces.polylines.len() - tagged, doc.rows().guards.len());
        let outline = frame.layers.iter().find(|l| l.layer_id == OUTLINE).unwrap();
        assert_eq!(outline.polygons[0].line, None);
    }

    #[test]
    fn test_frame_serializes() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let json = RenderFrame::fit(&doc, 800.0, 600.0).to_json().unwrap();
        assert!(json.contains("\"ROW_TRACES\""));
        assert!(json.contains("\"polylines\""));
    }
}
