//! DXF export of one conductor plane.
//!
//! Builds an R2000 drawing in millimetres with one table layer per document
//! layer and one `LWPOLYLINE` per shape, then hands serialization to the
//! `dxf` crate. Each file holds a single conductor plane; the outline layer
//! is repeated in both.

use std::io::Write;
use thiserror::Error;

use ::dxf::entities::{Entity, EntityType, LwPolyline};
use ::dxf::enums::{AcadVersion, Units};
use ::dxf::{tables, Color, Drawing, LwPolylineVertex};

use hexlens_core::document::LayoutDocument;
use hexlens_core::geometry::{Point, Shape};
use hexlens_core::layer::{Layer, Plane};

/// LWPOLYLINE flag bit for a closed outline.
const CLOSED: i32 = 1;

#[derive(Error, Debug)]
pub enum DxfError {
    #[error("DXF error: {0}")]
    Dxf(#[from] ::dxf::DxfError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shape on layer {layer} has {count} points, need at least 2")]
    DegenerateShape { layer: u32, count: usize },
}

pub struct DxfWriter<W: Write> {
    writer: W,
    plane: Plane,
    entities: usize,
}

impl<W: Write> DxfWriter<W> {
    /// Writer for every layer; narrow it with [`DxfWriter::plane`].
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            plane: Plane::Both,
            entities: 0,
        }
    }

    /// Only export layers fabricated on `plane` (plus shared layers).
    pub fn plane(mut self, plane: Plane) -> Self {
        self.plane = plane;
        self
    }

    /// Number of entities emitted by the last [`DxfWriter::write`].
    pub fn entity_count(&self) -> usize {
        self.entities
    }

    pub fn write(&mut self, doc: &LayoutDocument) -> Result<(), DxfError> {
        let drawing = self.drawing(doc)?;
        drawing.save(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// The drawing [`DxfWriter::write`] serializes.
    pub fn drawing(&mut self, doc: &LayoutDocument) -> Result<Drawing, DxfError> {
        let layers = doc.layers_on(self.plane);
        self.entities = 0;

        let mut drawing = Drawing::new();
        drawing.header.version = AcadVersion::R2000;
        drawing.header.default_drawing_units = Units::Millimeters;

        for layer in &layers {
            drawing.add_layer(tables::Layer {
                name: layer.name.clone(),
                color: Color::from_index(layer.dxf_color),
                ..Default::default()
            });
        }
        for layer in &layers {
            for shape in doc.shapes_on(layer.id) {
                drawing.add_entity(lwpolyline(layer, shape)?);
                self.entities += 1;
            }
        }

        log::info!(
            "DXF '{}' ({:?} plane): {} layers, {} entities",
            doc.name(),
            self.plane,
            layers.len(),
            self.entities
        );
        Ok(drawing)
    }
}

fn lwpolyline(layer: &Layer, shape: &Shape) -> Result<Entity, DxfError> {
    let (points, closed, width) = match shape {
        Shape::Rect(rect) => (rect.corners().to_vec(), true, 0.0),
        Shape::Polygon(poly) => (poly.vertices.clone(), true, 0.0),
        Shape::Polyline(line) => (line.points.clone(), false, line.width.max(0.0)),
    };
    if points.len() < 2 {
        return Err(DxfError::DegenerateShape {
            layer: layer.id,
            count: points.len(),
        });
    }

    let mut polyline = LwPolyline::default();
    if closed {
        polyline.flags |= CLOSED;
    }
    polyline.constant_width = width;
    polyline.vertices = points.iter().map(vertex).collect();

    let mut entity = Entity::new(EntityType::LwPolyline(polyline));
    entity.common.layer = layer.name.clone();
    entity.common.color = Color::by_layer();
    Ok(entity)
}

fn vertex(p: &Point) -> LwPolylineVertex {
    LwPolylineVertex {
        x: p.x,
        y: p.y,
        ..Default::default()
    }
}
