use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryPolygon;
use crate::error::GenerationWarning;
use crate::geometry::{BBox, Shape};
use crate::layer::{Layer, LayerId, LayerStack, Plane};
use crate::pads::ChipPad;
use crate::router::RoutedLayer;

/// Result of one generation run: drawable shapes per layer plus the
/// structured routing records they were drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    name: String,
    layer_stack: LayerStack,
    shapes: BTreeMap<LayerId, Vec<Shape>>,
    /// Row or column each shape belongs to, parallel to `shapes`.
    lines: BTreeMap<LayerId, Vec<Option<usize>>>,
    boundary: BoundaryPolygon,
    row_chip: ChipPad,
    column_chip: ChipPad,
    rows: RoutedLayer,
    columns: RoutedLayer,
    warnings: Vec<GenerationWarning>,
}

impl LayoutDocument {
    pub(crate) fn new(
        name: &str,
        boundary: BoundaryPolygon,
        row_chip: ChipPad,
        column_chip: ChipPad,
        rows: RoutedLayer,
        columns: RoutedLayer,
    ) -> Self {
        Self {
            name: name.to_string(),
            layer_stack: LayerStack::lens(),
            shapes: BTreeMap::new(),
            lines: BTreeMap::new(),
            boundary,
            row_chip,
            column_chip,
            rows,
            columns,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn add_shape(&mut self, layer: LayerId, shape: Shape) {
        self.push_shape(layer, None, shape);
    }

    /// Add a shape that belongs to one row or column.
    pub(crate) fn add_line_shape(&mut self, layer: LayerId, line: usize, shape: Shape) {
        self.push_shape(layer, Some(line), shape);
    }

    fn push_shape(&mut self, layer: LayerId, line: Option<usize>, shape: Shape) {
        self.shapes.entry(layer).or_default().push(shape);
        self.lines.entry(layer).or_default().push(line);
    }

    pub(crate) fn add_warning(&mut self, warning: GenerationWarning) {
        self.warnings.push(warning);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer_stack(&self) -> &LayerStack {
        &self.layer_stack
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layer_stack.get_layer(id)
    }

    /// Layers exported with `plane`, in stack order.
    pub fn layers_on(&self, plane: Plane) -> Vec<&Layer> {
        self.layer_stack.layers_on(plane).collect()
    }

    pub fn shapes_on(&self, layer: LayerId) -> &[Shape] {
        self.shapes.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Row or column index of the `index`-th shape on `layer`, if it
    /// belongs to one.
    pub fn line_of(&self, layer: LayerId, index: usize) -> Option<usize> {
        self.lines.get(&layer)?.get(index).copied().flatten()
    }

    pub fn shapes(&self) -> &BTreeMap<LayerId, Vec<Shape>> {
        &self.shapes
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.values().map(Vec::len).sum()
    }

    pub fn boundary(&self) -> &BoundaryPolygon {
        &self.boundary
    }

    pub fn row_chip(&self) -> &ChipPad {
        &self.row_chip
    }

    pub fn column_chip(&self) -> &ChipPad {
        &self.column_chip
    }

    pub fn rows(&self) -> &RoutedLayer {
        &self.rows
    }

    pub fn columns(&self) -> &RoutedLayer {
        &self.columns
    }

    pub fn warnings(&self) -> &[GenerationWarning] {
        &self.warnings
    }

    /// Extent of every shape on every layer.
    pub fn bbox(&self) -> Option<BBox> {
        self.shapes
            .values()
            .flatten()
            .filter_map(Shape::bbox)
            .reduce(|a, b| a.union(&b))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
