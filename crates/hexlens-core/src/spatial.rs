use rstar::{RTree, RTreeObject, AABB};

use crate::document::LayoutDocument;
use crate::geometry::{BBox, Point};
use crate::layer::LayerId;

/// An entry in the R-tree, referencing one shape of a document layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialEntry {
    pub layer_id: LayerId,
    /// Index into the layer's shape list.
    pub shape_index: usize,
    pub bbox: BBox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Spatial index for point picking and viewport culling.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Index every shape of `doc` that has a bounding box.
    pub fn from_document(doc: &LayoutDocument) -> Self {
        let entries = doc
            .shapes()
            .iter()
            .flat_map(|(&layer_id, shapes)| {
                shapes.iter().enumerate().filter_map(move |(shape_index, shape)| {
                    shape.bbox().map(|bbox| SpatialEntry {
                        layer_id,
                        shape_index,
                        bbox,
                    })
                })
            })
            .collect();
        Self::build(entries)
    }

    /// All entries whose bounding box contains the point.
    pub fn query_point(&self, point: &Point) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_point([point.x, point.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// All entries whose bounding box intersects the viewport.
    pub fn query_viewport(&self, viewport: &BBox) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners(
            [viewport.min.x, viewport.min.y],
            [viewport.max.x, viewport.max.y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
