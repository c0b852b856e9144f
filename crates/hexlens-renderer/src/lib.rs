//! # HexLens Renderer
//!
//! JSON-serializable preview frames for a generated lens layout: one styled
//! layer per document layer, culled to a viewport through the R-tree index.
//! [`raster`] draws the same frames into a PNG-ready image.

pub mod raster;
pub mod render_data;
pub mod viewport;

pub use raster::render_preview;
pub use render_data::{RenderFrame, RenderLayer, RenderPolygon, RenderPolyline};
pub use viewport::Viewport;
