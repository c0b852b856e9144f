//! # HexLens Core
//!
//! Hexagonal tile lattice, lens-outline clipping and two-plane conductor
//! routing for segmented eyewear displays.
//!
//! The pipeline runs lattice → clipper → router → document. Every stage is a
//! pure function of the [`LayoutConfig`]; output formats live in the
//! `hexlens-io` and `hexlens-renderer` crates.

pub mod boundary;
pub mod clipper;
pub mod config;
pub mod document;
pub mod electrode;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod hexgrid;
pub mod lattice;
pub mod layer;
pub mod pads;
pub mod router;
pub mod spatial;

pub use boundary::BoundaryPolygon;
pub use config::{ElectrodeStyle, GridConfig, LayoutConfig, RoutingConfig};
pub use document::LayoutDocument;
pub use error::{CapacityError, ConfigError, GenerationWarning, LayoutError, RoutingError};
pub use generator::{generate, generate_named};
pub use geometry::{BBox, Point, Polygon, Polyline, Rect, Shape, Size};
pub use layer::{Layer, LayerId, LayerStack, Plane};
pub use pads::{ChipPad, PadAssignment, PinOrder, PinSide};
pub use router::{ConductorLayer, ConductorPath, GuardConductor, RoutedLayer};
