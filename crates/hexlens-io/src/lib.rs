//! # HexLens I/O
//!
//! DXF export of the two conductor planes and JSON project files.

pub mod dxf_writer;
pub mod project;

pub use dxf_writer::{DxfError, DxfWriter};
pub use project::{LensProject, ProjectError};
