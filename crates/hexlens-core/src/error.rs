use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::router::ConductorLayer;

/// Invalid configuration, reported before any geometry is generated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("gap {gap} must be smaller than the pixel pitch {pitch}")]
    GapTooWide { gap: f64, pitch: f64 },

    #[error("boundary outline needs at least 3 points, got {0}")]
    TooFewBoundaryPoints(usize),

    #[error("boundary outline encloses zero area")]
    ZeroAreaBoundary,

    #[error("boundary point {index} is not finite")]
    NonFiniteBoundaryPoint { index: usize },

    #[error("lattice of {rows} x {cols} cells exceeds the limit of {limit} cells")]
    LatticeTooLarge { rows: f64, cols: f64, limit: usize },

    #[error("chip '{chip}' must have at least one pin")]
    NoPins { chip: String },

    #[error("chip '{chip}': {pin_count} pins at {pin_pitch} mm pitch do not fit on a {side_length} mm side")]
    PinsDoNotFit {
        chip: String,
        pin_count: usize,
        pin_pitch: f64,
        side_length: f64,
    },

    #[error("chip '{chip}': pin pitch {pin_pitch} is tighter than the trace pitch {trace_pitch}")]
    PinPitchBelowTracePitch {
        chip: String,
        pin_pitch: f64,
        trace_pitch: f64,
    },

    #[error("no tile center lies inside the boundary outline")]
    EmptyLattice,
}

/// More lines than a driver chip has pins.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("chip '{chip}' has {available} pins but {requested} lines need one ({} lines unassigned)", unassigned(.requested, .available))]
pub struct CapacityError {
    pub chip: String,
    pub requested: usize,
    pub available: usize,
}

fn unassigned(requested: &usize, available: &usize) -> usize {
    requested.saturating_sub(*available)
}

impl CapacityError {
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.available)
    }
}

/// Chip placement that would break the rail ordering invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("{layer:?} chip '{chip}' must take pins on its left side, got {side}")]
    UnsupportedPinSide {
        layer: ConductorLayer,
        chip: String,
        side: String,
    },

    #[error("{layer:?} chip '{chip}' pins at x={pin_x} sit inside the rail stack (outermost rail x={rail_x})")]
    ChipInsideRails {
        layer: ConductorLayer,
        chip: String,
        pin_x: f64,
        rail_x: f64,
    },

    #[error("{layer:?} line {index}: pin at y={pin_y} lies below its rail start y={line_y}")]
    PinBehindLine {
        layer: ConductorLayer,
        index: usize,
        pin_y: f64,
        line_y: f64,
    },
}

/// Any failure of a generation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("capacity error: {0}")]
    Capacity(#[from] CapacityError),

    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
}

/// Non-fatal findings recorded on the generated document.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationWarning {
    /// The outline is smaller than a single tile in at least one direction.
    #[error("boundary {width:.3} x {height:.3} mm is smaller than one tile ({tile_height:.3} mm)")]
    BoundarySmallerThanTile {
        width: f64,
        height: f64,
        tile_height: f64,
    },
    /// The dense grid rectangle does not touch the outline at all.
    #[error("dense grid region lies entirely outside the boundary")]
    DenseRegionOutsideBoundary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_names_shortfall() {
        let err = CapacityError {
            chip: "rows".into(),
            requested: 40,
            available: 32,
        };
        assert_eq!(err.shortfall(), 8);
        assert!(err.to_string().contains("8 lines unassigned"));
    }

    #[test]
    fn test_layout_error_wraps_config() {
        let err: LayoutError = ConfigError::EmptyLattice.into();
        assert!(matches!(err, LayoutError::Config(ConfigError::EmptyLattice)));
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn test_warning_messages() {
        let warning = GenerationWarning::BoundarySmallerThanTile {
            width: 20.0,
            height: 0.9,
            tile_height: 1.097,
        };
        assert_eq!(
            warning.to_string(),
            "boundary 20.000 x 0.900 mm is smaller than one tile (1.097 mm)"
        );
        let err: &dyn std::error::Error = &GenerationWarning::DenseRegionOutsideBoundary;
        assert!(err.to_string().contains("outside the boundary"));
    }
}
