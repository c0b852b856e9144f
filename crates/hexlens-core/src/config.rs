use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryPolygon;
use crate::error::ConfigError;
use crate::geometry::{Point, Size};
use crate::pads::{ChipPad, PinOrder, PinSide};

/// Hex tiling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Flat-to-flat tile width, also the column spacing (mm).
    pub pixel_pitch: f64,
    /// Clearance between neighbouring electrodes (mm).
    pub gap: f64,
    /// Size of the intentionally dense region.
    pub grid_extent: Size,
    /// Centre of the dense region; independent of the outline centre.
    pub grid_center: Point,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            pixel_pitch: 0.950,
            gap: 0.050,
            grid_extent: Size::new(35.0, 15.0),
            // Pupil sits slightly above the lens centre.
            grid_center: Point::new(0.0, 2.0),
        }
    }
}

/// Conductor widths and rail placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub trace_width: f64,
    pub trace_spacing: f64,
    /// Nominal inward offset of the edge rails from the outline extremes.
    /// Negative values put the rails outside the outline.
    pub rail_inset: f64,
    /// Width of the peripheral guard conductors; `0` disables them.
    pub guard_trace_width: f64,
    /// Inward offset of the guard centerlines from the outline extremes.
    pub guard_inset: f64,
}

impl RoutingConfig {
    /// Centre-to-centre distance of neighbouring rail runs.
    pub fn trace_pitch(&self) -> f64 {
        self.trace_width + self.trace_spacing
    }

    pub fn guards_enabled(&self) -> bool {
        self.guard_trace_width > 0.0
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            trace_width: 0.050,
            trace_spacing: 0.050,
            rail_inset: 1.0,
            guard_trace_width: 2.0,
            guard_inset: 2.0,
        }
    }
}

/// How row and column electrode bodies are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectrodeStyle {
    /// One hexagon per cell on each plane.
    #[default]
    Tiles,
    /// One zig-zag outline per row / column.
    Serpentine,
}

/// Everything a generation run depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub grid: GridConfig,
    pub boundary_outline: Vec<Point>,
    pub routing: RoutingConfig,
    /// Driver for the row (bottom plane) conductors.
    pub row_chip: ChipPad,
    /// Driver for the column (top plane) conductors.
    pub column_chip: ChipPad,
    pub electrode_style: ElectrodeStyle,
}

/// Default single-lens outline size (mm).
pub const LENS_WIDTH: f64 = 55.0;
pub const LENS_HEIGHT: f64 = 45.0;

impl Default for LayoutConfig {
    fn default() -> Self {
        let lens_center = Point::new(0.0, 0.0);
        let right = lens_center.x + LENS_WIDTH / 2.0;
        let top = lens_center.y + LENS_HEIGHT / 2.0;
        let chip_size = Size::new(2.310, 6.600);
        Self {
            grid: GridConfig::default(),
            boundary_outline: BoundaryPolygon::wayfarer_points(
                LENS_WIDTH,
                LENS_HEIGHT,
                lens_center,
            ),
            routing: RoutingConfig::default(),
            // Both drivers sit on the glass ledge right of the lens, the row
            // driver at the top with its first pin above the outline.
            row_chip: ChipPad {
                name: "row driver".into(),
                footprint_origin: Point::new(right + 8.0, top + 0.5 - chip_size.height),
                footprint_size: chip_size,
                pin_count: 64,
                pin_pitch: 0.100,
                pin_side: PinSide::Left,
                first_pin_offset: 0.100,
                pin_order: PinOrder::Descending,
            },
            column_chip: ChipPad {
                name: "column driver".into(),
                footprint_origin: Point::new(right + 8.0, top - 14.5),
                footprint_size: chip_size,
                pin_count: 64,
                pin_pitch: 0.100,
                pin_side: PinSide::Left,
                first_pin_offset: 0.100,
                pin_order: PinOrder::Ascending,
            },
            electrode_style: ElectrodeStyle::Tiles,
        }
    }
}

impl LayoutConfig {
    /// Check every numeric option. Outline shape is checked when the
    /// [`BoundaryPolygon`] is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grid;
        positive("pixel_pitch", g.pixel_pitch)?;
        non_negative("gap", g.gap)?;
        if g.gap >= g.pixel_pitch {
            return Err(ConfigError::GapTooWide {
                gap: g.gap,
                pitch: g.pixel_pitch,
            });
        }
        positive("grid_extent.width", g.grid_extent.width)?;
        positive("grid_extent.height", g.grid_extent.height)?;
        finite("grid_center.x", g.grid_center.x)?;
        finite("grid_center.y", g.grid_center.y)?;

        let r = &self.routing;
        positive("trace_width", r.trace_width)?;
        non_negative("trace_spacing", r.trace_spacing)?;
        finite("rail_inset", r.rail_inset)?;
        non_negative("guard_trace_width", r.guard_trace_width)?;
        non_negative("guard_inset", r.guard_inset)?;

        self.row_chip.validate(r.trace_pitch())?;
        self.column_chip.validate(r.trace_pitch())?;
        Ok(())
    }

    pub fn boundary(&self) -> Result<BoundaryPolygon, ConfigError> {
        BoundaryPolygon::new(self.boundary_outline.clone())
    }
}

pub(crate) fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    // NaN was rejected above.
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = LayoutConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.boundary().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_pitch() {
        let mut cfg = LayoutConfig::default();
        cfg.grid.pixel_pitch = 0.0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                name: "pixel_pitch",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_rejects_gap_wider_than_pitch() {
        let mut cfg = LayoutConfig::default();
        cfg.grid.gap = 1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::GapTooWide { .. })));
    }

    #[test]
    fn test_rejects_non_finite_extent_and_center() {
        let mut cfg = LayoutConfig::default();
        cfg.grid.grid_extent = Size::new(f64::INFINITY, 15.0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonFinite {
                name: "grid_extent.width",
                ..
            })
        ));

        let mut cfg = LayoutConfig::default();
        cfg.grid.grid_center = Point::new(f64::NAN, 2.0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonFinite {
                name: "grid_center.x",
                ..
            })
        ));

        let mut cfg = LayoutConfig::default();
        cfg.routing.trace_spacing = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::NonFinite { .. })));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{ "grid": { "pixel_pitch": 1.2 } }"#).unwrap();
        assert!((cfg.grid.pixel_pitch - 1.2).abs() < 1e-12);
        assert!((cfg.grid.gap - 0.05).abs() < 1e-12);
        assert_eq!(cfg.boundary_outline.len(), 14);
        assert_eq!(cfg.electrode_style, ElectrodeStyle::Tiles);
    }

    #[test]
    fn test_json_roundtrip() {
        let cfg = LayoutConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: LayoutConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
