use serde::{Deserialize, Serialize};

use crate::config::{finite, non_negative, positive};
use crate::error::{CapacityError, ConfigError};
use crate::geometry::{Point, Rect, Size};

/// Footprint side that carries the bond pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl std::fmt::Display for PinSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PinSide::Left => "left",
            PinSide::Right => "right",
            PinSide::Top => "top",
            PinSide::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Direction in which consecutive pins are consumed along their side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinOrder {
    /// From the lower / left corner towards increasing coordinates.
    #[default]
    Ascending,
    /// From the upper / right corner towards decreasing coordinates.
    Descending,
}

/// A driver chip footprint with a single row of evenly spaced pins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipPad {
    pub name: String,
    /// Lower-left corner of the footprint.
    pub footprint_origin: Point,
    pub footprint_size: Size,
    pub pin_count: usize,
    pub pin_pitch: f64,
    pub pin_side: PinSide,
    /// Distance from the starting corner to the first pin.
    #[serde(default)]
    pub first_pin_offset: f64,
    #[serde(default)]
    pub pin_order: PinOrder,
}

impl ChipPad {
    pub fn body(&self) -> Rect {
        Rect::from_origin_size(self.footprint_origin, self.footprint_size)
    }

    /// Length of the pin-carrying side.
    pub fn side_length(&self) -> f64 {
        match self.pin_side {
            PinSide::Left | PinSide::Right => self.footprint_size.height,
            PinSide::Top | PinSide::Bottom => self.footprint_size.width,
        }
    }

    /// Position of the `n`-th pin (0-based), whether or not it is assigned.
    pub fn pin_position(&self, n: usize) -> Point {
        let along = self.first_pin_offset + n as f64 * self.pin_pitch;
        let along = match self.pin_order {
            PinOrder::Ascending => along,
            PinOrder::Descending => self.side_length() - along,
        };
        let body = self.body();
        match self.pin_side {
            PinSide::Left => Point::new(body.lower_left.x, body.lower_left.y + along),
            PinSide::Right => Point::new(body.upper_right.x, body.lower_left.y + along),
            PinSide::Bottom => Point::new(body.lower_left.x + along, body.lower_left.y),
            PinSide::Top => Point::new(body.lower_left.x + along, body.upper_right.y),
        }
    }

    pub fn validate(&self, trace_pitch: f64) -> Result<(), ConfigError> {
        finite("chip footprint origin x", self.footprint_origin.x)?;
        finite("chip footprint origin y", self.footprint_origin.y)?;
        positive("chip footprint width", self.footprint_size.width)?;
        positive("chip footprint height", self.footprint_size.height)?;
        if self.pin_count == 0 {
            return Err(ConfigError::NoPins {
                chip: self.name.clone(),
            });
        }
        positive("pin_pitch", self.pin_pitch)?;
        non_negative("first_pin_offset", self.first_pin_offset)?;
        let last = self.first_pin_offset + (self.pin_count - 1) as f64 * self.pin_pitch;
        if last > self.side_length() + 1e-9 {
            return Err(ConfigError::PinsDoNotFit {
                chip: self.name.clone(),
                pin_count: self.pin_count,
                pin_pitch: self.pin_pitch,
                side_length: self.side_length(),
            });
        }
        if self.pin_pitch + 1e-9 < trace_pitch {
            return Err(ConfigError::PinPitchBelowTracePitch {
                chip: self.name.clone(),
                pin_pitch: self.pin_pitch,
                trace_pitch,
            });
        }
        Ok(())
    }
}

/// Pins handed out to lines, in the order the lines were visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadAssignment {
    chip: String,
    /// `(line index, pin position)` in visit order.
    pins: Vec<(usize, Point)>,
}

impl PadAssignment {
    /// Give each index the next free pin, in the order given.
    ///
    /// Fails without assigning anything when there are more indices than pins.
    pub fn assign(chip: &ChipPad, ordered_indices: &[usize]) -> Result<Self, CapacityError> {
        if ordered_indices.len() > chip.pin_count {
            return Err(CapacityError {
                chip: chip.name.clone(),
                requested: ordered_indices.len(),
                available: chip.pin_count,
            });
        }
        let pins = ordered_indices
            .iter()
            .enumerate()
            .map(|(n, &index)| (index, chip.pin_position(n)))
            .collect();
        Ok(Self {
            chip: chip.name.clone(),
            pins,
        })
    }

    pub fn chip(&self) -> &str {
        &self.chip
    }

    pub fn pins(&self) -> &[(usize, Point)] {
        &self.pins
    }

    pub fn pin_for(&self, index: usize) -> Option<Point> {
        self.pins
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}
