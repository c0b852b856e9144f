//! Rail routing from the lattice edge to the driver chips.
//!
//! Each pass visits its lines in a fixed order, hands out rails and pins in
//! that same order, and never searches for collisions: the visit order, the
//! rail stacking direction and the pin order together keep same-plane paths
//! apart. The geometric preconditions that ordering depends on are checked
//! up front and reported as [`RoutingError`].

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryPolygon;
use crate::clipper::ClippedLattice;
use crate::config::RoutingConfig;
use crate::error::{LayoutError, RoutingError};
use crate::geometry::{BBox, Point, Polyline};
use crate::lattice::HexCell;
use crate::pads::{ChipPad, PadAssignment, PinSide};

const EPS: f64 = 1e-9;

/// Which conductor plane a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConductorLayer {
    /// Bottom plane, one conductor per lattice row.
    Row,
    /// Top plane, one conductor per lattice column.
    Column,
}

/// Centerline of one routed line, from its exit point to its chip pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConductorPath {
    pub layer: ConductorLayer,
    /// Row or column index in the lattice.
    pub index: usize,
    pub width: f64,
    pub points: Vec<Point>,
}

impl ConductorPath {
    pub fn to_polyline(&self) -> Polyline {
        Polyline::new(self.points.clone(), self.width)
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardPosition {
    Top,
    Bottom,
    Left,
}

/// Wide conductor blanking the lens periphery on one plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConductor {
    pub layer: ConductorLayer,
    pub position: GuardPosition,
    pub width: f64,
    pub points: Vec<Point>,
}

impl GuardConductor {
    pub fn to_polyline(&self) -> Polyline {
        Polyline::new(self.points.clone(), self.width)
    }
}

/// Output of one routing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedLayer {
    pub layer: ConductorLayer,
    /// One path per routed line, in visit order.
    pub paths: Vec<ConductorPath>,
    pub guards: Vec<GuardConductor>,
    /// Primary rail coordinate of each path: x of the row rail, y of the
    /// column bottom rail.
    pub rail_offsets: Vec<f64>,
    pub pads: PadAssignment,
}

impl RoutedLayer {
    pub fn path(&self, index: usize) -> Option<&ConductorPath> {
        self.paths.iter().find(|p| p.index == index)
    }
}

/// A line that will be routed, with the point where its conductor leaves
/// the lattice.
struct LineExit {
    index: usize,
    exit: Point,
}

pub struct ConductorRouter<'a> {
    lattice: &'a ClippedLattice,
    bbox: BBox,
    routing: &'a RoutingConfig,
}

impl<'a> ConductorRouter<'a> {
    pub fn new(
        lattice: &'a ClippedLattice,
        boundary: &BoundaryPolygon,
        routing: &'a RoutingConfig,
    ) -> Self {
        Self {
            lattice,
            bbox: boundary.bbox(),
            routing,
        }
    }

    fn step(&self) -> f64 {
        self.routing.trace_pitch()
    }

    /// Row guard centerlines, top first.
    ///
    /// Each guard starts `guard_inset` inside the outline and is pushed
    /// outward until its band clears every row band by `trace_spacing`.
    fn row_guard_lines(&self, lines: &[LineExit]) -> Vec<(GuardPosition, f64)> {
        if !self.routing.guards_enabled() {
            return Vec::new();
        }
        let clearance = self.routing.guard_trace_width / 2.0
            + self.lattice.metrics.pitch / 2.0
            + self.routing.trace_spacing;
        let mut top = self.bbox.max.y - self.routing.guard_inset;
        let mut bottom = self.bbox.min.y + self.routing.guard_inset;
        if let Some(highest) = lines.iter().map(|l| l.exit.y).reduce(f64::max) {
            top = top.max(highest + clearance);
        }
        if let Some(lowest) = lines.iter().map(|l| l.exit.y).reduce(f64::min) {
            bottom = bottom.min(lowest - clearance);
        }
        vec![(GuardPosition::Top, top), (GuardPosition::Bottom, bottom)]
    }

    /// Column guard centerline, left of every column band.
    fn column_guard_line(&self) -> Option<f64> {
        if !self.routing.guards_enabled() {
            return None;
        }
        let clearance = self.routing.guard_trace_width / 2.0
            + self.lattice.metrics.side_length
            + self.routing.trace_spacing;
        let nominal = self.bbox.min.x + self.routing.guard_inset;
        let x = match self.lattice.cells().iter().map(|c| c.center.x).reduce(f64::min) {
            Some(leftmost) => nominal.min(leftmost - clearance),
            None => nominal,
        };
        Some(x)
    }

    /// Route every non-empty row to `chip` on the bottom plane.
    ///
    /// Rows are visited top to bottom. The k-th row leaves the lattice to the
    /// right, runs to rail `x_k = anchor + k * step`, then up to its pin.
    /// Rails stack outward and pins are consumed top-down, so later rows pass
    /// outside and below every earlier one.
    pub fn route_rows(&self, chip: &ChipPad) -> Result<RoutedLayer, LayoutError> {
        let layer = ConductorLayer::Row;
        require_left_side(layer, chip)?;

        let hs = self.lattice.metrics.horiz_spacing;
        let lines: Vec<LineExit> = self
            .lattice
            .rows()
            .into_iter()
            .filter_map(|(row, cells)| {
                let exit_cell = max_by(&cells, |c| c.center.x)?;
                Some(LineExit {
                    index: row,
                    exit: Point::new(exit_cell.center.x + hs / 2.0, exit_cell.center.y),
                })
            })
            .collect();

        let indices: Vec<usize> = lines.iter().map(|l| l.index).collect();
        let pads = PadAssignment::assign(chip, &indices)?;
        let step = self.step();

        let max_exit_x = lines.iter().map(|l| l.exit.x).fold(f64::MIN, f64::max);
        let anchor = (self.bbox.max.x - self.routing.rail_inset).max(max_exit_x + step);
        let rail_x = |k: usize| anchor + k as f64 * step;

        if let Some(&(_, first_pin)) = pads.pins().first() {
            let outermost = rail_x(lines.len() - 1);
            if first_pin.x < outermost + step - EPS {
                return Err(RoutingError::ChipInsideRails {
                    layer,
                    chip: chip.name.clone(),
                    pin_x: first_pin.x,
                    rail_x: outermost,
                }
                .into());
            }
        }

        let mut paths = Vec::with_capacity(lines.len());
        let mut rail_offsets = Vec::with_capacity(lines.len());
        for (k, (line, &(_, pin))) in lines.iter().zip(pads.pins()).enumerate() {
            if pin.y < line.exit.y - EPS {
                return Err(RoutingError::PinBehindLine {
                    layer,
                    index: line.index,
                    pin_y: pin.y,
                    line_y: line.exit.y,
                }
                .into());
            }
            let x = rail_x(k);
            let points = polyline_points(&[
                line.exit,
                Point::new(x, line.exit.y),
                Point::new(x, pin.y),
                pin,
            ]);
            log::debug!("Row {} -> rail x={x:.4} -> pin y={:.4}", line.index, pin.y);
            paths.push(ConductorPath {
                layer,
                index: line.index,
                width: self.routing.trace_width,
                points,
            });
            rail_offsets.push(x);
        }

        // Stop one pitch short of the innermost rail; run full width when
        // nothing was routed.
        let guard_end = if lines.is_empty() {
            self.bbox.max.x
        } else {
            (anchor - step).min(self.bbox.max.x)
        };
        let guards = self
            .row_guard_lines(&lines)
            .into_iter()
            .map(|(position, y)| {
                log::debug!("{position:?} row guard at y={y:.4}");
                GuardConductor {
                    layer,
                    position,
                    width: self.routing.guard_trace_width,
                    points: vec![Point::new(self.bbox.min.x, y), Point::new(guard_end, y)],
                }
            })
            .collect();

        Ok(RoutedLayer {
            layer,
            paths,
            guards,
            rail_offsets,
            pads,
        })
    }

    /// Route every non-empty column to `chip` on the top plane.
    ///
    /// Columns are visited left to right. Each drops from its lowest cell to
    /// a bottom rail, runs right to a right-hand rail and climbs to its pin.
    /// The first column takes the outermost rail on both sides and the
    /// lowest pin.
    pub fn route_columns(&self, chip: &ChipPad) -> Result<RoutedLayer, LayoutError> {
        let layer = ConductorLayer::Column;
        require_left_side(layer, chip)?;

        let vs = self.lattice.metrics.vert_spacing;
        let lines: Vec<LineExit> = self
            .lattice
            .columns()
            .into_iter()
            .filter_map(|(col, cells)| {
                let exit_cell = max_by(&cells, |c| -c.center.y)?;
                Some(LineExit {
                    index: col,
                    exit: Point::new(exit_cell.center.x, exit_cell.center.y - vs / 2.0),
                })
            })
            .collect();

        let indices: Vec<usize> = lines.iter().map(|l| l.index).collect();
        let pads = PadAssignment::assign(chip, &indices)?;
        let step = self.step();
        let n = lines.len() as f64;

        let min_exit_y = lines.iter().map(|l| l.exit.y).fold(f64::MAX, f64::min);
        let max_exit_x = lines.iter().map(|l| l.exit.x).fold(f64::MIN, f64::max);
        let bottom_outer = (self.bbox.min.y + self.routing.rail_inset).min(min_exit_y - n * step);
        let right_outer = (self.bbox.max.x - self.routing.rail_inset).max(max_exit_x + n * step);
        let bottom_y = |k: usize| bottom_outer + k as f64 * step;
        let right_x = |k: usize| right_outer - k as f64 * step;

        if let Some(&(_, first_pin)) = pads.pins().first() {
            let outermost = right_x(0);
            if first_pin.x < outermost + step - EPS {
                return Err(RoutingError::ChipInsideRails {
                    layer,
                    chip: chip.name.clone(),
                    pin_x: first_pin.x,
                    rail_x: outermost,
                }
                .into());
            }
        }

        let mut paths = Vec::with_capacity(lines.len());
        let mut rail_offsets = Vec::with_capacity(lines.len());
        for (k, (line, &(_, pin))) in lines.iter().zip(pads.pins()).enumerate() {
            let by = bottom_y(k);
            let rx = right_x(k);
            if pin.y <= by + EPS {
                return Err(RoutingError::PinBehindLine {
                    layer,
                    index: line.index,
                    pin_y: pin.y,
                    line_y: by,
                }
                .into());
            }
            let points = polyline_points(&[
                line.exit,
                Point::new(line.exit.x, by),
                Point::new(rx, by),
                Point::new(rx, pin.y),
                pin,
            ]);
            log::debug!(
                "Column {} -> bottom rail y={by:.4}, right rail x={rx:.4} -> pin y={:.4}",
                line.index,
                pin.y
            );
            paths.push(ConductorPath {
                layer,
                index: line.index,
                width: self.routing.trace_width,
                points,
            });
            rail_offsets.push(by);
        }

        // Every column path stays right of the guard, so it spans the full
        // outline height.
        let guards = self
            .column_guard_line()
            .map(|x| {
                log::debug!("Left column guard at x={x:.4}");
                GuardConductor {
                    layer,
                    position: GuardPosition::Left,
                    width: self.routing.guard_trace_width,
                    points: vec![Point::new(x, self.bbox.min.y), Point::new(x, self.bbox.max.y)],
                }
            })
            .into_iter()
            .collect();

        Ok(RoutedLayer {
            layer,
            paths,
            guards,
            rail_offsets,
            pads,
        })
    }
}

fn require_left_side(layer: ConductorLayer, chip: &ChipPad) -> Result<(), RoutingError> {
    if chip.pin_side == PinSide::Left {
        Ok(())
    } else {
        Err(RoutingError::UnsupportedPinSide {
            layer,
            chip: chip.name.clone(),
            side: chip.pin_side.to_string(),
        })
    }
}

fn max_by<'c>(cells: &[&'c HexCell], key: impl Fn(&HexCell) -> f64) -> Option<&'c HexCell> {
    cells
        .iter()
        .copied()
        .max_by(|a, b| key(a).total_cmp(&key(b)))
}

/// Copy `points`, dropping any point that repeats its predecessor.
fn polyline_points(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().map_or(true, |last| last.distance_to(&p) > EPS) {
            out.push(p);
        }
    }
    out
}
