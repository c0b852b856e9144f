use crate::clipper::ClippedLattice;
use crate::config::ElectrodeStyle;
use crate::geometry::{Point, Polygon};
use crate::hexgrid::hexagon_vertices;
use crate::lattice::HexCell;

/// One drawn electrode body and the row or column it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Electrode {
    pub line: usize,
    pub body: Polygon,
}

/// Draws the electrode bodies of both conductor planes.
pub trait ElectrodeStrategy {
    fn name(&self) -> &'static str;

    /// Bottom-plane bodies, in row order.
    fn row_electrodes(&self, lattice: &ClippedLattice) -> Vec<Electrode>;

    /// Top-plane bodies, in column order.
    fn column_electrodes(&self, lattice: &ClippedLattice) -> Vec<Electrode>;
}

pub fn strategy_for(style: ElectrodeStyle, gap: f64) -> Box<dyn ElectrodeStrategy> {
    match style {
        ElectrodeStyle::Tiles => Box::new(TileElectrodes { gap }),
        ElectrodeStyle::Serpentine => Box::new(SerpentineElectrodes { gap }),
    }
}

/// One hexagon per cell, shrunk by the gap, repeated on both planes.
#[derive(Debug, Clone, Copy)]
pub struct TileElectrodes {
    pub gap: f64,
}

impl TileElectrodes {
    fn tiles<'c>(
        &self,
        lattice: &ClippedLattice,
        cells: impl Iterator<Item = (usize, &'c HexCell)>,
    ) -> Vec<Electrode> {
        let pitch = lattice.metrics.pitch - self.gap;
        cells
            .map(|(line, c)| Electrode {
                line,
                body: Polygon::new(hexagon_vertices(c.center, pitch).to_vec()),
            })
            .collect()
    }
}

impl ElectrodeStrategy for TileElectrodes {
    fn name(&self) -> &'static str {
        "tiles"
    }

    fn row_electrodes(&self, lattice: &ClippedLattice) -> Vec<Electrode> {
        let rows = lattice.rows();
        let cells = rows
            .iter()
            .flat_map(|(&row, cells)| cells.iter().map(move |&c| (row, c)));
        self.tiles(lattice, cells)
    }

    fn column_electrodes(&self, lattice: &ClippedLattice) -> Vec<Electrode> {
        let cols = lattice.columns();
        let cells = cols
            .iter()
            .flat_map(|(&col, cells)| cells.iter().map(move |&c| (col, c)));
        self.tiles(lattice, cells)
    }
}

/// One continuous zig-zag body per unbroken run of cells in a row or column.
///
/// Row bodies alternate between full height at cell centers and half height
/// at cell boundaries. Column bodies trace the left and right flanks of
/// their cells and close in a point at each end. Where the outline cuts a
/// line into several runs (a concave notch), each run gets its own body so
/// no electrode crosses the gap.
#[derive(Debug, Clone, Copy)]
pub struct SerpentineElectrodes {
    pub gap: f64,
}

/// Split `cells`, already sorted by `key`, wherever consecutive keys are
/// further apart than one and a half `spacing`.
fn runs<'c>(
    cells: &[&'c HexCell],
    key: impl Fn(&HexCell) -> f64,
    spacing: f64,
) -> Vec<Vec<&'c HexCell>> {
    let mut runs: Vec<Vec<&HexCell>> = Vec::new();
    for &cell in cells {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|prev| key(cell) - key(prev) <= 1.5 * spacing) => {
                run.push(cell)
            }
            _ => runs.push(vec![cell]),
        }
    }
    runs
}

impl SerpentineElectrodes {
    fn row_outline(&self, lattice: &ClippedLattice, cells: &[&HexCell]) -> Option<Polygon> {
        let first = cells.first()?;
        let m = &lattice.metrics;
        let half = m.horiz_spacing / 2.0;
        let cy = first.center.y;
        let x_min = cells.iter().map(|c| c.center.x).fold(f64::MAX, f64::min);
        let x_max = cells.iter().map(|c| c.center.x).fold(f64::MIN, f64::max);

        let peak = m.height / 2.0 - self.gap / 2.0;
        let valley = m.height / 4.0 - self.gap / 2.0;
        // Half-pitch steps from the left edge of the first cell to the right
        // edge of the last one.
        let steps = ((x_max - x_min) / half).round() as usize + 2;

        let mut offsets = Vec::with_capacity(steps + 1);
        let mut polarity = false;
        for i in 0..=steps {
            let x = x_min - half + i as f64 * half;
            offsets.push((x, if polarity { peak } else { valley }));
            polarity = !polarity;
        }

        let mut vertices: Vec<Point> = offsets.iter().map(|&(x, dy)| Point::new(x, cy + dy)).collect();
        vertices.extend(offsets.iter().rev().map(|&(x, dy)| Point::new(x, cy - dy)));
        Some(Polygon::new(vertices))
    }

    fn column_outline(&self, lattice: &ClippedLattice, cells: &[&HexCell]) -> Option<Polygon> {
        let m = &lattice.metrics;
        let bottom = cells.first()?;
        let top = cells.last()?;

        let flank = m.horiz_spacing / 2.0 - self.gap / 2.0;
        let tip = m.height / 2.0 - self.gap / 2.0;
        let quarter = m.height / 4.0;

        let mut vertices = vec![Point::new(bottom.center.x, bottom.center.y - tip)];
        for c in cells {
            vertices.push(Point::new(c.center.x + flank, c.center.y - quarter));
            vertices.push(Point::new(c.center.x + flank, c.center.y + quarter));
        }
        vertices.push(Point::new(top.center.x, top.center.y + tip));
        for c in cells.iter().rev() {
            vertices.push(Point::new(c.center.x - flank, c.center.y + quarter));
            vertices.push(Point::new(c.center.x - flank, c.center.y - quarter));
        }
        Some(Polygon::new(vertices))
    }
}

impl ElectrodeStrategy for SerpentineElectrodes {
    fn name(&self) -> &'static str {
        "serpentine"
    }

    fn row_electrodes(&self, lattice: &ClippedLattice) -> Vec<Electrode> {
        let hs = lattice.metrics.horiz_spacing;
        let mut bodies = Vec::new();
        for (row, cells) in lattice.rows() {
            for run in runs(&cells, |c| c.center.x, hs) {
                if let Some(body) = self.row_outline(lattice, &run) {
                    bodies.push(Electrode { line: row, body });
                }
            }
        }
        bodies
    }

    fn column_electrodes(&self, lattice: &ClippedLattice) -> Vec<Electrode> {
        let vs = lattice.metrics.vert_spacing;
        let mut bodies = Vec::new();
        for (col, mut cells) in lattice.columns() {
            cells.sort_by(|a, b| a.center.y.total_cmp(&b.center.y));
            for run in runs(&cells, |c| c.center.y, vs) {
                if let Some(body) = self.column_outline(lattice, &run) {
                    bodies.push(Electrode { line: col, body });
                }
            }
        }
        bodies
    }
}
