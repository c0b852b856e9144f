use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::error::ConfigError;
use crate::geometry::{BBox, Point};
use crate::hexgrid::{hexagon_vertices, HexMetrics};

/// Upper bound on candidate cells before clipping.
pub const MAX_CELLS: usize = 4_000_000;

/// One tile position in the odd-r offset lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexCell {
    /// Row index; row 0 is the top row.
    pub row: usize,
    /// Column index; column 0 is the left-most column.
    pub col: usize,
    pub center: Point,
    pub vertices: [Point; 6],
}

/// Every candidate cell over a rectangle that covers both the dense grid
/// region and the boundary, before any clipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLattice {
    pub metrics: HexMetrics,
    pub rows: usize,
    pub cols: usize,
    /// Row and column of the cell centred on `grid_center`.
    pub anchor: (usize, usize),
    cells: Vec<HexCell>,
}

impl TileLattice {
    /// Instantiate the lattice anchored on `grid.grid_center`.
    ///
    /// The covered rectangle is the union of the dense grid rectangle and
    /// `outline_bbox`, grown by one row and one column so that cells whose
    /// centers sit right at the outline edge are still generated. Fails when
    /// the rectangle would need more than [`MAX_CELLS`] cells.
    pub fn build(grid: &GridConfig, outline_bbox: &BBox) -> Result<Self, ConfigError> {
        let metrics = HexMetrics::from_pitch(grid.pixel_pitch);
        let vs = metrics.vert_spacing;
        let hs = metrics.horiz_spacing;
        let center = grid.grid_center;

        let cover = BBox::centered(center, grid.grid_extent)
            .union(outline_bbox)
            .expand(hs, vs);

        // Steps needed from the anchor to reach each side of the cover.
        let steps = |span: f64, pitch: f64| (span.max(0.0) / pitch).ceil();
        let above = steps(cover.max.y - center.y, vs);
        let below = steps(center.y - cover.min.y, vs);
        let left = steps(center.x - cover.min.x, hs);
        let right = steps(cover.max.x - center.x, hs);

        // One spare row for the even-anchor adjustment below.
        let rows_f = above + below + 2.0;
        let cols_f = left + right + 1.0;
        // Written so that NaN fails too.
        if !(rows_f * cols_f <= MAX_CELLS as f64) {
            return Err(ConfigError::LatticeTooLarge {
                rows: rows_f,
                cols: cols_f,
                limit: MAX_CELLS,
            });
        }

        let mut rows_above = above as usize;
        // Keep the anchor row even so it carries no odd-row shift.
        if rows_above % 2 == 1 {
            rows_above += 1;
        }
        let rows_below = below as usize;
        let cols_left = left as usize;
        let cols_right = right as usize;

        let rows = rows_above + rows_below + 1;
        let cols = cols_left + cols_right + 1;
        let start_x = center.x - cols_left as f64 * hs;
        let start_y = center.y + rows_above as f64 * vs;

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let offset_x = if row % 2 == 1 { hs / 2.0 } else { 0.0 };
            let y = start_y - row as f64 * vs;
            for col in 0..cols {
                let center = Point::new(start_x + col as f64 * hs + offset_x, y);
                cells.push(HexCell {
                    row,
                    col,
                    center,
                    vertices: hexagon_vertices(center, grid.pixel_pitch),
                });
            }
        }

        log::debug!(
            "Lattice {} rows x {} cols anchored at row {}, col {}",
            rows,
            cols,
            rows_above,
            cols_left
        );

        Ok(Self {
            metrics,
            rows,
            cols,
            anchor: (rows_above, cols_left),
            cells,
        })
    }

    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<HexCell> {
        self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&HexCell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn grid(center: Point, extent: Size) -> GridConfig {
        GridConfig {
            pixel_pitch: 0.95,
            gap: 0.05,
            grid_extent: extent,
            grid_center: center,
        }
    }

    #[test]
    fn test_anchor_cell_sits_on_grid_center() {
        let g = grid(Point::new(3.0, -2.0), Size::new(10.0, 5.0));
        let outline = BBox::new(Point::new(-20.0, -20.0), Point::new(20.0, 20.0));
        let lattice = TileLattice::build(&g, &outline).unwrap();
        let (row, col) = lattice.anchor;
        assert_eq!(row % 2, 0);
        let cell = lattice.cell(row, col).unwrap();
        assert!((cell.center.x - 3.0).abs() < 1e-9);
        assert!((cell.center.y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_odd_rows_are_shifted_half_a_pitch() {
        let g = grid(Point::new(0.0, 0.0), Size::new(5.0, 5.0));
        let outline = BBox::new(Point::new(-5.0, -5.0), Point::new(5.0, 5.0));
        let lattice = TileLattice::build(&g, &outline).unwrap();
        let even = lattice.cell(0, 2).unwrap();
        let odd = lattice.cell(1, 2).unwrap();
        assert!((odd.center.x - even.center.x - 0.475).abs() < 1e-9);
        assert!((even.center.y - odd.center.y - lattice.metrics.vert_spacing).abs() < 1e-9);
    }

    #[test]
    fn test_rows_share_y() {
        let g = grid(Point::new(0.0, 0.0), Size::new(5.0, 5.0));
        let outline = BBox::new(Point::new(-5.0, -5.0), Point::new(5.0, 5.0));
        let lattice = TileLattice::build(&g, &outline).unwrap();
        for cell in lattice.cells() {
            let first = lattice.cell(cell.row, 0).unwrap();
            assert_eq!(cell.center.y, first.center.y);
        }
    }

    #[test]
    fn test_oversized_lattice_is_rejected() {
        let outline = BBox::new(Point::new(-5.0, -5.0), Point::new(5.0, 5.0));
        let g = grid(Point::new(0.0, 0.0), Size::new(f64::INFINITY, 15.0));
        assert!(matches!(
            TileLattice::build(&g, &outline),
            Err(ConfigError::LatticeTooLarge { .. })
        ));
        let g = grid(Point::new(0.0, 0.0), Size::new(1.0e6, 1.0e6));
        assert!(matches!(
            TileLattice::build(&g, &outline),
            Err(ConfigError::LatticeTooLarge { limit: MAX_CELLS, .. })
        ));
    }

    #[test]
    fn test_covers_outline_beyond_dense_region() {
        // Grid centre far off the outline centre; lattice must still reach the outline.
        let g = grid(Point::new(8.0, 8.0), Size::new(2.0, 2.0));
        let outline = BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let lattice = TileLattice::build(&g, &outline).unwrap();
        let bb = BBox::from_points(
            &lattice.cells().iter().map(|c| c.center).collect::<Vec<_>>(),
        )
        .unwrap();
        assert!(bb.min.x <= 0.0 && bb.min.y <= 0.0);
        assert!(bb.max.x >= 10.0 && bb.max.y >= 10.0);
        assert_eq!(lattice.cell_count(), lattice.rows * lattice.cols);
    }
}
