use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryPolygon;
use crate::hexgrid::HexMetrics;
use crate::lattice::{HexCell, TileLattice};

/// Cells of a lattice whose centers fall inside the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClippedLattice {
    pub metrics: HexMetrics,
    cells: Vec<HexCell>,
}

impl ClippedLattice {
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells grouped by row, left to right within each row.
    pub fn rows(&self) -> BTreeMap<usize, Vec<&HexCell>> {
        let mut rows: BTreeMap<usize, Vec<&HexCell>> = BTreeMap::new();
        for cell in &self.cells {
            rows.entry(cell.row).or_default().push(cell);
        }
        rows
    }

    /// Cells grouped by column, top to bottom within each column.
    pub fn columns(&self) -> BTreeMap<usize, Vec<&HexCell>> {
        let mut cols: BTreeMap<usize, Vec<&HexCell>> = BTreeMap::new();
        for cell in &self.cells {
            cols.entry(cell.col).or_default().push(cell);
        }
        cols
    }
}

/// Filters lattice cells by center containment.
pub struct LatticeClipper<'a> {
    boundary: &'a BoundaryPolygon,
}

impl<'a> LatticeClipper<'a> {
    pub fn new(boundary: &'a BoundaryPolygon) -> Self {
        Self { boundary }
    }

    pub fn clip(&self, lattice: TileLattice) -> ClippedLattice {
        let metrics = lattice.metrics;
        let total = lattice.cell_count();
        let cells: Vec<HexCell> = lattice
            .into_cells()
            .into_iter()
            .filter(|c| self.boundary.contains(&c.center))
            .collect();
        log::debug!("Clipped lattice: kept {} of {} cells", cells.len(), total);
        ClippedLattice { metrics, cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::geometry::{Point, Size};
    use proptest::prelude::*;

    fn square_boundary() -> BoundaryPolygon {
        BoundaryPolygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap()
    }

    fn oversized_grid() -> GridConfig {
        GridConfig {
            pixel_pitch: 0.95,
            gap: 0.05,
            grid_extent: Size::new(20.0, 20.0),
            grid_center: Point::new(5.0, 5.0),
        }
    }

    #[test]
    fn test_square_keeps_only_interior_centers() {
        let boundary = square_boundary();
        let lattice = TileLattice::build(&oversized_grid(), &boundary.bbox()).unwrap();
        let total = lattice.cell_count();
        let clipped = LatticeClipper::new(&boundary).clip(lattice);
        assert!(!clipped.is_empty());
        assert!(clipped.len() < total);
        for cell in clipped.cells() {
            assert!(cell.center.x > 0.0 && cell.center.x < 10.0);
            assert!(cell.center.y > 0.0 && cell.center.y < 10.0);
        }
    }

    #[test]
    fn test_row_and_column_grouping() {
        let boundary = square_boundary();
        let lattice = TileLattice::build(&oversized_grid(), &boundary.bbox()).unwrap();
        let clipped = LatticeClipper::new(&boundary).clip(lattice);

        let rows = clipped.rows();
        let cols = clipped.columns();
        let in_rows: usize = rows.values().map(Vec::len).sum();
        let in_cols: usize = cols.values().map(Vec::len).sum();
        assert_eq!(in_rows, clipped.len());
        assert_eq!(in_cols, clipped.len());

        for cells in rows.values() {
            let y = cells[0].center.y;
            assert!(cells.iter().all(|c| c.center.y == y));
            assert!(cells.windows(2).all(|w| w[0].center.x < w[1].center.x));
        }
        // About 10 / 0.8227 rows fit inside the square.
        assert!(rows.len() >= 11 && rows.len() <= 13);
    }

    #[test]
    fn test_boundary_away_from_grid_still_gets_cells() {
        let boundary = square_boundary();
        let grid = GridConfig {
            grid_center: Point::new(40.0, 40.0),
            grid_extent: Size::new(2.0, 2.0),
            ..oversized_grid()
        };
        let lattice = TileLattice::build(&grid, &boundary.bbox()).unwrap();
        let clipped = LatticeClipper::new(&boundary).clip(lattice);
        assert!(clipped.len() > 50);
    }

    proptest! {
        #[test]
        fn clip_partitions_the_lattice(
            cx in 2.0f64..8.0,
            cy in 2.0f64..8.0,
            pitch in 0.5f64..2.0,
        ) {
            let boundary = square_boundary();
            let grid = GridConfig {
                pixel_pitch: pitch,
                gap: 0.0,
                grid_extent: Size::new(4.0, 4.0),
                grid_center: Point::new(cx, cy),
            };
            let lattice = TileLattice::build(&grid, &boundary.bbox()).unwrap();
            let outside: Vec<HexCell> = lattice
                .cells()
                .iter()
                .filter(|c| !boundary.contains(&c.center))
                .cloned()
                .collect();
            let total = lattice.cell_count();
            let clipped = LatticeClipper::new(&boundary).clip(lattice);
            prop_assert_eq!(clipped.len() + outside.len(), total);
            prop_assert!(clipped.cells().iter().all(|c| boundary.contains(&c.center)));
        }
    }
}
