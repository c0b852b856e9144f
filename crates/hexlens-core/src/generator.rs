use crate::clipper::LatticeClipper;
use crate::config::LayoutConfig;
use crate::document::LayoutDocument;
use crate::electrode::strategy_for;
use crate::error::{ConfigError, GenerationWarning, LayoutError};
use crate::geometry::{BBox, Shape};
use crate::layer::{
    COLUMN_CHIP, COLUMN_ELECTRODES, COLUMN_TRACES, OUTLINE, ROW_CHIP, ROW_ELECTRODES, ROW_TRACES,
};
use crate::lattice::TileLattice;
use crate::router::{ConductorRouter, RoutedLayer};

/// Document name used by [`generate`].
pub const DEFAULT_NAME: &str = "lens";

/// Run the whole pipeline on `config`.
pub fn generate(config: &LayoutConfig) -> Result<LayoutDocument, LayoutError> {
    generate_named(DEFAULT_NAME, config)
}

/// Lattice, clipping, routing and electrode drawing for one lens.
///
/// Deterministic: the same configuration always yields an identical
/// document.
pub fn generate_named(name: &str, config: &LayoutConfig) -> Result<LayoutDocument, LayoutError> {
    config.validate()?;
    let boundary = config.boundary()?;
    let bbox = boundary.bbox();

    let lattice = TileLattice::build(&config.grid, &bbox)?;
    let warnings = check_extents(config, &bbox, lattice.metrics.height);
    for warning in &warnings {
        log::warn!("{warning}");
    }

    let clipped = LatticeClipper::new(&boundary).clip(lattice);
    if clipped.is_empty() {
        return Err(ConfigError::EmptyLattice.into());
    }
    let row_count = clipped.rows().len();
    let column_count = clipped.columns().len();
    log::info!(
        "Hex lattice: {} tiles in {} rows x {} columns (pitch {} mm)",
        clipped.len(),
        row_count,
        column_count,
        config.grid.pixel_pitch
    );

    let router = ConductorRouter::new(&clipped, &boundary, &config.routing);
    let rows = router.route_rows(&config.row_chip)?;
    log_pass("row", &rows, &config.row_chip.name, config.row_chip.pin_count);
    let columns = router.route_columns(&config.column_chip)?;
    log_pass("column", &columns, &config.column_chip.name, config.column_chip.pin_count);

    let electrodes = strategy_for(config.electrode_style, config.grid.gap);
    let row_bodies = electrodes.row_electrodes(&clipped);
    let column_bodies = electrodes.column_electrodes(&clipped);
    log::info!(
        "Electrodes ({}): {} row bodies, {} column bodies",
        electrodes.name(),
        row_bodies.len(),
        column_bodies.len()
    );

    let outline = boundary.to_polygon();
    let row_traces = trace_shapes(&rows);
    let column_traces = trace_shapes(&columns);
    let mut doc = LayoutDocument::new(
        name,
        boundary,
        config.row_chip.clone(),
        config.column_chip.clone(),
        rows,
        columns,
    );
    doc.add_shape(OUTLINE, Shape::Polygon(outline));
    for e in row_bodies {
        doc.add_line_shape(ROW_ELECTRODES, e.line, Shape::Polygon(e.body));
    }
    for e in column_bodies {
        doc.add_line_shape(COLUMN_ELECTRODES, e.line, Shape::Polygon(e.body));
    }
    for (layer, traces) in [(ROW_TRACES, row_traces), (COLUMN_TRACES, column_traces)] {
        for (line, shape) in traces {
            match line {
                Some(line) => doc.add_line_shape(layer, line, shape),
                None => doc.add_shape(layer, shape),
            }
        }
    }
    doc.add_shape(ROW_CHIP, Shape::Rect(config.row_chip.body()));
    doc.add_shape(COLUMN_CHIP, Shape::Rect(config.column_chip.body()));
    for warning in warnings {
        doc.add_warning(warning);
    }

    log::info!("Layout '{}': {} shapes", doc.name(), doc.shape_count());
    Ok(doc)
}

fn check_extents(config: &LayoutConfig, bbox: &BBox, tile_height: f64) -> Vec<GenerationWarning> {
    let mut warnings = Vec::new();
    if bbox.width() < tile_height || bbox.height() < tile_height {
        warnings.push(GenerationWarning::BoundarySmallerThanTile {
            width: bbox.width(),
            height: bbox.height(),
            tile_height,
        });
    }
    let dense = BBox::centered(config.grid.grid_center, config.grid.grid_extent);
    if !dense.intersects(bbox) {
        warnings.push(GenerationWarning::DenseRegionOutsideBoundary);
    }
    warnings
}

/// Conductors first, tagged with their line, then guards.
fn trace_shapes(routed: &RoutedLayer) -> Vec<(Option<usize>, Shape)> {
    routed
        .paths
        .iter()
        .map(|p| (Some(p.index), Shape::Polyline(p.to_polyline())))
        .chain(
            routed
                .guards
                .iter()
                .map(|g| (None, Shape::Polyline(g.to_polyline()))),
        )
        .collect()
}

fn log_pass(kind: &str, routed: &RoutedLayer, chip: &str, pin_count: usize) {
    log::info!(
        "Routed {} {kind} lines to '{chip}' ({} of {pin_count} pins), {} guard(s)",
        routed.paths.len(),
        routed.pads.len(),
        routed.guards.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElectrodeStyle;
    use crate::geometry::{Point, Size};
    use crate::layer::Plane;

    #[test]
    fn test_default_layout() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        assert_eq!(doc.name(), DEFAULT_NAME);
        assert!(doc.warnings().is_empty());
        assert_eq!(doc.shapes_on(OUTLINE).len(), 1);
        assert_eq!(doc.rows().guards.len(), 2);
        assert_eq!(doc.columns().guards.len(), 1);
        assert_eq!(
            doc.shapes_on(ROW_TRACES).len(),
            doc.rows().paths.len() + doc.rows().guards.len()
        );
        assert_eq!(
            doc.shapes_on(ROW_ELECTRODES).len(),
            doc.shapes_on(COLUMN_ELECTRODES).len()
        );
        assert_eq!(doc.shapes_on(ROW_CHIP).len(), 1);
        assert_eq!(doc.layers_on(Plane::Top).len(), 4);
    }

    #[test]
    fn test_default_layout_routes_every_line() {
        let config = LayoutConfig::default();
        let boundary = config.boundary().unwrap();
        let lattice = LatticeClipper::new(&boundary)
            .clip(TileLattice::build(&config.grid, &boundary.bbox()).unwrap());
        let doc = generate(&config).unwrap();

        let rows: Vec<usize> = lattice.rows().keys().copied().collect();
        let columns: Vec<usize> = lattice.columns().keys().copied().collect();
        assert_eq!(doc.rows().paths.len(), rows.len());
        assert_eq!(doc.columns().paths.len(), columns.len());
        assert_eq!(doc.rows().paths.iter().map(|p| p.index).collect::<Vec<_>>(), rows);
        assert_eq!(doc.columns().paths.iter().map(|p| p.index).collect::<Vec<_>>(), columns);
        for &row in &rows {
            assert!(doc.rows().pads.pin_for(row).is_some());
        }
    }

    #[test]
    fn test_shapes_carry_their_line() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let first = &doc.rows().paths[0];
        assert_eq!(doc.line_of(ROW_TRACES, 0), Some(first.index));
        let guard = doc.rows().paths.len();
        assert_eq!(doc.line_of(ROW_TRACES, guard), None);
        assert!(doc.line_of(ROW_ELECTRODES, 0).is_some());
        assert!(doc.line_of(COLUMN_ELECTRODES, 0).is_some());
        assert_eq!(doc.line_of(OUTLINE, 0), None);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let config = LayoutConfig::default();
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_serpentine_style() {
        let config = LayoutConfig {
            electrode_style: ElectrodeStyle::Serpentine,
            ..LayoutConfig::default()
        };
        let doc = generate(&config).unwrap();
        let tiles = generate(&LayoutConfig::default()).unwrap();
        assert!(doc.shapes_on(ROW_ELECTRODES).len() < tiles.shapes_on(ROW_ELECTRODES).len());
        // Routing does not depend on how electrodes are drawn.
        assert_eq!(doc.rows(), tiles.rows());
    }

    #[test]
    fn test_thin_boundary_warns() {
        let mut config = LayoutConfig::default();
        config.grid.grid_center = Point::new(0.0, 0.0);
        config.routing.guard_trace_width = 0.0;
        config.boundary_outline = vec![
            Point::new(-10.0, -0.45),
            Point::new(10.0, -0.45),
            Point::new(10.0, 0.45),
            Point::new(-10.0, 0.45),
        ];
        let doc = generate(&config).unwrap();
        assert!(matches!(
            doc.warnings(),
            [GenerationWarning::BoundarySmallerThanTile { .. }]
        ));
        assert_eq!(doc.rows().paths.len(), 1);
    }

    #[test]
    fn test_distant_dense_region_warns() {
        let mut config = LayoutConfig::default();
        config.grid.grid_center = Point::new(100.0, 100.0);
        let doc = generate(&config).unwrap();
        assert_eq!(
            doc.warnings(),
            &[GenerationWarning::DenseRegionOutsideBoundary]
        );
        assert!(!doc.shapes_on(ROW_ELECTRODES).is_empty());
    }

    #[test]
    fn test_empty_lattice_is_an_error() {
        let mut config = LayoutConfig::default();
        config.grid.grid_center = Point::new(0.0, 0.0);
        config.boundary_outline = vec![
            Point::new(0.2, 0.2),
            Point::new(0.3, 0.2),
            Point::new(0.25, 0.3),
        ];
        assert_eq!(
            generate(&config).unwrap_err(),
            LayoutError::Config(ConfigError::EmptyLattice)
        );
    }

    #[test]
    fn test_infinite_extent_is_a_config_error() {
        let mut config = LayoutConfig::default();
        config.grid.grid_extent = Size::new(f64::INFINITY, 15.0);
        assert!(matches!(
            generate(&config),
            Err(LayoutError::Config(ConfigError::NonFinite { .. }))
        ));

        config.grid.grid_extent = Size::new(1.0e5, 1.0e5);
        assert!(matches!(
            generate(&config),
            Err(LayoutError::Config(ConfigError::LatticeTooLarge { .. }))
        ));

        let mut config = LayoutConfig::default();
        config.boundary_outline[3] = Point::new(f64::NAN, 0.0);
        assert!(matches!(
            generate(&config),
            Err(LayoutError::Config(ConfigError::NonFiniteBoundaryPoint { index: 3 }))
        ));
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let mut config = LayoutConfig::default();
        config.routing.trace_width = -1.0;
        assert!(matches!(
            generate(&config),
            Err(LayoutError::Config(ConfigError::NonPositive { .. }))
        ));
    }
}
