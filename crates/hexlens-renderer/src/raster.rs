//! Raster preview of a generated layout.
//!
//! Two panels side by side: the bottom plane (rows) on the left and the top
//! plane (columns) on the right. Electrodes and conductors are coloured by
//! their line index so neighbouring lines stay distinguishable; guards, chips
//! and the lens outline use their layer colour.

use image::{Rgb, RgbImage};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use hexlens_core::document::LayoutDocument;
use hexlens_core::layer::Plane;

use crate::render_data::{RenderFrame, RenderLayer};
use crate::viewport::Viewport;

/// Thinnest stroke drawn, in pixels.
const MIN_STROKE_PX: f32 = 1.0;

const LINE_PALETTE: [(u8, u8, u8); 8] = [
    (231, 76, 60),
    (52, 152, 219),
    (46, 204, 113),
    (241, 196, 15),
    (155, 89, 182),
    (26, 188, 156),
    (230, 126, 34),
    (236, 240, 241),
];

fn bg_color() -> Color {
    Color::from_rgba8(24, 28, 36, 255)
}

/// Background pixel of [`render_preview`] output.
pub const BACKGROUND: Rgb<u8> = Rgb([24, 28, 36]);

fn line_color(line: usize, alpha: u8) -> Color {
    let (r, g, b) = LINE_PALETTE[line % LINE_PALETTE.len()];
    Color::from_rgba8(r, g, b, alpha)
}

fn layer_color(layer: &RenderLayer) -> Color {
    let [r, g, b, a] = layer.color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color::from_rgba8(r, g, b, a)
}

/// Render both planes of `doc`, each in a `panel_width` x `panel_height`
/// panel, into one image `2 * panel_width` wide.
pub fn render_preview(doc: &LayoutDocument, panel_width: u32, panel_height: u32) -> RgbImage {
    let width = panel_width.saturating_mul(2);
    let Some(mut pixmap) = Pixmap::new(width, panel_height) else {
        return RgbImage::new(width, panel_height);
    };
    pixmap.fill(bg_color());

    for (panel, plane) in [Plane::Bottom, Plane::Top].into_iter().enumerate() {
        let mut viewport = Viewport::new(panel_width as f64, panel_height as f64);
        if let Some(bbox) = doc.bbox() {
            viewport.fit_bbox(&bbox);
        }
        let frame = RenderFrame::for_plane(doc, plane, viewport);
        let offset = (panel as u32 * panel_width) as f32;
        draw_frame(&mut pixmap, &frame, offset);
    }

    log::debug!("Raster preview '{}': {}x{} px", doc.name(), width, panel_height);

    let data = pixmap.data();
    RgbImage::from_fn(width, panel_height, |x, y| {
        let idx = ((y * width + x) * 4) as usize;
        Rgb([data[idx], data[idx + 1], data[idx + 2]])
    })
}

/// Draw `frame` into `pixmap`, shifted right by `offset_x` pixels.
fn draw_frame(pixmap: &mut Pixmap, frame: &RenderFrame, offset_x: f32) {
    let vp = &frame.viewport;
    let zoom = vp.zoom as f32;
    // Lens space has y up, the pixmap has y down.
    let transform = Transform::from_row(
        zoom,
        0.0,
        0.0,
        -zoom,
        offset_x + (vp.canvas_width / 2.0 - vp.center_x * vp.zoom) as f32,
        (vp.canvas_height / 2.0 + vp.center_y * vp.zoom) as f32,
    );
    let hairline = MIN_STROKE_PX / zoom;

    for layer in frame.layers.iter().filter(|l| l.visible) {
        let base = layer_color(layer);
        let alpha = base.alpha();
        let outline_only = layer.fill_pattern == "outline";

        for polygon in &layer.polygons {
            let Some(path) = closed_path(&polygon.vertices) else {
                continue;
            };
            let mut paint = Paint::default();
            paint.anti_alias = true;
            paint.set_color(match polygon.line {
                Some(line) => line_color(line, (alpha * 255.0) as u8),
                None => base,
            });
            if outline_only {
                let stroke = Stroke {
                    width: hairline * 2.0,
                    ..Default::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            } else {
                pixmap.fill_path(&path, &paint, FillRule::EvenOdd, transform, None);
            }
        }

        for polyline in &layer.polylines {
            let Some(path) = open_path(&polyline.points) else {
                continue;
            };
            let mut paint = Paint::default();
            paint.anti_alias = true;
            paint.set_color(match polyline.line {
                Some(line) => line_color(line, 255),
                None => base,
            });
            let stroke = Stroke {
                width: (polyline.width as f32).max(hairline),
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }
}

fn open_path(flat: &[f64]) -> Option<tiny_skia::Path> {
    let mut points = flat.chunks_exact(2);
    let first = points.next()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first[0] as f32, first[1] as f32);
    for p in points {
        pb.line_to(p[0] as f32, p[1] as f32);
    }
    pb.finish()
}

fn closed_path(flat: &[f64]) -> Option<tiny_skia::Path> {
    let mut points = flat.chunks_exact(2);
    let first = points.next()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first[0] as f32, first[1] as f32);
    for p in points {
        pb.line_to(p[0] as f32, p[1] as f32);
    }
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexlens_core::{generate, LayoutConfig};

    fn drawn_pixels(img: &RgbImage, xs: std::ops::Range<u32>) -> usize {
        xs.flat_map(|x| (0..img.height()).map(move |y| (x, y)))
            .filter(|&(x, y)| *img.get_pixel(x, y) != BACKGROUND)
            .count()
    }

    #[test]
    fn test_preview_has_two_drawn_panels() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let img = render_preview(&doc, 320, 240);
        assert_eq!(img.dimensions(), (640, 240));
        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*img.get_pixel(639, 239), BACKGROUND);

        let left = drawn_pixels(&img, 0..320);
        let right = drawn_pixels(&img, 320..640);
        // The lens interior is mostly tiled on both planes.
        assert!(left > 320 * 240 / 10, "bottom panel drew {left} px");
        assert!(right > 320 * 240 / 10, "top panel drew {right} px");
    }

    #[test]
    fn test_lens_centre_is_covered() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let img = render_preview(&doc, 400, 300);
        let mut viewport = Viewport::new(400.0, 300.0);
        viewport.fit_bbox(&doc.bbox().unwrap());
        let centre = doc.boundary().bbox().center();
        let px = viewport.layout_to_screen(centre);
        let (x, y) = (px.x as u32, px.y as u32);
        assert_ne!(*img.get_pixel(x, y), BACKGROUND);
        assert_ne!(*img.get_pixel(x + 400, y), BACKGROUND);
    }

    #[test]
    fn test_empty_canvas() {
        let doc = generate(&LayoutConfig::default()).unwrap();
        let img = render_preview(&doc, 0, 0);
        assert_eq!(img.dimensions(), (0, 0));
    }
}
