use serde::{Deserialize, Serialize};

use hexlens_core::geometry::{BBox, Point};

/// Preview camera over the lens, in millimetres.
///
/// Screen space has its origin at the top-left with y pointing down; lens
/// space has y pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    /// Pixels per millimetre.
    pub zoom: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            canvas_width,
            canvas_height,
        }
    }

    /// Centre on `bbox` and zoom so it fills 90% of the canvas.
    pub fn fit_bbox(&mut self, bbox: &BBox) {
        let width = bbox.width();
        let height = bbox.height();
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let center = bbox.center();
        self.center_x = center.x;
        self.center_y = center.y;
        let zoom_x = self.canvas_width / width * 0.9;
        let zoom_y = self.canvas_height / height * 0.9;
        self.zoom = zoom_x.min(zoom_y);
    }

    pub fn screen_to_layout(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.canvas_width / 2.0) / self.zoom + self.center_x,
            (self.canvas_height / 2.0 - screen.y) / self.zoom + self.center_y,
        )
    }

    pub fn layout_to_screen(&self, layout: Point) -> Point {
        Point::new(
            (layout.x - self.center_x) * self.zoom + self.canvas_width / 2.0,
            self.canvas_height / 2.0 - (layout.y - self.center_y) * self.zoom,
        )
    }

    /// Lens-space rectangle currently on screen.
    pub fn visible_bounds(&self) -> BBox {
        let half_w = self.canvas_width / (2.0 * self.zoom);
        let half_h = self.canvas_height / (2.0 * self.zoom);
        BBox::new(
            Point::new(self.center_x - half_w, self.center_y - half_h),
            Point::new(self.center_x + half_w, self.center_y + half_h),
        )
    }
}
