//! Viewport module for screen/canvas coordinate transforms.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum zoom reachable through [`Viewport::zoom_at`].
pub const MIN_ZOOM: f64 = 0.05;
/// Maximum zoom reachable through [`Viewport::zoom_at`].
pub const MAX_ZOOM: f64 = 64.0;

/// Pan and zoom of the canvas surface.
///
/// Screen coordinates are pointer positions as reported by the host; they are
/// made relative to the surface's on-screen rectangle before `pan` and `zoom`
/// are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Zoom factor, always > 0.
    pub zoom: f64,
    /// Pan offset in screen pixels, relative to the surface origin.
    pub pan: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl Viewport {
    /// Create a viewport with the given zoom (must be > 0) and pan.
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self {
            zoom,
            pan: Vec2::new(pan_x, pan_y),
        }
    }

    /// Transform from canvas coordinates to surface-relative screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Transform from surface-relative screen coordinates to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a pointer position to canvas coordinates.
    ///
    /// `reference_rect` is the surface's current on-screen rectangle. Callers
    /// should read it at event time, since layout can move the surface.
    pub fn screen_to_canvas(&self, client: Point, reference_rect: Rect) -> Point {
        let local = Point::new(client.x - reference_rect.x0, client.y - reference_rect.y0);
        self.inverse_transform() * local
    }

    /// Convert a canvas point to a pointer position.
    pub fn canvas_to_screen(&self, canvas: Point, reference_rect: Rect) -> Point {
        let local = self.transform() * canvas;
        Point::new(local.x + reference_rect.x0, local.y + reference_rect.y0)
    }

    /// Convert a screen-space distance (pixels) to canvas units.
    pub fn screen_to_canvas_distance(&self, screen: f64) -> f64 {
        screen / self.zoom
    }

    /// Convert a canvas-space distance to screen pixels.
    pub fn canvas_to_screen_distance(&self, canvas: f64) -> f64 {
        canvas * self.zoom
    }

    /// Pan by a delta in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping the given surface-relative screen point fixed.
    pub fn zoom_at(&mut self, local_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let canvas_point = self.inverse_transform() * local_point;
        self.zoom = new_zoom;

        let moved = self.transform() * canvas_point;
        self.pan += local_point - moved;
    }
}

/// Free-function form of [`Viewport::screen_to_canvas`].
pub fn screen_to_canvas(client: Point, reference_rect: Rect, viewport: &Viewport) -> Point {
    viewport.screen_to_canvas(client, reference_rect)
}

/// Free-function form of [`Viewport::canvas_to_screen`].
pub fn canvas_to_screen(canvas: Point, reference_rect: Rect, viewport: &Viewport) -> Point {
    viewport.canvas_to_screen(canvas, reference_rect)
}
