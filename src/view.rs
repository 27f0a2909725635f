//! View-space ↔ canvas-space mapping.
//!
//! The view transform is pure coordinate bookkeeping: canvas pixel
//! coordinates scale by the zoom factor and shift by the pan offset to
//! land in view space.  It carries no canvas data, so documents guard it
//! with its own lock and renders never contend with pixel operations.

/// Zoom/pan state of one document view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// View pixels per canvas pixel.
    pub zoom: f32,
    /// View-space position of the canvas origin.
    pub pan: (f32, f32),
}

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 64.0;

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas_to_view(&self, pos: (f32, f32)) -> (f32, f32) {
        (
            pos.0 * self.zoom + self.pan.0,
            pos.1 * self.zoom + self.pan.1,
        )
    }

    pub fn view_to_canvas(&self, pos: (f32, f32)) -> (f32, f32) {
        (
            (pos.0 - self.pan.0) / self.zoom,
            (pos.1 - self.pan.1) / self.zoom,
        )
    }

    /// View position to the canvas pixel containing it (floored, may be
    /// out of bounds — tools drop what they cannot use).
    pub fn view_to_canvas_pixel(&self, pos: (f32, f32)) -> (i32, i32) {
        let (x, y) = self.view_to_canvas(pos);
        (x.floor() as i32, y.floor() as i32)
    }

    pub fn pan_by(&mut self, delta: (f32, f32)) {
        self.pan.0 += delta.0;
        self.pan.1 += delta.1;
    }

    /// Set the zoom factor, keeping the canvas point under `anchor`
    /// (view space) stationary on screen.
    pub fn zoom_about(&mut self, anchor: (f32, f32), zoom: f32) {
        let pivot = self.view_to_canvas(anchor);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = (
            anchor.0 - pivot.0 * self.zoom,
            anchor.1 - pivot.1 * self.zoom,
        );
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_identity() {
        let mut view = ViewTransform::new();
        view.set_zoom(2.5);
        view.pan_by((40.0, -12.0));
        let canvas = (17.0, 3.0);
        let back = view.view_to_canvas(view.canvas_to_view(canvas));
        assert!((back.0 - canvas.0).abs() < 1e-4);
        assert!((back.1 - canvas.1).abs() < 1e-4);
    }

    #[test]
    fn pixel_mapping_floors() {
        let mut view = ViewTransform::new();
        view.set_zoom(2.0);
        view.pan_by((10.0, 10.0));
        // View (13, 10) → canvas (1.5, 0) → pixel (1, 0).
        assert_eq!(view.view_to_canvas_pixel((13.0, 10.0)), (1, 0));
        // Left of the canvas origin maps to negative pixels.
        assert_eq!(view.view_to_canvas_pixel((9.0, 9.0)), (-1, -1));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = ViewTransform::new();
        view.set_zoom(1000.0);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.set_zoom(0.0);
        assert_eq!(view.zoom, MIN_ZOOM);
    }

    #[test]
    fn zoom_about_keeps_anchor_stationary() {
        let mut view = ViewTransform::new();
        view.pan_by((5.0, 5.0));
        let anchor = (50.0, 30.0);
        let before = view.view_to_canvas(anchor);
        view.zoom_about(anchor, 4.0);
        let after = view.view_to_canvas(anchor);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }
}
