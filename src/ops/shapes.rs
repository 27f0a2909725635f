//! Shape previews staged in the clipboard.
//!
//! The shape tool drags out a rectangle, ellipse or line; each movement
//! re-rasterizes the shape into a canvas-sized image which the editor
//! installs as the clipboard preview.  Committing is the clipboard dump.

use image::{Rgba, RgbaImage};

/// Available shape primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Line,
}

impl ShapeKind {
    pub fn all() -> &'static [ShapeKind] {
        &[ShapeKind::Rectangle, ShapeKind::Ellipse, ShapeKind::Line]
    }
}

/// Rasterize `kind` spanning the two drag corners into a transparent
/// canvas-sized image.  `filled` selects solid fill versus a 1-pixel
/// outline (ignored for lines).  Off-canvas parts are clipped.
pub fn rasterize_shape(
    kind: ShapeKind,
    a: (i32, i32),
    b: (i32, i32),
    color: Rgba<u8>,
    filled: bool,
    canvas_w: u32,
    canvas_h: u32,
) -> RgbaImage {
    let mut out = RgbaImage::new(canvas_w, canvas_h);
    match kind {
        ShapeKind::Rectangle => draw_rectangle(&mut out, a, b, color, filled),
        ShapeKind::Ellipse => draw_ellipse(&mut out, a, b, color, filled),
        ShapeKind::Line => draw_line(&mut out, a, b, color),
    }
    out
}

fn put(out: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < out.width() && (y as u32) < out.height() {
        out.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_rectangle(out: &mut RgbaImage, a: (i32, i32), b: (i32, i32), color: Rgba<u8>, filled: bool) {
    let (min_x, max_x) = (a.0.min(b.0), a.0.max(b.0));
    let (min_y, max_y) = (a.1.min(b.1), a.1.max(b.1));
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if filled || x == min_x || x == max_x || y == min_y || y == max_y {
                put(out, x, y, color);
            }
        }
    }
}

fn draw_ellipse(out: &mut RgbaImage, a: (i32, i32), b: (i32, i32), color: Rgba<u8>, filled: bool) {
    let (min_x, max_x) = (a.0.min(b.0), a.0.max(b.0));
    let (min_y, max_y) = (a.1.min(b.1), a.1.max(b.1));
    let cx = (min_x + max_x) as f32 / 2.0;
    let cy = (min_y + max_y) as f32 / 2.0;
    let rx = ((max_x - min_x) as f32 / 2.0).max(0.5);
    let ry = ((max_y - min_y) as f32 / 2.0).max(0.5);
    let inside = |x: i32, y: i32| {
        let dx = (x as f32 - cx) / rx;
        let dy = (y as f32 - cy) / ry;
        dx * dx + dy * dy <= 1.0
    };
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if !inside(x, y) {
                continue;
            }
            // Outline: an inside pixel with at least one outside neighbor.
            let on_ring = !inside(x - 1, y) || !inside(x + 1, y) || !inside(x, y - 1) || !inside(x, y + 1);
            if filled || on_ring {
                put(out, x, y, color);
            }
        }
    }
}

/// Bresenham line.
fn draw_line(out: &mut RgbaImage, a: (i32, i32), b: (i32, i32), color: Rgba<u8>) {
    let (mut x, mut y) = a;
    let dx = (b.0 - a.0).abs();
    let dy = -(b.1 - a.1).abs();
    let sx = if a.0 < b.0 { 1 } else { -1 };
    let sy = if a.1 < b.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(out, x, y, color);
        if x == b.0 && y == b.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn filled_rectangle_covers_span() {
        let img = rasterize_shape(ShapeKind::Rectangle, (1, 1), (3, 2), RED, true, 5, 5);
        for y in 1..=2 {
            for x in 1..=3 {
                assert_eq!(*img.get_pixel(x, y), RED);
            }
        }
        assert_eq!(*img.get_pixel(0, 0), CLEAR);
        assert_eq!(*img.get_pixel(4, 4), CLEAR);
    }

    #[test]
    fn outline_rectangle_has_hollow_center() {
        let img = rasterize_shape(ShapeKind::Rectangle, (0, 0), (4, 4), RED, false, 5, 5);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(2, 0), RED);
        assert_eq!(*img.get_pixel(2, 2), CLEAR);
    }

    #[test]
    fn rectangle_clips_to_canvas() {
        let img = rasterize_shape(ShapeKind::Rectangle, (-3, -3), (2, 2), RED, true, 4, 4);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(*img.get_pixel(3, 3), CLEAR);
    }

    #[test]
    fn corners_may_be_given_in_any_order() {
        let a = rasterize_shape(ShapeKind::Rectangle, (3, 2), (1, 1), RED, true, 5, 5);
        let b = rasterize_shape(ShapeKind::Rectangle, (1, 1), (3, 2), RED, true, 5, 5);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn filled_ellipse_inside_and_outside() {
        let img = rasterize_shape(ShapeKind::Ellipse, (0, 0), (8, 8), RED, true, 9, 9);
        assert_eq!(*img.get_pixel(4, 4), RED); // center
        assert_eq!(*img.get_pixel(0, 0), CLEAR); // corner outside the disc
    }

    #[test]
    fn outline_ellipse_is_hollow() {
        let img = rasterize_shape(ShapeKind::Ellipse, (0, 0), (8, 8), RED, false, 9, 9);
        assert_eq!(*img.get_pixel(4, 4), CLEAR);
        assert_eq!(*img.get_pixel(4, 0), RED); // top of the ring
    }

    #[test]
    fn line_connects_endpoints() {
        let img = rasterize_shape(ShapeKind::Line, (0, 0), (4, 4), RED, false, 5, 5);
        for i in 0..5 {
            assert_eq!(*img.get_pixel(i, i), RED);
        }
    }
}
