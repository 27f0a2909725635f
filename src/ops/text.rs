//! Text rasterization for the text tool.
//!
//! Lays out a (possibly multi-line) string with kerning and draws the
//! glyph coverage into a canvas-sized RGBA image, which the editor stages
//! as the clipboard preview.  The font itself is a collaborator input and
//! travels in the `ToolContext`.

use ab_glyph::{Font, FontArc, ScaleFont};
use image::{Rgba, RgbaImage};

/// Lay out a single line of text at `font_size`, returning positioned
/// glyph ids relative to an origin at the line's left baseline.
fn layout_line(font: &FontArc, text: &str, font_size: f32) -> Vec<(ab_glyph::GlyphId, f32)> {
    let scaled = font.as_scaled(font_size);
    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last: Option<ab_glyph::GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            cursor_x += scaled.kern(prev, id);
        }
        glyphs.push((id, cursor_x));
        cursor_x += scaled.h_advance(id);
        last = Some(id);
    }
    glyphs
}

/// Rasterize `text` into a transparent canvas-sized image.  `origin` is
/// the canvas position of the first line's left baseline start; `\n`
/// starts a new line one line-height down.  Coverage is blended into the
/// alpha channel of `color`.
pub fn rasterize_text(
    font: &FontArc,
    text: &str,
    font_size: f32,
    origin: (i32, i32),
    color: Rgba<u8>,
    canvas_w: u32,
    canvas_h: u32,
) -> RgbaImage {
    let mut out = RgbaImage::new(canvas_w, canvas_h);
    let scaled = font.as_scaled(font_size);
    let ascent = scaled.ascent();
    let line_height = scaled.height();

    for (line_idx, line) in text.split('\n').enumerate() {
        let baseline_y = origin.1 as f32 + ascent + line_idx as f32 * line_height;
        for (id, x_off) in layout_line(font, line, font_size) {
            let glyph = id.with_scale_and_position(
                font_size,
                ab_glyph::point(origin.0 as f32 + x_off, baseline_y),
            );
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= canvas_w as i32 || y >= canvas_h as i32 {
                    return;
                }
                let alpha = (coverage * color.0[3] as f32).round() as u8;
                if alpha == 0 {
                    return;
                }
                let dst = out.get_pixel_mut(x as u32, y as u32);
                // Keep the stronger coverage when glyphs overlap.
                if alpha > dst.0[3] {
                    *dst = Rgba([color.0[0], color.0[1], color.0[2], alpha]);
                }
            });
        }
    }
    out
}
