//! Layer effects and the multi-step preview session.
//!
//! Every effect recomputes from a pristine backup of the active layer
//! captured on the first adjustment of the session (never from its own
//! previous output), so dragging a slider back and forth cannot compound.
//! Confirm discards the backup (the caller records history); cancel
//! restores it.  Effects scope to the current selection when one exists,
//! else the whole layer.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::canvas::{CanvasState, blend_over};
use crate::ops::fill::channels_match;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    fn index(&self) -> usize {
        match self {
            ColorChannel::Red => 0,
            ColorChannel::Green => 1,
            ColorChannel::Blue => 2,
        }
    }
}

/// One effect adjustment with its parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectKind {
    Brightness(i32),
    Contrast(i32),
    ChannelLimit(ColorChannel, u8),
    Grayscale,
    Invert,
    HueSaturation { hue_shift: f32, saturation: f32 },
    Multipliers { r: f32, g: f32, b: f32 },
    /// Edge pixels in `color` (black when `color` is white), everything
    /// else white; replaces the layer.
    Sketch { color: Rgba<u8>, sensitivity: u8 },
    /// Edge pixels in `color` over the unmodified original.
    Outline { color: Rgba<u8>, sensitivity: u8 },
}

// ---------------------------------------------------------------------------
//  Per-channel math
// ---------------------------------------------------------------------------

#[inline]
fn brightness_channel(c: u8, v: i32) -> u8 {
    (c as i32 + v).clamp(0, 255) as u8
}

/// Piecewise contrast around the 127 fixed point: positive `v` pushes
/// channels away from 127, negative pulls them toward it (never crossing).
#[inline]
fn contrast_channel(c: u8, v: i32) -> u8 {
    let c = c as i32;
    if c > 127 {
        if v > 0 {
            (c + v).min(255) as u8
        } else {
            (c + v).max(127) as u8
        }
    } else if c < 127 {
        if v > 0 {
            (c - v).max(0) as u8
        } else {
            (c - v).min(127) as u8
        }
    } else {
        127
    }
}

/// RGB (0-255) to HSL (h in degrees, s/l in 0-1).
fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        60.0 * (((g - b) / d) % 6.0)
    } else if max == g {
        60.0 * ((b - r) / d + 2.0)
    } else {
        60.0 * ((r - g) / d + 4.0)
    };
    (h.rem_euclid(360.0), s, l)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (
        ((r1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
        ((g1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
        ((b1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
//  Whole-image rendering
// ---------------------------------------------------------------------------

/// Apply a point operation to every pixel, row-parallel.  Alpha is
/// untouched by all point effects.
fn map_pixels(source: &RgbaImage, f: impl Fn(Rgba<u8>) -> Rgba<u8> + Sync) -> RgbaImage {
    let w = source.width() as usize;
    let mut out = source.clone();
    let stride = w * 4;
    out.as_mut().par_chunks_mut(stride).for_each(|row| {
        for x in 0..w {
            let o = x * 4;
            let px = Rgba([row[o], row[o + 1], row[o + 2], row[o + 3]]);
            row[o..o + 4].copy_from_slice(&f(px).0);
        }
    });
    out
}

/// Whether a pixel is an edge: ANY of its in-bounds 4-neighbors fails the
/// per-channel tolerance test (alpha included) against it.
fn is_edge(source: &RgbaImage, x: u32, y: u32, sensitivity: u8) -> bool {
    let (w, h) = source.dimensions();
    let here = *source.get_pixel(x, y);
    let neighbors = [
        (x.wrapping_add(1), y),
        (x.wrapping_sub(1), y),
        (x, y.wrapping_add(1)),
        (x, y.wrapping_sub(1)),
    ];
    for (nx, ny) in neighbors {
        if nx >= w || ny >= h {
            continue;
        }
        if !channels_match(here, *source.get_pixel(nx, ny), sensitivity) {
            return true;
        }
    }
    false
}

/// Sketch falls back to black when the drawing color is white, otherwise
/// edges would vanish against the white background.
fn sketch_color(color: Rgba<u8>) -> Rgba<u8> {
    if color.0[0] == 255 && color.0[1] == 255 && color.0[2] == 255 {
        Rgba([0, 0, 0, 255])
    } else {
        color
    }
}

/// Render `kind` applied to the whole of `source`.
pub fn render_effect(source: &RgbaImage, kind: EffectKind) -> RgbaImage {
    match kind {
        EffectKind::Brightness(v) => map_pixels(source, move |p| {
            Rgba([
                brightness_channel(p.0[0], v),
                brightness_channel(p.0[1], v),
                brightness_channel(p.0[2], v),
                p.0[3],
            ])
        }),
        EffectKind::Contrast(v) => map_pixels(source, move |p| {
            Rgba([
                contrast_channel(p.0[0], v),
                contrast_channel(p.0[1], v),
                contrast_channel(p.0[2], v),
                p.0[3],
            ])
        }),
        EffectKind::ChannelLimit(channel, limit) => {
            let i = channel.index();
            map_pixels(source, move |p| {
                let mut out = p.0;
                out[i] = out[i].min(limit);
                Rgba(out)
            })
        }
        EffectKind::Grayscale => map_pixels(source, |p| {
            let avg = ((p.0[0] as u32 + p.0[1] as u32 + p.0[2] as u32) / 3) as u8;
            Rgba([avg, avg, avg, p.0[3]])
        }),
        EffectKind::Invert => map_pixels(source, |p| {
            Rgba([255 - p.0[0], 255 - p.0[1], 255 - p.0[2], p.0[3]])
        }),
        EffectKind::HueSaturation { hue_shift, saturation } => map_pixels(source, move |p| {
            let (h, s, l) = rgb_to_hsl(p.0[0], p.0[1], p.0[2]);
            let (r, g, b) = hsl_to_rgb(h + hue_shift, (s * saturation).clamp(0.0, 1.0), l);
            Rgba([r, g, b, p.0[3]])
        }),
        EffectKind::Multipliers { r, g, b } => map_pixels(source, move |p| {
            Rgba([
                (p.0[0] as f32 * r).round().clamp(0.0, 255.0) as u8,
                (p.0[1] as f32 * g).round().clamp(0.0, 255.0) as u8,
                (p.0[2] as f32 * b).round().clamp(0.0, 255.0) as u8,
                p.0[3],
            ])
        }),
        EffectKind::Sketch { color, sensitivity } => {
            let (w, h) = source.dimensions();
            let ink = sketch_color(color);
            let mut out = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
            for y in 0..h {
                for x in 0..w {
                    if is_edge(source, x, y, sensitivity) {
                        out.put_pixel(x, y, ink);
                    }
                }
            }
            out
        }
        EffectKind::Outline { color, sensitivity } => {
            let (w, h) = source.dimensions();
            let mut out = source.clone();
            for y in 0..h {
                for x in 0..w {
                    if is_edge(source, x, y, sensitivity) {
                        let dst = out.get_pixel_mut(x, y);
                        *dst = blend_over(*dst, color);
                    }
                }
            }
            out
        }
    }
}

// ---------------------------------------------------------------------------
//  EffectSession — the multi-step preview backup
// ---------------------------------------------------------------------------

/// Holds the pristine copy of the active layer for the duration of a
/// multi-adjustment effect session.
#[derive(Default)]
pub struct EffectSession {
    backup: Option<RgbaImage>,
}

impl EffectSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.backup.is_some()
    }

    /// Apply `kind` to the active layer, recomputing from the pristine
    /// backup (captured lazily on the first adjustment).  Scoped to the
    /// selection when one exists.  Returns false when there is no active
    /// layer to work on.
    pub fn apply(&mut self, state: &mut CanvasState, kind: EffectKind) -> bool {
        let index = state.active_layer_index;
        let Some(layer) = state.layers.get_mut(index) else {
            return false;
        };
        let source = self
            .backup
            .get_or_insert_with(|| layer.pixels.clone())
            .clone();
        let rendered = render_effect(&source, kind);
        if state.selection.contains_any() {
            // Only selected pixels take the effect; the rest revert to the
            // pristine backup so earlier previews do not linger.
            let mut out = source;
            for (x, y) in state.selection.iter() {
                if x < out.width() && y < out.height() {
                    out.put_pixel(x, y, *rendered.get_pixel(x, y));
                }
            }
            layer.pixels = out;
        } else {
            layer.pixels = rendered;
        }
        true
    }

    /// Keep the previewed result.  Returns whether a session was active —
    /// the caller records history exactly then.
    pub fn confirm(&mut self) -> bool {
        self.backup.take().is_some()
    }

    /// Restore the pristine layer image and end the session.
    pub fn cancel(&mut self, state: &mut CanvasState) -> bool {
        let Some(backup) = self.backup.take() else {
            return false;
        };
        let index = state.active_layer_index;
        if let Some(layer) = state.layers.get_mut(index) {
            layer.pixels = backup;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::PixelRect;

    fn flat(color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(3, 3, color)
    }

    #[test]
    fn contrast_spec_values() {
        // contrast(+50): R=200 -> 250, R=50 -> 0.
        assert_eq!(contrast_channel(200, 50), 250);
        assert_eq!(contrast_channel(50, 50), 0);
        // 127 is a fixed point either way.
        assert_eq!(contrast_channel(127, 80), 127);
        assert_eq!(contrast_channel(127, -80), 127);
        // Negative v pulls toward 127 without crossing it.
        assert_eq!(contrast_channel(200, -50), 150);
        assert_eq!(contrast_channel(200, -100), 127);
        assert_eq!(contrast_channel(50, -50), 100);
        assert_eq!(contrast_channel(50, -100), 127);
    }

    #[test]
    fn brightness_clamps() {
        assert_eq!(brightness_channel(200, 100), 255);
        assert_eq!(brightness_channel(50, -100), 0);
        assert_eq!(brightness_channel(100, 20), 120);
    }

    #[test]
    fn grayscale_averages_and_keeps_alpha() {
        let out = render_effect(&flat(Rgba([30, 60, 90, 200])), EffectKind::Grayscale);
        assert_eq!(*out.get_pixel(0, 0), Rgba([60, 60, 60, 200]));
    }

    #[test]
    fn invert_flips_channels_not_alpha() {
        let out = render_effect(&flat(Rgba([0, 100, 255, 128])), EffectKind::Invert);
        assert_eq!(*out.get_pixel(1, 1), Rgba([255, 155, 0, 128]));
    }

    #[test]
    fn channel_limit_caps_one_channel() {
        let out = render_effect(
            &flat(Rgba([200, 200, 50, 255])),
            EffectKind::ChannelLimit(ColorChannel::Red, 100),
        );
        assert_eq!(*out.get_pixel(0, 0), Rgba([100, 200, 50, 255]));
    }

    #[test]
    fn multipliers_scale_and_clamp() {
        let out = render_effect(
            &flat(Rgba([100, 100, 200, 255])),
            EffectKind::Multipliers { r: 0.5, g: 2.0, b: 2.0 },
        );
        assert_eq!(*out.get_pixel(0, 0), Rgba([50, 200, 255, 255]));
    }

    #[test]
    fn hue_rotation_is_stable_for_gray() {
        let out = render_effect(
            &flat(Rgba([80, 80, 80, 255])),
            EffectKind::HueSaturation { hue_shift: 120.0, saturation: 1.0 },
        );
        // Gray has no saturation; rotation must not invent color.
        assert_eq!(*out.get_pixel(0, 0), Rgba([80, 80, 80, 255]));
    }

    #[test]
    fn sketch_marks_color_boundaries() {
        let mut img = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
        for y in 0..2 {
            img.put_pixel(2, y, Rgba([255, 255, 255, 255]));
            img.put_pixel(3, y, Rgba([255, 255, 255, 255]));
        }
        let red = Rgba([255, 0, 0, 255]);
        let out = render_effect(&img, EffectKind::Sketch { color: red, sensitivity: 10 });
        // Columns 1 and 2 straddle the boundary — edges in the ink color.
        assert_eq!(*out.get_pixel(1, 0), red);
        assert_eq!(*out.get_pixel(2, 0), red);
        // Interior columns become white.
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*out.get_pixel(3, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn sketch_with_white_ink_falls_back_to_black() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        let out = render_effect(
            &img,
            EffectKind::Sketch { color: Rgba([255, 255, 255, 255]), sensitivity: 0 },
        );
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn outline_leaves_non_edges_untouched() {
        let img = flat(Rgba([10, 20, 30, 255]));
        let out = render_effect(
            &img,
            EffectKind::Outline { color: Rgba([255, 0, 0, 255]), sensitivity: 0 },
        );
        // Uniform image has no edges at all.
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn session_recomputes_from_pristine_backup() {
        let mut state = CanvasState::new(2, 2);
        state.layers[0].pixels = flat_sized(&mut state, Rgba([100, 100, 100, 255]));
        let mut session = EffectSession::new();
        assert!(session.apply(&mut state, EffectKind::Brightness(50)));
        assert_eq!(px(&state), Rgba([150, 150, 150, 255]));
        // A second adjustment must not compound on the first.
        assert!(session.apply(&mut state, EffectKind::Brightness(20)));
        assert_eq!(px(&state), Rgba([120, 120, 120, 255]));
        assert!(session.confirm());
        assert!(!session.is_active());
        assert_eq!(px(&state), Rgba([120, 120, 120, 255]));
    }

    #[test]
    fn session_cancel_restores_backup() {
        let mut state = CanvasState::new(2, 2);
        state.layers[0].pixels = flat_sized(&mut state, Rgba([100, 100, 100, 255]));
        let mut session = EffectSession::new();
        session.apply(&mut state, EffectKind::Invert);
        assert!(session.cancel(&mut state));
        assert_eq!(px(&state), Rgba([100, 100, 100, 255]));
        assert!(!session.cancel(&mut state)); // nothing left to cancel
    }

    #[test]
    fn session_scopes_to_selection() {
        let mut state = CanvasState::new(3, 3);
        state.layers[0].pixels = flat_sized(&mut state, Rgba([100, 100, 100, 255]));
        state.selection.add_rect(PixelRect::new(0, 0, 0, 0));
        let mut session = EffectSession::new();
        session.apply(&mut state, EffectKind::Invert);
        let layer = &state.layers[0].pixels;
        assert_eq!(*layer.get_pixel(0, 0), Rgba([155, 155, 155, 255]));
        assert_eq!(*layer.get_pixel(1, 1), Rgba([100, 100, 100, 255]));
    }

    fn flat_sized(state: &mut CanvasState, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(state.width, state.height, color)
    }

    fn px(state: &CanvasState) -> Rgba<u8> {
        *state.layers[0].pixels.get_pixel(0, 0)
    }
}
