//! Transformable clipboard — a floating sub-image staged above the canvas.
//!
//! The clipboard holds a canvas-sized RGBA image, the list of local
//! coordinates that belong to it, and a drag offset.  The effective canvas
//! position of a pixel is its local coordinate plus the offset.  Content is
//! staged here by copy/cut, the shape and text tools, or a drag pickup, and
//! is merged ("dumped") into a layer when the staging ends.
//!
//! States: Empty → Populated → {Dragging | Resizing} → Populated (commit)
//! → Dumped → Empty.
//!
//! Documented limitation: pixels that move outside the original image
//! bounds while a drag is committed are dropped from the pixel list — there
//! is no off-canvas buffer.

use std::sync::Mutex;

use image::{Rgba, RgbaImage};

use crate::canvas::blend_over;
use crate::selection::{PixelRect, SelectionMask};

/// Handle edge length in view pixels; divided by the zoom factor when hit
/// testing so handles keep a constant on-screen size.
pub const HANDLE_SIZE: f32 = 10.0;

// ---------------------------------------------------------------------------
//  Process-wide clipboard value
// ---------------------------------------------------------------------------

/// A plain clipboard value: image plus the local coordinates it covers.
/// Shared across all open documents, always copied by value so no canvas
/// aliases another's buffers.
#[derive(Clone)]
pub struct ClipboardContents {
    pub image: RgbaImage,
    pub pixels: Vec<(u32, u32)>,
}

static PROCESS_CLIPBOARD: Mutex<Option<ClipboardContents>> = Mutex::new(None);

pub fn set_process_clipboard(contents: ClipboardContents) {
    if let Ok(mut slot) = PROCESS_CLIPBOARD.lock() {
        *slot = Some(contents);
    }
}

pub fn get_process_clipboard() -> Option<ClipboardContents> {
    PROCESS_CLIPBOARD.lock().ok().and_then(|slot| slot.clone())
}

pub fn has_process_clipboard() -> bool {
    PROCESS_CLIPBOARD
        .lock()
        .map(|slot| slot.is_some())
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
//  Resize handles
// ---------------------------------------------------------------------------

/// The 8 resize handles: 4 corners + 4 edge midpoints of the content
/// bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub fn all() -> &'static [ResizeHandle] {
        &[
            ResizeHandle::TopLeft,
            ResizeHandle::Top,
            ResizeHandle::TopRight,
            ResizeHandle::Right,
            ResizeHandle::BottomRight,
            ResizeHandle::Bottom,
            ResizeHandle::BottomLeft,
            ResizeHandle::Left,
        ]
    }

    /// Anchor position of this handle on a bounding box, canvas coords.
    pub fn anchor(&self, rect: &PixelRect) -> (f32, f32) {
        let left = rect.min_x as f32;
        let right = rect.max_x as f32 + 1.0;
        let top = rect.min_y as f32;
        let bottom = rect.max_y as f32 + 1.0;
        let mid_x = (left + right) / 2.0;
        let mid_y = (top + bottom) / 2.0;
        match self {
            ResizeHandle::TopLeft => (left, top),
            ResizeHandle::Top => (mid_x, top),
            ResizeHandle::TopRight => (right, top),
            ResizeHandle::Right => (right, mid_y),
            ResizeHandle::BottomRight => (right, bottom),
            ResizeHandle::Bottom => (mid_x, bottom),
            ResizeHandle::BottomLeft => (left, bottom),
            ResizeHandle::Left => (left, mid_y),
        }
    }
}

// ---------------------------------------------------------------------------
//  TransformableClipboard
// ---------------------------------------------------------------------------

struct DragState {
    origin: (i32, i32),
    base_offset: (i32, i32),
}

struct ResizeState {
    handle: ResizeHandle,
    start_rect: PixelRect,
    rect: PixelRect,
    /// Pre-resize image content, resampled on every movement.
    image_snapshot: RgbaImage,
    /// Pre-resize companion mask: selected-but-fully-transparent pixels
    /// rendered opaque, so resampling does not lose them.
    mask_snapshot: RgbaImage,
}

pub struct TransformableClipboard {
    image: RgbaImage,
    pixels: Vec<(u32, u32)>,
    drag_offset: (i32, i32),
    drag: Option<DragState>,
    resize: Option<ResizeState>,
}

impl Clone for TransformableClipboard {
    /// Snapshots clone only the durable state; an in-flight drag or resize
    /// is transient and never part of a history entry.
    fn clone(&self) -> Self {
        Self {
            image: self.image.clone(),
            pixels: self.pixels.clone(),
            drag_offset: self.drag_offset,
            drag: None,
            resize: None,
        }
    }
}

impl TransformableClipboard {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            pixels: Vec::new(),
            drag_offset: (0, 0),
            drag: None,
            resize: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel_list(&self) -> &[(u32, u32)] {
        &self.pixels
    }

    pub fn drag_offset(&self) -> (i32, i32) {
        self.drag_offset
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }

    /// Back to the Empty state.
    pub fn clear(&mut self) {
        let (w, h) = self.image.dimensions();
        self.image = RgbaImage::new(w, h);
        self.pixels.clear();
        self.drag_offset = (0, 0);
        self.drag = None;
        self.resize = None;
    }

    /// Restore durable state from a history snapshot.
    pub fn restore(&mut self, image: RgbaImage, pixels: Vec<(u32, u32)>, offset: (i32, i32)) {
        self.image = image;
        self.pixels = pixels;
        self.drag_offset = offset;
        self.drag = None;
        self.resize = None;
    }

    // ---- population ---------------------------------------------------------

    /// Populate from the selected pixels of a layer: a same-size transparent
    /// image holding only the selected colors, and a pixel list equal to the
    /// selection's coordinate list.  Selected pixels that are fully
    /// transparent stay in the list with alpha 0.
    pub fn generate_from(&mut self, layer_image: &RgbaImage, mask: &SelectionMask) {
        let (w, h) = layer_image.dimensions();
        let mut image = RgbaImage::new(w, h);
        let mut pixels = Vec::with_capacity(mask.len());
        for (x, y) in mask.iter() {
            if x < w && y < h {
                image.put_pixel(x, y, *layer_image.get_pixel(x, y));
                pixels.push((x, y));
            }
        }
        self.image = image;
        self.pixels = pixels;
        self.drag_offset = (0, 0);
        self.drag = None;
        self.resize = None;
    }

    /// Populate from a full image (text/shape preview path); the pixel list
    /// is every pixel with non-zero alpha.
    pub fn set_image(&mut self, image: RgbaImage) {
        let mut pixels = Vec::new();
        for (x, y, px) in image.enumerate_pixels() {
            if px.0[3] > 0 {
                pixels.push((x, y));
            }
        }
        self.image = image;
        self.pixels = pixels;
        self.drag_offset = (0, 0);
        self.drag = None;
        self.resize = None;
    }

    /// Install process-clipboard contents (paste).
    pub fn set_contents(&mut self, contents: ClipboardContents) {
        self.image = contents.image;
        self.pixels = contents.pixels;
        self.drag_offset = (0, 0);
        self.drag = None;
        self.resize = None;
    }

    /// Snapshot the durable state as a process-clipboard value.
    pub fn contents(&self) -> ClipboardContents {
        ClipboardContents {
            image: self.image.clone(),
            pixels: self.pixels.clone(),
        }
    }

    // ---- dragging ------------------------------------------------------------

    pub fn start_drag(&mut self, origin: (i32, i32)) {
        if self.is_empty() {
            return;
        }
        self.drag = Some(DragState {
            origin,
            base_offset: self.drag_offset,
        });
    }

    /// Accumulate the drag offset.  The stored image is not touched until
    /// the drag is committed.
    pub fn do_drag(&mut self, point: (i32, i32)) {
        if let Some(drag) = &self.drag {
            self.drag_offset = (
                drag.base_offset.0 + (point.0 - drag.origin.0),
                drag.base_offset.1 + (point.1 - drag.origin.1),
            );
        }
    }

    // ---- resizing ------------------------------------------------------------

    /// Bounding box of the clipboard content (all listed pixels, including
    /// selected-but-transparent ones), in local coordinates.  The drag
    /// offset does not apply: it is always zero when handles are hit,
    /// since a committed drag bakes the offset into the pixel list.
    pub fn bounding_box(&self) -> Option<PixelRect> {
        let mut it = self.pixels.iter();
        let &(x0, y0) = it.next()?;
        let mut rect = PixelRect::new(x0, y0, x0, y0);
        for &(x, y) in it {
            rect.min_x = rect.min_x.min(x);
            rect.min_y = rect.min_y.min(y);
            rect.max_x = rect.max_x.max(x);
            rect.max_y = rect.max_y.max(y);
        }
        Some(rect)
    }

    /// Hit test the 8 handles.  A handle is grabbed when `point` lies
    /// within half the handle size (inverse-scaled by zoom, so handles keep
    /// their on-screen size) of its anchor.
    pub fn hit_handle(&self, point: (f32, f32), zoom: f32) -> Option<ResizeHandle> {
        let rect = self.bounding_box()?;
        let radius = HANDLE_SIZE / zoom.max(0.01) / 2.0;
        for handle in ResizeHandle::all() {
            let (ax, ay) = handle.anchor(&rect);
            if (point.0 - ax).abs() <= radius && (point.1 - ay).abs() <= radius {
                return Some(*handle);
            }
        }
        None
    }

    /// Grab a handle: snapshot the image and the zero-alpha companion mask,
    /// both resampled from on every subsequent movement.
    pub fn begin_resize(&mut self, handle: ResizeHandle) {
        let Some(rect) = self.bounding_box() else {
            return;
        };
        let (w, h) = self.image.dimensions();
        let mut mask = RgbaImage::new(w, h);
        for &(x, y) in &self.pixels {
            if self.image.get_pixel(x, y).0[3] == 0 {
                // Rendered opaque purely so resampling keeps the position.
                mask.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        self.resize = Some(ResizeState {
            handle,
            start_rect: rect,
            rect,
            image_snapshot: self.image.clone(),
            mask_snapshot: mask,
        });
    }

    /// Move the grabbed handle to `point`.  The handle-specific rule moves
    /// only that handle's edges of the working rectangle and never inverts
    /// it; both images are then resampled from the pre-resize snapshots.
    pub fn resize_to(&mut self, point: (i32, i32)) {
        let (w, h) = self.image.dimensions();
        let Some(state) = &mut self.resize else {
            return;
        };
        let px = point.0.clamp(0, w as i32 - 1) as u32;
        let py = point.1.clamp(0, h as i32 - 1) as u32;
        let rect = &mut state.rect;
        match state.handle {
            ResizeHandle::Left => rect.min_x = px.min(rect.max_x),
            ResizeHandle::Right => rect.max_x = px.max(rect.min_x),
            ResizeHandle::Top => rect.min_y = py.min(rect.max_y),
            ResizeHandle::Bottom => rect.max_y = py.max(rect.min_y),
            ResizeHandle::TopLeft => {
                rect.min_x = px.min(rect.max_x);
                rect.min_y = py.min(rect.max_y);
            }
            ResizeHandle::TopRight => {
                rect.max_x = px.max(rect.min_x);
                rect.min_y = py.min(rect.max_y);
            }
            ResizeHandle::BottomLeft => {
                rect.min_x = px.min(rect.max_x);
                rect.max_y = py.max(rect.min_y);
            }
            ResizeHandle::BottomRight => {
                rect.max_x = px.max(rect.min_x);
                rect.max_y = py.max(rect.min_y);
            }
        }
        self.resample_from_snapshot();
    }

    /// Nearest-neighbor resample of both snapshots into the working
    /// rectangle; the pixel list becomes the union of opaque-in-image and
    /// opaque-in-mask positions.
    fn resample_from_snapshot(&mut self) {
        let Some(state) = &self.resize else {
            return;
        };
        let (w, h) = self.image.dimensions();
        let src = state.start_rect;
        let dst = state.rect;
        let src_w = src.width() as f32;
        let src_h = src.height() as f32;
        let dst_w = dst.width() as f32;
        let dst_h = dst.height() as f32;

        let mut image = RgbaImage::new(w, h);
        let mut pixels = Vec::new();
        for ty in dst.min_y..=dst.max_y {
            let sy = src.min_y + (((ty - dst.min_y) as f32 + 0.5) * src_h / dst_h) as u32;
            let sy = sy.min(src.max_y);
            for tx in dst.min_x..=dst.max_x {
                let sx = src.min_x + (((tx - dst.min_x) as f32 + 0.5) * src_w / dst_w) as u32;
                let sx = sx.min(src.max_x);
                let color = *state.image_snapshot.get_pixel(sx, sy);
                let masked = state.mask_snapshot.get_pixel(sx, sy).0[3] > 0;
                if color.0[3] > 0 {
                    image.put_pixel(tx, ty, color);
                    pixels.push((tx, ty));
                } else if masked {
                    pixels.push((tx, ty));
                }
            }
        }
        self.image = image;
        self.pixels = pixels;
    }

    // ---- commit / dump -------------------------------------------------------

    /// Finalize the active drag or resize into a freshly baked image and
    /// pixel list, resetting transient state.  Returns whether a finalize
    /// occurred (a drag that never moved or a resize that never changed the
    /// rectangle is not a finalize, so callers skip the history entry).
    pub fn complete_operation(&mut self) -> bool {
        if let Some(_drag) = self.drag.take() {
            if self.drag_offset == (0, 0) {
                return false;
            }
            self.bake_offset();
            return true;
        }
        if let Some(state) = self.resize.take() {
            return state.rect != state.start_rect;
        }
        false
    }

    /// Translate the image by the drag offset and reset it to zero.  Pixels
    /// that land outside the image bounds are dropped from the list.
    fn bake_offset(&mut self) {
        let (dx, dy) = self.drag_offset;
        let (w, h) = self.image.dimensions();
        let mut image = RgbaImage::new(w, h);
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for &(x, y) in &self.pixels {
            let tx = x as i32 + dx;
            let ty = y as i32 + dy;
            if tx < 0 || ty < 0 || tx >= w as i32 || ty >= h as i32 {
                continue;
            }
            let (tx, ty) = (tx as u32, ty as u32);
            image.put_pixel(tx, ty, *self.image.get_pixel(x, y));
            pixels.push((tx, ty));
        }
        self.image = image;
        self.pixels = pixels;
        self.drag_offset = (0, 0);
    }

    /// Merge the clipboard into `target` at the current drag offset.
    /// Listed pixels with content are composited; listed pixels that are
    /// fully transparent explicitly clear the destination (a moved cutout
    /// leaves a hole rather than stale layer content).  Returns whether
    /// anything was dumped — `false` means the caller must not record
    /// history.  A successful dump empties the clipboard.
    pub fn dump_image(&mut self, target: &mut RgbaImage) -> bool {
        if self.is_empty() {
            return false;
        }
        let (w, h) = target.dimensions();
        let (dx, dy) = self.drag_offset;
        let mut dumped = false;
        for &(x, y) in &self.pixels {
            let tx = x as i32 + dx;
            let ty = y as i32 + dy;
            if tx < 0 || ty < 0 || tx >= w as i32 || ty >= h as i32 {
                continue;
            }
            let (tx, ty) = (tx as u32, ty as u32);
            let src = *self.image.get_pixel(x, y);
            if src.0[3] == 0 {
                target.put_pixel(tx, ty, Rgba([0, 0, 0, 0]));
            } else {
                let dst = target.get_pixel_mut(tx, ty);
                *dst = blend_over(*dst, src);
            }
            dumped = true;
        }
        if dumped {
            self.clear();
        }
        dumped
    }

    /// Draw the clipboard as a preview overlay (render path): content
    /// pixels composite at the drag offset, transparent listed pixels are
    /// left alone.
    pub fn overlay_onto(&self, target: &mut RgbaImage) {
        let (w, h) = target.dimensions();
        let (dx, dy) = self.drag_offset;
        for &(x, y) in &self.pixels {
            let src = *self.image.get_pixel(x, y);
            if src.0[3] == 0 {
                continue;
            }
            let tx = x as i32 + dx;
            let ty = y as i32 + dy;
            if tx < 0 || ty < 0 || tx >= w as i32 || ty >= h as i32 {
                continue;
            }
            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            *dst = blend_over(*dst, src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn mask_with(pixels: &[(u32, u32)], w: u32, h: u32) -> SelectionMask {
        let mut mask = SelectionMask::new(w, h);
        mask.add_pixels(pixels);
        mask
    }

    #[test]
    fn generate_copies_only_selected_pixels() {
        let mut layer = RgbaImage::from_pixel(4, 4, BLUE);
        layer.put_pixel(1, 1, RED);
        let mask = mask_with(&[(1, 1), (2, 2)], 4, 4);
        let mut clip = TransformableClipboard::new(4, 4);
        clip.generate_from(&layer, &mask);
        assert_eq!(clip.pixel_list(), &[(1, 1), (2, 2)]);
        assert_eq!(*clip.image().get_pixel(1, 1), RED);
        assert_eq!(*clip.image().get_pixel(2, 2), BLUE);
        assert_eq!(*clip.image().get_pixel(0, 0), CLEAR);
    }

    #[test]
    fn generate_keeps_transparent_selected_pixels_in_list() {
        let layer = RgbaImage::new(4, 4); // fully transparent
        let mask = mask_with(&[(0, 0), (1, 0)], 4, 4);
        let mut clip = TransformableClipboard::new(4, 4);
        clip.generate_from(&layer, &mask);
        assert_eq!(clip.pixel_list().len(), 2);
        assert!(!clip.is_empty());
    }

    #[test]
    fn set_image_lists_nonzero_alpha_only() {
        let mut img = RgbaImage::new(3, 3);
        img.put_pixel(0, 0, RED);
        img.put_pixel(2, 2, Rgba([0, 0, 0, 1]));
        let mut clip = TransformableClipboard::new(3, 3);
        clip.set_image(img);
        assert_eq!(clip.pixel_list(), &[(0, 0), (2, 2)]);
    }

    #[test]
    fn drag_accumulates_offset_without_touching_image() {
        let mut img = RgbaImage::new(4, 4);
        img.put_pixel(0, 0, RED);
        let mut clip = TransformableClipboard::new(4, 4);
        clip.set_image(img);
        clip.start_drag((1, 1));
        clip.do_drag((3, 2));
        assert_eq!(clip.drag_offset(), (2, 1));
        assert_eq!(*clip.image().get_pixel(0, 0), RED);
        clip.do_drag((2, 4));
        assert_eq!(clip.drag_offset(), (1, 3));
    }

    #[test]
    fn complete_drag_bakes_translation() {
        let mut img = RgbaImage::new(4, 4);
        img.put_pixel(0, 0, RED);
        let mut clip = TransformableClipboard::new(4, 4);
        clip.set_image(img);
        clip.start_drag((0, 0));
        clip.do_drag((2, 1));
        assert!(clip.complete_operation());
        assert_eq!(clip.drag_offset(), (0, 0));
        assert_eq!(clip.pixel_list(), &[(2, 1)]);
        assert_eq!(*clip.image().get_pixel(2, 1), RED);
        assert_eq!(*clip.image().get_pixel(0, 0), CLEAR);
    }

    #[test]
    fn complete_drag_drops_offcanvas_pixels() {
        let mut img = RgbaImage::new(4, 4);
        img.put_pixel(0, 0, RED);
        img.put_pixel(3, 3, BLUE);
        let mut clip = TransformableClipboard::new(4, 4);
        clip.set_image(img);
        clip.start_drag((0, 0));
        clip.do_drag((-2, -2));
        assert!(clip.complete_operation());
        // (0,0) moved to (-2,-2) — dropped; (3,3) moved to (1,1).
        assert_eq!(clip.pixel_list(), &[(1, 1)]);
        assert_eq!(*clip.image().get_pixel(1, 1), BLUE);
    }

    #[test]
    fn zero_move_drag_is_not_a_finalize() {
        let mut img = RgbaImage::new(4, 4);
        img.put_pixel(0, 0, RED);
        let mut clip = TransformableClipboard::new(4, 4);
        clip.set_image(img);
        clip.start_drag((1, 1));
        assert!(!clip.complete_operation());
        assert!(!clip.is_dragging());
    }

    #[test]
    fn dump_composites_and_punches_holes() {
        // Clipboard generated from a selection covering one red pixel and
        // one transparent pixel, dragged by (1, 0).
        let mut layer = RgbaImage::new(4, 4);
        layer.put_pixel(0, 0, RED);
        let mask = mask_with(&[(0, 0), (0, 1)], 4, 4);
        let mut clip = TransformableClipboard::new(4, 4);
        clip.generate_from(&layer, &mask);
        clip.start_drag((0, 0));
        clip.do_drag((1, 0));

        let mut target = RgbaImage::from_pixel(4, 4, BLUE);
        assert!(clip.dump_image(&mut target));
        assert_eq!(*target.get_pixel(1, 0), RED); // content composited
        assert_eq!(*target.get_pixel(1, 1), CLEAR); // hole punched
        assert_eq!(*target.get_pixel(0, 0), BLUE); // unlisted untouched
        assert!(clip.is_empty());
    }

    #[test]
    fn dump_empty_returns_false() {
        let mut clip = TransformableClipboard::new(4, 4);
        let mut target = RgbaImage::new(4, 4);
        assert!(!clip.dump_image(&mut target));
    }

    #[test]
    fn hit_handle_scales_with_zoom() {
        let mut img = RgbaImage::new(20, 20);
        for y in 5..10 {
            for x in 5..10 {
                img.put_pixel(x, y, RED);
            }
        }
        let mut clip = TransformableClipboard::new(20, 20);
        clip.set_image(img);
        // bbox = (5,5)-(9,9): left=5, right=10, mid=7.5.  At zoom 4 the grab
        // radius is 10/4/2 = 1.25 canvas pixels.
        assert_eq!(clip.hit_handle((5.0, 5.0), 4.0), Some(ResizeHandle::TopLeft));
        assert_eq!(clip.hit_handle((7.5, 5.0), 4.0), Some(ResizeHandle::Top));
        assert_eq!(clip.hit_handle((10.0, 7.5), 4.0), Some(ResizeHandle::Right));
        // 2px from any anchor at zoom 4 — no hit; at zoom 1 (radius 5) it grabs.
        assert_eq!(clip.hit_handle((3.0, 5.0), 4.0), None);
        assert_eq!(clip.hit_handle((3.0, 5.0), 1.0), Some(ResizeHandle::TopLeft));
    }

    #[test]
    fn resize_right_edge_stretches_content() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(2, 2, RED);
        img.put_pixel(3, 2, BLUE);
        let mut clip = TransformableClipboard::new(10, 10);
        clip.set_image(img);
        // bbox = (2,2)-(3,2); drag the right edge out to x=7.
        clip.begin_resize(ResizeHandle::Right);
        clip.resize_to((7, 2));
        assert!(clip.is_resizing());
        let rect = clip.bounding_box().unwrap();
        assert_eq!((rect.min_x, rect.max_x), (2, 7));
        // Left half red, right half blue after nearest resample.
        assert_eq!(*clip.image().get_pixel(2, 2), RED);
        assert_eq!(*clip.image().get_pixel(7, 2), BLUE);
        assert!(clip.complete_operation());
    }

    #[test]
    fn resize_never_inverts_rectangle() {
        let mut img = RgbaImage::new(10, 10);
        for x in 2..=5 {
            img.put_pixel(x, 3, RED);
        }
        let mut clip = TransformableClipboard::new(10, 10);
        clip.set_image(img);
        clip.begin_resize(ResizeHandle::Right);
        clip.resize_to((0, 3)); // crossed past the left edge
        let rect = clip.bounding_box().unwrap();
        assert!(rect.min_x <= rect.max_x);
        assert_eq!(rect.max_x, rect.min_x); // clamped to the opposite edge
    }

    #[test]
    fn resize_preserves_zero_alpha_selected_pixels() {
        // Selection over a transparent region: pixels carry alpha 0 but must
        // survive a resize via the companion mask.
        let layer = RgbaImage::new(10, 10);
        let mut mask = SelectionMask::new(10, 10);
        mask.add_rect(crate::selection::PixelRect::new(2, 2, 3, 3));
        let mut clip = TransformableClipboard::new(10, 10);
        clip.generate_from(&layer, &mask);
        clip.begin_resize(ResizeHandle::BottomRight);
        clip.resize_to((7, 7));
        assert!(!clip.is_empty());
        let rect = clip.bounding_box().unwrap();
        assert_eq!((rect.max_x, rect.max_y), (7, 7));
        assert!(clip.complete_operation());
    }

    #[test]
    fn unchanged_resize_is_not_a_finalize() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(2, 2, RED);
        let mut clip = TransformableClipboard::new(10, 10);
        clip.set_image(img);
        clip.begin_resize(ResizeHandle::Right);
        assert!(!clip.complete_operation());
    }

    #[test]
    fn process_clipboard_copies_by_value() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, RED);
        set_process_clipboard(ClipboardContents {
            image: img,
            pixels: vec![(0, 0)],
        });
        assert!(has_process_clipboard());
        let mut copy = get_process_clipboard().unwrap();
        copy.image.put_pixel(0, 0, BLUE);
        // Mutating the copy must not affect the stored value.
        let again = get_process_clipboard().unwrap();
        assert_eq!(*again.image.get_pixel(0, 0), RED);
    }
}
