//! Multi-layer canvas state.
//!
//! A canvas owns an ordered sequence of fixed-size RGBA layers (paint
//! order), the active-layer index, the selection mask and the staged
//! clipboard.  Invariants: the active index is valid whenever the layer
//! sequence is non-empty, and every layer image matches the canvas
//! dimensions exactly.

use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

use crate::ops::clipboard::TransformableClipboard;
use crate::selection::SelectionMask;
use crate::{log_info, log_warn};

/// Standard source-over blend of `src` onto `dst`.
pub(crate) fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src.0[3] as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = dst.0[3] as u32;
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let s = src.0[i] as u32;
        let d = dst.0[i] as u32;
        out[i] = ((s * sa + d * da * (255 - sa) / 255) / out_a) as u8;
    }
    out[3] = out_a as u8;
    Rgba(out)
}

/// One raster surface of the canvas.
#[derive(Clone)]
pub struct Layer {
    pub name: String,
    pub enabled: bool,
    pub pixels: RgbaImage,
}

impl Layer {
    pub fn new(name: impl Into<String>, width: u32, height: u32, fill: Rgba<u8>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            pixels: RgbaImage::from_pixel(width, height, fill),
        }
    }

    /// A fully transparent layer.
    pub fn transparent(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(name, width, height, Rgba([0, 0, 0, 0]))
    }
}

pub struct CanvasState {
    pub layers: Vec<Layer>,
    pub active_layer_index: usize,
    pub width: u32,
    pub height: u32,
    pub selection: SelectionMask,
    pub clipboard: TransformableClipboard,
}

impl CanvasState {
    /// A fresh canvas with a single white background layer.
    pub fn new(width: u32, height: u32) -> Self {
        let background = Layer::new("Background", width, height, Rgba([255, 255, 255, 255]));
        Self {
            layers: vec![background],
            active_layer_index: 0,
            width,
            height,
            selection: SelectionMask::new(width, height),
            clipboard: TransformableClipboard::new(width, height),
        }
    }

    /// Build a canvas around pre-existing layers (loader path).  Dimensions
    /// come from the first layer; callers must have verified that all
    /// layers agree.
    pub fn from_layers(layers: Vec<Layer>) -> Option<Self> {
        let first = layers.first()?;
        let (width, height) = first.pixels.dimensions();
        Some(Self {
            layers,
            active_layer_index: 0,
            width,
            height,
            selection: SelectionMask::new(width, height),
            clipboard: TransformableClipboard::new(width, height),
        })
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.get(self.active_layer_index)
    }

    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.get_mut(self.active_layer_index)
    }

    /// Clamp the active index back into range after a structural change.
    pub fn revalidate_active_index(&mut self) {
        if self.layers.is_empty() {
            self.active_layer_index = 0;
        } else if self.active_layer_index >= self.layers.len() {
            self.active_layer_index = self.layers.len() - 1;
        }
    }

    // ---- structural layer operations ---------------------------------------
    // Indices are assumed caller-validated but re-checked before mutation;
    // an invalid index logs a diagnostic and is a no-op.

    /// Append a new transparent layer and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>) {
        self.layers
            .push(Layer::transparent(name, self.width, self.height));
        self.active_layer_index = self.layers.len() - 1;
    }

    pub fn delete_layer(&mut self, index: usize) {
        if index >= self.layers.len() {
            log_warn!("delete_layer: index {} out of range", index);
            return;
        }
        self.layers.remove(index);
        self.revalidate_active_index();
    }

    /// Move a layer to a new position in paint order.
    pub fn move_layer(&mut self, from: usize, to: usize) {
        if from >= self.layers.len() || to >= self.layers.len() {
            log_warn!("move_layer: indices {} -> {} out of range", from, to);
            return;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        if self.active_layer_index == from {
            self.active_layer_index = to;
        }
        self.revalidate_active_index();
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) {
        match self.layers.get_mut(index) {
            Some(layer) => layer.name = name.into(),
            None => log_warn!("rename_layer: index {} out of range", index),
        }
    }

    pub fn set_layer_enabled(&mut self, index: usize, enabled: bool) {
        match self.layers.get_mut(index) {
            Some(layer) => layer.enabled = enabled,
            None => log_warn!("set_layer_enabled: index {} out of range", index),
        }
    }

    /// Merge layer `index` down onto the layer below it (source-over), then
    /// remove it.  The bottom layer cannot be merged down.
    pub fn merge_down(&mut self, index: usize) {
        if index == 0 || index >= self.layers.len() {
            log_warn!("merge_down: index {} out of range", index);
            return;
        }
        let upper = self.layers.remove(index);
        let lower = &mut self.layers[index - 1];
        for (x, y, src) in upper.pixels.enumerate_pixels() {
            let dst = lower.pixels.get_pixel_mut(x, y);
            *dst = blend_over(*dst, *src);
        }
        self.revalidate_active_index();
    }

    /// Rescale the canvas and every layer to new dimensions.  The selection
    /// is discarded (cleared and resized), as is the staged clipboard.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log_warn!("resize: rejected zero dimension {}x{}", width, height);
            return;
        }
        for layer in &mut self.layers {
            layer.pixels =
                imageops::resize(&layer.pixels, width, height, imageops::FilterType::Triangle);
        }
        self.width = width;
        self.height = height;
        self.selection.clear_and_resize(width, height);
        self.clipboard = TransformableClipboard::new(width, height);
        log_info!("canvas resized to {}x{}", width, height);
    }

    // ---- selection-scoped pixel operations ----------------------------------

    /// Make every selected pixel of the active layer fully transparent.
    pub fn delete_selected_pixels(&mut self) {
        let index = self.active_layer_index;
        let Some(layer) = self.layers.get_mut(index) else {
            return;
        };
        for (x, y) in self.selection.iter() {
            layer.pixels.put_pixel(x, y, Rgba([0, 0, 0, 0]));
        }
    }

    /// Overwrite every selected pixel of the active layer with `color`.
    pub fn fill_selected_pixels(&mut self, color: Rgba<u8>) {
        let index = self.active_layer_index;
        let Some(layer) = self.layers.get_mut(index) else {
            return;
        };
        for (x, y) in self.selection.iter() {
            layer.pixels.put_pixel(x, y, color);
        }
    }

    // ---- compositing ---------------------------------------------------------

    /// Composite the enabled layers in paint order over a transparent
    /// background.  Row-parallel.
    pub fn composite(&self) -> RgbaImage {
        let width = self.width;
        let mut out = RgbaImage::new(width, self.height);
        let enabled: Vec<&RgbaImage> = self
            .layers
            .iter()
            .filter(|l| l.enabled)
            .map(|l| &l.pixels)
            .collect();
        let stride = width as usize * 4;
        out.as_mut()
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width as usize {
                    let mut acc = Rgba([0, 0, 0, 0]);
                    for img in &enabled {
                        acc = blend_over(acc, *img.get_pixel(x as u32, y as u32));
                    }
                    row[x * 4..x * 4 + 4].copy_from_slice(&acc.0);
                }
            });
        out
    }

    /// Composite including the staged clipboard overlay at its drag offset.
    /// This is the image a render pass should display (the selection
    /// outline is drawn separately from `selection.border_edges()`).
    pub fn composite_with_overlay(&self) -> RgbaImage {
        let mut out = self.composite();
        self.clipboard.overlay_onto(&mut out);
        out
    }
}
