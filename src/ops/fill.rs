//! Color-similarity region growth: bucket fill and spread-select.
//!
//! Both tools share the same traversal skeleton — an explicit-stack
//! (non-recursive) flood from a seed coordinate.  The reference color is
//! read once from the seed pixel; a popped coordinate is rejected when out
//! of bounds or already visited, and accepted iff every channel (R, G, B
//! and A) of its pixel lies within ±sensitivity (inclusive) of the
//! reference channel.  Acceptance marks the pixel visited and pushes its
//! four edge-neighbors (no diagonals).  Worst case O(W×H).

use image::{Rgba, RgbaImage};

use crate::selection::SelectionMask;

/// Per-channel symmetric tolerance test, alpha included.
/// `sensitivity == 0` means exact match only.
#[inline]
pub fn channels_match(a: Rgba<u8>, b: Rgba<u8>, sensitivity: u8) -> bool {
    let s = sensitivity as i16;
    for i in 0..4 {
        if (a.0[i] as i16 - b.0[i] as i16).abs() > s {
            return false;
        }
    }
    true
}

/// Shared traversal bookkeeping for the two region-growth tools.
struct RegionGrowth {
    width: u32,
    height: u32,
    sensitivity: u8,
    reference: Rgba<u8>,
    visited: Vec<bool>,
    stack: Vec<(u32, u32)>,
}

impl RegionGrowth {
    fn new(image: &RgbaImage, seed: (u32, u32), sensitivity: u8) -> Option<Self> {
        let (width, height) = image.dimensions();
        if seed.0 >= width || seed.1 >= height {
            return None;
        }
        let reference = *image.get_pixel(seed.0, seed.1);
        let mut growth = Self {
            width,
            height,
            sensitivity,
            reference,
            visited: vec![false; (width as usize) * (height as usize)],
            stack: Vec::with_capacity(1024),
        };
        growth.stack.push(seed);
        Some(growth)
    }

    fn pop(&mut self) -> Option<(u32, u32)> {
        self.stack.pop()
    }

    /// Bounds + visited + similarity gate for a popped coordinate.  Does
    /// NOT mark visited — call `accept` once the caller commits to it.
    fn admits(&self, x: u32, y: u32, pixel: Rgba<u8>) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        if self.visited[y as usize * self.width as usize + x as usize] {
            return false;
        }
        channels_match(pixel, self.reference, self.sensitivity)
    }

    /// Mark visited and push the 4-connected neighbors.
    fn accept(&mut self, x: u32, y: u32) {
        self.visited[y as usize * self.width as usize + x as usize] = true;
        if y > 0 {
            self.stack.push((x, y - 1));
        }
        if x + 1 < self.width {
            self.stack.push((x + 1, y));
        }
        if y + 1 < self.height {
            self.stack.push((x, y + 1));
        }
        if x > 0 {
            self.stack.push((x - 1, y));
        }
    }
}

/// Bucket fill: recolor the color-similar region connected to `seed` with
/// `color`.  Pixels already exactly equal to `color` are skipped (neither
/// recolored nor traversed), which also makes a fill with the seed's own
/// color a no-op.  Returns whether any pixel changed.
pub fn bucket_fill(
    image: &mut RgbaImage,
    seed: (u32, u32),
    sensitivity: u8,
    color: Rgba<u8>,
) -> bool {
    let Some(mut growth) = RegionGrowth::new(image, seed, sensitivity) else {
        return false;
    };
    let mut changed = false;
    while let Some((x, y)) = growth.pop() {
        if x >= growth.width || y >= growth.height {
            continue;
        }
        let pixel = *image.get_pixel(x, y);
        if pixel == color || !growth.admits(x, y, pixel) {
            continue;
        }
        growth.accept(x, y);
        image.put_pixel(x, y, color);
        changed = true;
    }
    changed
}

/// Spread-select: grow a selection over the color-similar region connected
/// to `seed`, without mutating any pixel.  When `base` is given (additive
/// modifier held) the output mask starts as a copy of it, else empty.
pub fn spread_select(
    image: &RgbaImage,
    seed: (u32, u32),
    sensitivity: u8,
    base: Option<&SelectionMask>,
) -> SelectionMask {
    let (width, height) = image.dimensions();
    let mut mask = match base {
        Some(existing) => existing.clone(),
        None => SelectionMask::new(width, height),
    };
    let Some(mut growth) = RegionGrowth::new(image, seed, sensitivity) else {
        return mask;
    };
    while let Some((x, y)) = growth.pop() {
        if x >= growth.width || y >= growth.height {
            continue;
        }
        let pixel = *image.get_pixel(x, y);
        if !growth.admits(x, y, pixel) {
            continue;
        }
        growth.accept(x, y);
        mask.add_pixel(x, y);
    }
    mask
}
