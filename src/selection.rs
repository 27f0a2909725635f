//! Pixel-precise selection mask.
//!
//! A boolean grid plus an insertion-ordered list of the selected
//! coordinates.  The two are kept in lock-step: a cell is `true` in the
//! grid iff its coordinate appears exactly once in the list.  The list
//! preserves insertion order so operations that walk the selection (fills,
//! clipboard generation, history snapshots) are deterministic.

/// Inclusive axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl PixelRect {
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Build from two arbitrary corners (any order).
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Side of a selected pixel on which a border edge should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// One border edge of the selection outline, in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderEdge {
    pub x: u32,
    pub y: u32,
    pub side: EdgeSide,
}

/// Selection mask over a `width × height` canvas.
#[derive(Clone)]
pub struct SelectionMask {
    width: u32,
    height: u32,
    grid: Vec<bool>,
    pixels: Vec<(u32, u32)>,
}

impl SelectionMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            grid: vec![false; (width as usize) * (height as usize)],
            pixels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Whether (x, y) is selected.  Out-of-bounds coordinates are never
    /// selected and the query has no side effect.
    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.grid[self.index(x, y)]
    }

    /// Mark a single in-bounds pixel selected.  Idempotent: a pixel that is
    /// already selected is not appended to the list a second time.
    pub fn add_pixel(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        if !self.grid[idx] {
            self.grid[idx] = true;
            self.pixels.push((x, y));
        }
    }

    /// Mark every in-bounds cell within `rect` selected.
    pub fn add_rect(&mut self, rect: PixelRect) {
        let max_x = rect.max_x.min(self.width.saturating_sub(1));
        let max_y = rect.max_y.min(self.height.saturating_sub(1));
        if rect.min_x > max_x || rect.min_y > max_y || self.width == 0 || self.height == 0 {
            return;
        }
        for y in rect.min_y..=max_y {
            for x in rect.min_x..=max_x {
                self.add_pixel(x, y);
            }
        }
    }

    /// Set union with another mask.
    pub fn add_mask(&mut self, other: &SelectionMask) {
        for &(x, y) in &other.pixels {
            self.add_pixel(x, y);
        }
    }

    /// Set union with an explicit coordinate list.
    pub fn add_pixels(&mut self, list: &[(u32, u32)]) {
        for &(x, y) in list {
            self.add_pixel(x, y);
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.grid.fill(false);
        self.pixels.clear();
    }

    /// Discard all state and adopt new dimensions.  Required whenever the
    /// canvas dimensions change.
    pub fn clear_and_resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.grid = vec![false; (width as usize) * (height as usize)];
        self.pixels.clear();
    }

    pub fn contains_any(&self) -> bool {
        !self.pixels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Selected coordinates in insertion order, each exactly once.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pixels.iter().copied()
    }

    /// The raw coordinate list (insertion order).
    pub fn pixel_list(&self) -> &[(u32, u32)] {
        &self.pixels
    }

    /// Bounding box of the selected pixels, if any.
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

    /// Border edges for outline rendering: for each selected pixel, one edge
    /// on every side whose neighbor is unselected or off-grid.  Recomputed
    /// from scratch on each call — the outline is cheap relative to a
    /// composite pass and caching it invites staleness.
    pub fn border_edges(&self) -> Vec<BorderEdge> {
        let mut edges = Vec::new();
        for &(x, y) in &self.pixels {
            if y == 0 || !self.is_selected(x, y - 1) {
                edges.push(BorderEdge { x, y, side: EdgeSide::Top });
            }
            if !self.is_selected(x, y + 1) {
                edges.push(BorderEdge { x, y, side: EdgeSide::Bottom });
            }
            if x == 0 || !self.is_selected(x - 1, y) {
                edges.push(BorderEdge { x, y, side: EdgeSide::Left });
            }
            if !self.is_selected(x + 1, y) {
                edges.push(BorderEdge { x, y, side: EdgeSide::Right });
            }
        }
        edges
    }
}
