//! Tool dispatch and editor orchestration.
//!
//! The `Editor` owns one canvas plus its history and routes pointer events
//! to the active tool.  Every parameter a tool needs (color, brush,
//! sensitivity, font, zoom, modifier flags) arrives in the `ToolContext`
//! snapshot passed with the event; the core holds no UI state of its own.
//!
//! A history snapshot is recorded after every completed action that
//! actually changed state: stroke release, selection release, fill press,
//! clipboard finalize/dump, structural layer changes, confirmed effects.

use image::{Rgba, RgbaImage};

use crate::canvas::CanvasState;
use crate::components::context::{BrushShape, EditorHooks, ToolContext};
use crate::components::history::{CanvasSnapshot, HistorySnapshotManager};
use crate::log_warn;
use crate::ops::clipboard::{ClipboardContents, get_process_clipboard, set_process_clipboard};
use crate::ops::effects::{EffectKind, EffectSession};
use crate::ops::{fill, shapes, text};
use crate::selection::PixelRect;

/// The closed tool set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Paint,
    Erase,
    Select,
    SpreadSelect,
    Bucket,
    ColorPicker,
    Pan,
    Drag,
    Shape,
    Text,
}

pub struct Editor {
    pub state: CanvasState,
    pub history: HistorySnapshotManager,
    pub hooks: EditorHooks,
    active_tool: Tool,
    effects: EffectSession,
    /// A paint/erase stroke is in progress (press seen, release pending).
    stroke_active: bool,
    select_anchor: Option<(i32, i32)>,
    pending_rect: Option<PixelRect>,
    shape_anchor: Option<(i32, i32)>,
    text_origin: Option<(i32, i32)>,
}

impl Editor {
    pub fn new(width: u32, height: u32) -> Self {
        let state = CanvasState::new(width, height);
        let mut history = HistorySnapshotManager::new();
        // Baseline entry so the very first action can be undone.
        history.record(CanvasSnapshot::capture(&state));
        Self {
            state,
            history,
            hooks: EditorHooks::default(),
            active_tool: Tool::default(),
            effects: EffectSession::new(),
            stroke_active: false,
            select_anchor: None,
            pending_rect: None,
            shape_anchor: None,
            text_origin: None,
        }
    }

    /// Adopt a loaded canvas (loader path), resetting history to it.
    pub fn install_canvas(&mut self, state: CanvasState) {
        let size = (state.width, state.height);
        self.state = state;
        self.history = HistorySnapshotManager::new();
        self.history.record(CanvasSnapshot::capture(&self.state));
        self.effects = EffectSession::new();
        self.stroke_active = false;
        self.select_anchor = None;
        self.pending_rect = None;
        self.shape_anchor = None;
        self.text_origin = None;
        self.hooks.emit_layers_changed();
        self.hooks.emit_canvas_size(size);
    }

    pub fn active_tool(&self) -> Tool {
        self.active_tool
    }

    fn record_history(&mut self) {
        self.history.record(CanvasSnapshot::capture(&self.state));
    }

    fn emit_selection_size(&self) {
        let size = self
            .state
            .selection
            .bounding_box()
            .map(|bb| (bb.width(), bb.height()))
            .unwrap_or((0, 0));
        self.hooks.emit_selection_size(size);
    }

    // ---- tool switching ------------------------------------------------------

    /// Switch the active tool, running the leave-cleanup rules:
    /// leaving Drag/Shape/Text dumps the staged clipboard into the active
    /// layer (history only if the dump had effect); leaving Select
    /// collapses the pending rectangle and clears the selection unless
    /// entering SpreadSelect or Drag (selection chaining).
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.active_tool {
            return;
        }
        match self.active_tool {
            Tool::Drag | Tool::Shape | Tool::Text => {
                self.dump_clipboard();
                self.shape_anchor = None;
                self.text_origin = None;
            }
            Tool::Select => {
                self.select_anchor = None;
                self.pending_rect = None;
                if !matches!(tool, Tool::SpreadSelect | Tool::Drag)
                    && self.state.selection.contains_any()
                {
                    self.state.selection.clear();
                    self.emit_selection_size();
                }
            }
            _ => {}
        }
        self.stroke_active = false;
        self.active_tool = tool;
    }

    /// Merge the staged clipboard into the active layer.  Records history
    /// only when the dump actually wrote something.
    pub fn dump_clipboard(&mut self) {
        let CanvasState {
            layers,
            clipboard,
            active_layer_index,
            ..
        } = &mut self.state;
        let Some(layer) = layers.get_mut(*active_layer_index) else {
            return;
        };
        if clipboard.dump_image(&mut layer.pixels) {
            self.record_history();
        }
    }

    // ---- pointer events ------------------------------------------------------

    pub fn pointer_pressed(&mut self, pos: (i32, i32), ctx: &ToolContext) {
        match self.active_tool {
            Tool::Paint => {
                self.stroke_active = true;
                self.stamp(pos, ctx.color, ctx);
            }
            Tool::Erase => {
                self.stroke_active = true;
                self.stamp(pos, Rgba([0, 0, 0, 0]), ctx);
            }
            Tool::Select => {
                self.select_anchor = Some(pos);
                self.pending_rect = clamp_rect(pos, pos, self.state.width, self.state.height);
            }
            Tool::SpreadSelect => self.spread_select_at(pos, ctx),
            Tool::Bucket => self.bucket_fill_at(pos, ctx),
            Tool::ColorPicker => {
                if let Some(seed) = self.canvas_coord(pos) {
                    let flat = self.state.composite();
                    self.hooks.emit_color_picked(*flat.get_pixel(seed.0, seed.1));
                }
            }
            Tool::Pan => {} // the view transform is the caller's concern
            Tool::Drag => self.drag_pressed(pos, ctx),
            Tool::Shape => self.shape_anchor = Some(pos),
            Tool::Text => self.text_origin = Some(pos),
        }
    }

    pub fn pointer_moved(&mut self, pos: (i32, i32), ctx: &ToolContext) {
        self.hooks.emit_pointer_moved(pos);
        match self.active_tool {
            Tool::Paint if self.stroke_active => self.stamp(pos, ctx.color, ctx),
            Tool::Erase if self.stroke_active => self.stamp(pos, Rgba([0, 0, 0, 0]), ctx),
            Tool::Select => {
                if let Some(anchor) = self.select_anchor {
                    self.pending_rect =
                        clamp_rect(anchor, pos, self.state.width, self.state.height);
                }
            }
            Tool::Drag => {
                if self.state.clipboard.is_resizing() {
                    self.state.clipboard.resize_to(pos);
                } else if self.state.clipboard.is_dragging() {
                    self.state.clipboard.do_drag(pos);
                }
            }
            Tool::Shape => {
                if let Some(anchor) = self.shape_anchor {
                    let preview = shapes::rasterize_shape(
                        ctx.shape_kind,
                        anchor,
                        pos,
                        ctx.color,
                        ctx.shape_filled,
                        self.state.width,
                        self.state.height,
                    );
                    self.state.clipboard.set_image(preview);
                }
            }
            _ => {}
        }
    }

    pub fn pointer_released(&mut self, _pos: (i32, i32), _ctx: &ToolContext) {
        match self.active_tool {
            Tool::Paint | Tool::Erase => {
                if self.stroke_active {
                    self.stroke_active = false;
                    self.record_history();
                }
            }
            Tool::Select => {
                let changed = match self.pending_rect.take() {
                    Some(rect) => {
                        let before = self.state.selection.len();
                        self.state.selection.add_rect(rect);
                        self.state.selection.len() != before
                    }
                    None => false,
                };
                self.select_anchor = None;
                if changed {
                    self.record_history();
                    self.emit_selection_size();
                }
            }
            Tool::Drag => {
                if self.state.clipboard.complete_operation() {
                    self.record_history();
                }
            }
            Tool::Shape => {
                self.shape_anchor = None;
                if !self.state.clipboard.is_empty() {
                    // Preview stays staged until the next action/tool change.
                    self.record_history();
                }
            }
            _ => {}
        }
    }

    /// The in-progress selection rectangle, for marquee rendering.
    pub fn pending_selection_rect(&self) -> Option<PixelRect> {
        self.pending_rect
    }

    // ---- per-tool actions ----------------------------------------------------

    fn canvas_coord(&self, pos: (i32, i32)) -> Option<(u32, u32)> {
        if pos.0 < 0
            || pos.1 < 0
            || pos.0 >= self.state.width as i32
            || pos.1 >= self.state.height as i32
        {
            return None;
        }
        Some((pos.0 as u32, pos.1 as u32))
    }

    /// Stamp the brush footprint centered on `pos` with `color`
    /// (overwriting, so the erase stamp punches transparency).
    fn stamp(&mut self, pos: (i32, i32), color: Rgba<u8>, ctx: &ToolContext) {
        let size = ctx.brush_size.max(1) as i32;
        let half = size / 2;
        let index = self.state.active_layer_index;
        let Some(layer) = self.state.layers.get_mut(index) else {
            return;
        };
        let (w, h) = (self.state.width as i32, self.state.height as i32);
        let radius = size as f32 / 2.0;
        let center = (pos.0 as f32, pos.1 as f32);
        for dy in 0..size {
            for dx in 0..size {
                let x = pos.0 - half + dx;
                let y = pos.1 - half + dy;
                if x < 0 || y < 0 || x >= w || y >= h {
                    continue;
                }
                if ctx.brush_shape == BrushShape::Ellipse {
                    let ex = x as f32 - center.0;
                    let ey = y as f32 - center.1;
                    if ex * ex + ey * ey > radius * radius {
                        continue;
                    }
                }
                layer.pixels.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    fn bucket_fill_at(&mut self, pos: (i32, i32), ctx: &ToolContext) {
        let Some(seed) = self.canvas_coord(pos) else {
            return;
        };
        let index = self.state.active_layer_index;
        let Some(layer) = self.state.layers.get_mut(index) else {
            return;
        };
        if fill::bucket_fill(&mut layer.pixels, seed, ctx.sensitivity, ctx.color) {
            self.record_history();
        }
    }

    fn spread_select_at(&mut self, pos: (i32, i32), ctx: &ToolContext) {
        let Some(seed) = self.canvas_coord(pos) else {
            return;
        };
        let Some(layer) = self.state.layers.get(self.state.active_layer_index) else {
            return;
        };
        let base = ctx.additive_select.then_some(&self.state.selection);
        let grown = fill::spread_select(&layer.pixels, seed, ctx.sensitivity, base);
        let changed = grown.pixel_list() != self.state.selection.pixel_list();
        self.state.selection = grown;
        if changed {
            self.record_history();
            self.emit_selection_size();
        }
    }

    /// Drag press: an empty clipboard picks up the current selection
    /// (blanking the source pixels); otherwise the press grabs a resize
    /// handle when one is hit, else starts a move.
    fn drag_pressed(&mut self, pos: (i32, i32), ctx: &ToolContext) {
        if self.state.clipboard.is_empty() {
            if !self.state.selection.contains_any() {
                return;
            }
            let CanvasState {
                layers,
                clipboard,
                selection,
                active_layer_index,
                ..
            } = &mut self.state;
            let Some(layer) = layers.get_mut(*active_layer_index) else {
                return;
            };
            clipboard.generate_from(&layer.pixels, selection);
            for (x, y) in selection.iter() {
                layer.pixels.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
            selection.clear();
            self.emit_selection_size();
            self.state.clipboard.start_drag(pos);
        } else if let Some(handle) = self
            .state
            .clipboard
            .hit_handle((pos.0 as f32, pos.1 as f32), ctx.zoom)
        {
            self.state.clipboard.begin_resize(handle);
        } else {
            self.state.clipboard.start_drag(pos);
        }
    }

    /// Rasterize `text` at the anchored origin into the clipboard preview.
    pub fn place_text(&mut self, content: &str, ctx: &ToolContext) {
        let Some(font) = &ctx.font else {
            log_warn!("place_text: no font supplied in context");
            return;
        };
        if content.is_empty() {
            return;
        }
        let origin = self.text_origin.unwrap_or((0, 0));
        let preview = text::rasterize_text(
            font,
            content,
            ctx.font_size,
            origin,
            ctx.color,
            self.state.width,
            self.state.height,
        );
        self.state.clipboard.set_image(preview);
        self.record_history();
    }

    // ---- selection-scoped edits ---------------------------------------------

    /// Delete key: make the selected pixels transparent and drop the
    /// selection.
    pub fn delete_selection(&mut self) {
        if !self.state.selection.contains_any() {
            return;
        }
        self.state.delete_selected_pixels();
        self.state.selection.clear();
        self.record_history();
        self.emit_selection_size();
    }

    // ---- process clipboard ---------------------------------------------------

    /// Copy the selected pixels of the active layer to the process-wide
    /// clipboard.  Returns whether anything was copied.
    pub fn copy_selection(&mut self) -> bool {
        if !self.state.selection.contains_any() {
            return false;
        }
        let Some(layer) = self.state.layers.get(self.state.active_layer_index) else {
            return false;
        };
        let (w, h) = layer.pixels.dimensions();
        let mut image = RgbaImage::new(w, h);
        let mut pixels = Vec::with_capacity(self.state.selection.len());
        for (x, y) in self.state.selection.iter() {
            image.put_pixel(x, y, *layer.pixels.get_pixel(x, y));
            pixels.push((x, y));
        }
        set_process_clipboard(ClipboardContents { image, pixels });
        true
    }

    /// Cut = copy + delete.
    pub fn cut_selection(&mut self) -> bool {
        if !self.copy_selection() {
            return false;
        }
        self.delete_selection();
        true
    }

    /// Stage the process-clipboard contents for dragging.  Contents from a
    /// differently-sized canvas are clipped to this one.  Any staged
    /// preview is dumped into the active layer first, as on a tool switch.
    pub fn paste(&mut self) -> bool {
        let Some(contents) = get_process_clipboard() else {
            return false;
        };
        self.set_tool(Tool::Drag);
        self.dump_clipboard();
        let (w, h) = (self.state.width, self.state.height);
        let mut image = RgbaImage::new(w, h);
        let mut pixels = Vec::with_capacity(contents.pixels.len());
        for &(x, y) in &contents.pixels {
            if x < w && y < h && x < contents.image.width() && y < contents.image.height() {
                image.put_pixel(x, y, *contents.image.get_pixel(x, y));
                pixels.push((x, y));
            }
        }
        if pixels.is_empty() {
            return false;
        }
        self.state.clipboard.set_contents(ClipboardContents { image, pixels });
        self.record_history();
        true
    }

    // ---- effects -------------------------------------------------------------

    /// One adjustment within an effect session (scoped to the selection
    /// when one exists).  The first call snapshots the pristine layer.
    pub fn apply_effect(&mut self, kind: EffectKind) -> bool {
        self.effects.apply(&mut self.state, kind)
    }

    pub fn effect_session_active(&self) -> bool {
        self.effects.is_active()
    }

    /// Keep the previewed effect and record history.
    pub fn confirm_effect(&mut self) {
        if self.effects.confirm() {
            self.record_history();
        }
    }

    /// Abandon the previewed effect, restoring the pristine layer.
    pub fn cancel_effect(&mut self) {
        self.effects.cancel(&mut self.state);
    }

    // ---- structural layer operations ----------------------------------------

    pub fn add_layer(&mut self, name: impl Into<String>) {
        self.state.add_layer(name);
        self.record_history();
        self.hooks.emit_layers_changed();
    }

    pub fn delete_layer(&mut self, index: usize) {
        let before = self.state.layers.len();
        self.state.delete_layer(index);
        if self.state.layers.len() != before {
            self.record_history();
            self.hooks.emit_layers_changed();
        }
    }

    pub fn move_layer(&mut self, from: usize, to: usize) {
        self.state.move_layer(from, to);
        self.record_history();
        self.hooks.emit_layers_changed();
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) {
        self.state.rename_layer(index, name);
        self.hooks.emit_layers_changed();
    }

    pub fn set_layer_enabled(&mut self, index: usize, enabled: bool) {
        self.state.set_layer_enabled(index, enabled);
        self.record_history();
        self.hooks.emit_layers_changed();
    }

    pub fn merge_down(&mut self, index: usize) {
        let before = self.state.layers.len();
        self.state.merge_down(index);
        if self.state.layers.len() != before {
            self.record_history();
            self.hooks.emit_layers_changed();
        }
    }

    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.state.resize(width, height);
        self.record_history();
        self.hooks.emit_canvas_size((self.state.width, self.state.height));
    }

    // ---- history -------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        snapshot.restore_into(&mut self.state);
        self.hooks.emit_layers_changed();
        self.emit_selection_size();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        snapshot.restore_into(&mut self.state);
        self.hooks.emit_layers_changed();
        self.emit_selection_size();
        true
    }
}

/// Clamp two arbitrary drag corners to an in-bounds pixel rectangle.
/// `None` when the span misses the canvas entirely.
fn clamp_rect(a: (i32, i32), b: (i32, i32), width: u32, height: u32) -> Option<PixelRect> {
    if width == 0 || height == 0 {
        return None;
    }
    let min_x = a.0.min(b.0);
    let min_y = a.1.min(b.1);
    let max_x = a.0.max(b.0);
    let max_y = a.1.max(b.1);
    if max_x < 0 || max_y < 0 || min_x >= width as i32 || min_y >= height as i32 {
        return None;
    }
    Some(PixelRect::new(
        min_x.max(0) as u32,
        min_y.max(0) as u32,
        max_x.min(width as i32 - 1) as u32,
        max_y.min(height as i32 - 1) as u32,
    ))
}
