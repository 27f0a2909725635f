//! Collaborator surface: the `ToolContext` value every operation receives
//! and the fire-and-forget notification hooks the core emits.
//!
//! The core never reaches into a parent object for the current color or
//! brush parameters — the caller snapshots them into a `ToolContext` per
//! call, keeping the editing core independent of any UI layer.

use ab_glyph::FontArc;
use image::Rgba;

use crate::ops::shapes::ShapeKind;

/// Footprint stamped by the paint and erase tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BrushShape {
    #[default]
    Rectangle,
    Ellipse,
}

/// Snapshot of the collaborator-supplied parameters for one operation.
#[derive(Clone)]
pub struct ToolContext {
    /// Current drawing color.
    pub color: Rgba<u8>,
    /// Brush edge length / diameter in canvas pixels.
    pub brush_size: u32,
    pub brush_shape: BrushShape,
    /// Per-channel region-growth tolerance; 0 = exact match.
    pub sensitivity: u8,
    pub shape_kind: ShapeKind,
    /// Filled shape versus 1-pixel outline.
    pub shape_filled: bool,
    /// Font for the text tool; `None` disables text placement.
    pub font: Option<FontArc>,
    pub font_size: f32,
    /// Whether the additive-selection modifier is held.
    pub additive_select: bool,
    /// Current view zoom, used to keep resize handles a constant
    /// on-screen size.
    pub zoom: f32,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            color: Rgba([0, 0, 0, 255]),
            brush_size: 8,
            brush_shape: BrushShape::default(),
            sensitivity: 0,
            shape_kind: ShapeKind::default(),
            shape_filled: true,
            font: None,
            font_size: 16.0,
            additive_select: false,
            zoom: 1.0,
        }
    }
}

type Hook<T> = Option<Box<dyn Fn(T) + Send>>;

/// Fire-and-forget notifications out of the core.  No return value is
/// ever consumed; unset hooks are simply skipped.
#[derive(Default)]
pub struct EditorHooks {
    pub on_layers_changed: Option<Box<dyn Fn() + Send>>,
    /// Width × height of the selection bounding box (0, 0 when empty).
    pub on_selection_size: Hook<(u32, u32)>,
    pub on_pointer_moved: Hook<(i32, i32)>,
    pub on_canvas_size: Hook<(u32, u32)>,
    /// ColorPicker result, pushed to the shared color collaborator.
    pub on_color_picked: Hook<Rgba<u8>>,
}

impl EditorHooks {
    pub fn emit_layers_changed(&self) {
        if let Some(hook) = &self.on_layers_changed {
            hook();
        }
    }

    pub fn emit_selection_size(&self, size: (u32, u32)) {
        if let Some(hook) = &self.on_selection_size {
            hook(size);
        }
    }

    pub fn emit_pointer_moved(&self, pos: (i32, i32)) {
        if let Some(hook) = &self.on_pointer_moved {
            hook(pos);
        }
    }

    pub fn emit_canvas_size(&self, size: (u32, u32)) {
        if let Some(hook) = &self.on_canvas_size {
            hook(size);
        }
    }

    pub fn emit_color_picked(&self, color: Rgba<u8>) {
        if let Some(hook) = &self.on_color_picked {
            hook(color);
        }
    }
}
