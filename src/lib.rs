//! rasterkit — the editing core of a raster paint program.
//!
//! A multi-layer RGBA canvas, a pixel-precise selection engine,
//! color-similarity region growth (bucket fill, spread-select), a
//! transformable clipboard staged before merging into a layer, and a
//! bounded undo/redo history of full-state snapshots.
//!
//! The crate is headless: parameter dialogs, window chrome and
//! device-input mapping are external collaborators.  All parameters a
//! tool needs arrive through a [`components::context::ToolContext`]
//! value, and state changes fan out through plain callback hooks.

pub mod canvas;
pub mod components;
pub mod io;
pub mod logger;
pub mod ops;
pub mod project;
pub mod selection;
pub mod view;

pub use canvas::{CanvasState, Layer};
pub use components::context::{BrushShape, EditorHooks, ToolContext};
pub use components::history::{CanvasSnapshot, HistorySnapshotManager};
pub use components::tools::{Editor, Tool};
pub use ops::clipboard::TransformableClipboard;
pub use project::Document;
pub use selection::{PixelRect, SelectionMask};
pub use view::ViewTransform;
