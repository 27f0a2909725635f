//! Single open document: one editor plus its view transform.
//!
//! Documents are fully independent of each other; the only state shared
//! between them is the process-wide clipboard value.  The editor (layers,
//! selection, clipboard, history) sits behind one lock and the view
//! transform behind another, so renders reading the zoom/pan never
//! contend with long pixel operations.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;

use crate::components::tools::Editor;
use crate::io;
use crate::view::ViewTransform;
use crate::{log_err, log_info};

/// Single open document.
pub struct Document {
    pub id: Uuid,
    /// `None` for unsaved/untitled documents.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,
    /// Display name (derived from path or "Untitled-X").
    pub name: String,
    editor: Mutex<Editor>,
    view: Mutex<ViewTransform>,
}

impl Document {
    pub fn new_untitled(untitled_counter: usize, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: None,
            is_dirty: false,
            name: format!("Untitled-{}", untitled_counter),
            editor: Mutex::new(Editor::new(width, height)),
            view: Mutex::new(ViewTransform::new()),
        }
    }

    /// Open a document from disk.  `None` on load failure — no partial
    /// document is ever produced.
    pub fn open(path: PathBuf) -> Option<Self> {
        let state = match io::load_any(&path) {
            Ok(state) => state,
            Err(e) => {
                log_err!("Failed to open {:?}: {}", path, e);
                return None;
            }
        };
        let name = file_display_name(&path);
        let mut editor = Editor::new(state.width, state.height);
        editor.install_canvas(state);
        log_info!("Opened {:?}", path);
        Some(Self {
            id: Uuid::new_v4(),
            path: Some(path),
            is_dirty: false,
            name,
            editor: Mutex::new(editor),
            view: Mutex::new(ViewTransform::new()),
        })
    }

    /// Run `f` against the locked editor.  `None` only when the lock is
    /// poisoned (a prior panic mid-edit).
    pub fn with_editor<R>(&self, f: impl FnOnce(&mut Editor) -> R) -> Option<R> {
        match self.editor.lock() {
            Ok(mut editor) => Some(f(&mut editor)),
            Err(_) => {
                log_err!("Editor lock poisoned for document '{}'", self.name);
                None
            }
        }
    }

    /// Run `f` against the locked view transform.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut ViewTransform) -> R) -> Option<R> {
        match self.view.lock() {
            Ok(mut view) => Some(f(&mut view)),
            Err(_) => {
                log_err!("View lock poisoned for document '{}'", self.name);
                None
            }
        }
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Display title (name with dirty indicator).
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Save the layered container to the document's path.  Logs and
    /// returns `false` when there is no path or the write fails.
    pub fn save(&mut self) -> bool {
        let Some(path) = self.path.clone() else {
            log_err!("Save requested for '{}' with no path", self.name);
            return false;
        };
        let result = self.with_editor(|editor| io::save_project(&editor.state, &path));
        match result {
            Some(Ok(())) => {
                self.mark_clean();
                true
            }
            Some(Err(e)) => {
                log_err!("Failed to save {:?}: {}", path, e);
                false
            }
            None => false,
        }
    }

    /// Save to a new path, adopting it as the document's path and name.
    pub fn save_as(&mut self, path: PathBuf) -> bool {
        self.name = file_display_name(&path);
        self.path = Some(path);
        self.save()
    }

    /// Export the flattened composite.  Success/failure is logged only.
    pub fn export(&self, path: &Path) -> bool {
        self.with_editor(|editor| io::export_flattened(&editor.state, path))
            .unwrap_or(false)
    }
}

fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rasterkit-doc-{}-{}", std::process::id(), name))
    }

    #[test]
    fn untitled_document_has_default_canvas() {
        let doc = Document::new_untitled(1, 16, 9);
        assert_eq!(doc.name, "Untitled-1");
        assert!(doc.path.is_none());
        let size = doc
            .with_editor(|e| (e.state.width, e.state.height))
            .unwrap();
        assert_eq!(size, (16, 9));
    }

    #[test]
    fn dirty_flag_decorates_title() {
        let mut doc = Document::new_untitled(2, 4, 4);
        assert_eq!(doc.display_title(), "Untitled-2");
        doc.mark_dirty();
        assert_eq!(doc.display_title(), "Untitled-2*");
        doc.mark_clean();
        assert_eq!(doc.display_title(), "Untitled-2");
    }

    #[test]
    fn save_as_then_open_round_trips() {
        let mut doc = Document::new_untitled(3, 5, 5);
        doc.with_editor(|e| {
            e.add_layer("Ink");
            e.state.layers[1].pixels.put_pixel(2, 2, Rgba([9, 8, 7, 255]));
        });
        doc.mark_dirty();
        let path = temp_path("roundtrip.rkl");
        assert!(doc.save_as(path.clone()));
        assert!(!doc.is_dirty);
        assert_eq!(doc.name, path.file_name().unwrap().to_string_lossy());

        let reopened = Document::open(path.clone()).unwrap();
        std::fs::remove_file(&path).ok();
        let pixel = reopened
            .with_editor(|e| {
                assert_eq!(e.state.layers.len(), 2);
                *e.state.layers[1].pixels.get_pixel(2, 2)
            })
            .unwrap();
        assert_eq!(pixel, Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn open_missing_file_yields_none() {
        assert!(Document::open(PathBuf::from("/nonexistent/missing.rkl")).is_none());
    }

    #[test]
    fn save_without_path_fails() {
        let mut doc = Document::new_untitled(4, 2, 2);
        assert!(!doc.save());
    }

    #[test]
    fn documents_have_independent_views() {
        let a = Document::new_untitled(5, 2, 2);
        let b = Document::new_untitled(6, 2, 2);
        a.with_view(|v| v.set_zoom(8.0));
        assert_eq!(b.with_view(|v| v.zoom).unwrap(), 1.0);
        assert_eq!(a.with_view(|v| v.zoom).unwrap(), 8.0);
    }
}
