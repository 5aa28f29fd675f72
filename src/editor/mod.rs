//! Canvas facade: the command surface the application shell drives.

pub mod controller;
pub mod shapes;

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AppConfig, CanvasSize};
use crate::geometry::{Color, Point};
use crate::history::HistoryManager;
use crate::storage::{self, StorageError, StorageResult};
use crate::surface::{rasterize_outline, RasterSurface, BACKGROUND_COLOR};

pub use controller::{
    DrawContext, PointerEffect, ShapePreview, ToolController, ToolKind, ToolState,
};
pub use shapes::{MirroredBox, ShapeKind};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document has no path yet; save it under a name first")]
    NoDocumentPath,
    #[error("cannot {operation} while a drawing gesture is in progress")]
    GestureInProgress { operation: &'static str },
    #[error("background save worker exited without reporting")]
    SaveWorkerLost,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// One entry of the command surface, as read from a replay script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SelectTool {
        tool: ToolKind,
    },
    SetColor {
        color: Color,
    },
    SetThickness {
        thickness: i32,
    },
    SetFill {
        enabled: bool,
    },
    Undo,
    Redo,
    Clear,
    PointerDown {
        x: i32,
        y: i32,
    },
    PointerDrag {
        x: i32,
        y: i32,
    },
    PointerUp {
        x: i32,
        y: i32,
    },
    /// Without a path, saves to the remembered document path.
    Save {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Load {
        path: PathBuf,
    },
}

/// Save running on a worker thread. Hand it back to
/// [`Canvas::complete_save`] to collect the result.
#[derive(Debug)]
pub struct PendingSave {
    revision: u64,
    receiver: mpsc::Receiver<StorageResult<PathBuf>>,
}

#[derive(Debug)]
pub struct Canvas {
    surface: RasterSurface,
    history: HistoryManager,
    tools: ToolController,
    document_path: Option<PathBuf>,
    revision: u64,
    saved_revision: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_parts(RasterSurface::create(width, height), HistoryManager::new())
    }

    pub fn from_config(config: &AppConfig, size: CanvasSize) -> Self {
        let mut surface = RasterSurface::create(size.width, size.height);
        surface.set_color(config.default_color());
        surface.set_stroke_width(i32::from(config.default_thickness()));
        Self::with_parts(surface, HistoryManager::with_capacity(config.history_capacity()))
    }

    fn with_parts(surface: RasterSurface, history: HistoryManager) -> Self {
        tracing::debug!(
            width = surface.width(),
            height = surface.height(),
            history_capacity = history.capacity(),
            "canvas created"
        );
        Self {
            surface,
            history,
            tools: ToolController::new(),
            document_path: None,
            revision: 0,
            saved_revision: 0,
        }
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    pub fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    /// True when the buffer changed since the last successful save or load.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn ensure_idle(&self, operation: &'static str) -> DocumentResult<()> {
        if self.tools.state().is_gesture_active() {
            return Err(DocumentError::GestureInProgress { operation });
        }
        Ok(())
    }

    pub fn select_tool(&mut self, tool: ToolKind) {
        self.tools.select_tool(tool);
    }

    pub fn set_color(&mut self, color: Color) {
        self.surface.set_color(color);
        tracing::debug!(color = %color.to_hex(), "paint color changed");
    }

    /// Clamped to the supported stroke range.
    pub fn set_thickness(&mut self, thickness: i32) {
        self.surface.set_stroke_width(thickness);
        tracing::debug!(
            requested = thickness,
            effective = self.surface.paint().stroke_width,
            "stroke width changed"
        );
    }

    pub fn set_fill(&mut self, enabled: bool) {
        self.tools.set_fill_shapes(enabled);
    }

    pub fn undo(&mut self) -> bool {
        let applied = self.history.undo(&mut self.surface);
        if applied {
            self.tools.cancel_gesture();
            self.touch();
        }
        applied
    }

    pub fn redo(&mut self) -> bool {
        let applied = self.history.redo(&mut self.surface);
        if applied {
            self.tools.cancel_gesture();
            self.touch();
        }
        applied
    }

    /// Paints the whole buffer with the background color as one undoable edit.
    pub fn clear(&mut self) {
        self.tools.cancel_gesture();
        self.history.record_before_edit(&self.surface);
        self.surface.fill(BACKGROUND_COLOR);
        self.touch();
        tracing::debug!("canvas cleared");
    }

    pub fn pointer_down(&mut self, x: i32, y: i32) -> PointerEffect {
        let ctx = DrawContext {
            surface: &mut self.surface,
            history: &mut self.history,
        };
        let effect = self.tools.pointer_down(Point::new(x, y), ctx);
        if effect == PointerEffect::EditStarted {
            self.touch();
        }
        effect
    }

    pub fn pointer_drag(&mut self, x: i32, y: i32) -> PointerEffect {
        let ctx = DrawContext {
            surface: &mut self.surface,
            history: &mut self.history,
        };
        self.tools.pointer_drag(Point::new(x, y), ctx)
    }

    pub fn pointer_up(&mut self, x: i32, y: i32) -> PointerEffect {
        let ctx = DrawContext {
            surface: &mut self.surface,
            history: &mut self.history,
        };
        self.tools.pointer_up(Point::new(x, y), ctx)
    }

    /// Committed raster with the in-progress shape composited on top.
    pub fn render_preview(&self) -> RgbImage {
        let mut frame = self.surface.pixels().clone();
        if let Some(preview) = self.tools.preview(self.surface.paint()) {
            rasterize_outline(
                &mut frame,
                &preview.outline,
                preview.color,
                preview.thickness,
                preview.filled,
            );
        }
        frame
    }

    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> DocumentResult<()> {
        self.ensure_idle("save")?;
        let path = path.into();
        storage::save_image(self.surface.pixels(), &path)?;
        self.document_path = Some(path);
        self.saved_revision = self.revision;
        Ok(())
    }

    pub fn save(&mut self) -> DocumentResult<()> {
        let path = self
            .document_path
            .clone()
            .ok_or(DocumentError::NoDocumentPath)?;
        self.save_as(path)
    }

    /// Replaces the buffer with the decoded file, adopting its dimensions.
    /// The replacement is undoable; a failed decode changes nothing.
    pub fn load(&mut self, path: impl Into<PathBuf>) -> DocumentResult<()> {
        self.ensure_idle("load")?;
        let path = path.into();
        let pixels = storage::load_image(&path)?;

        self.history.record_before_edit(&self.surface);
        let resized = pixels.dimensions() != self.surface.dimensions();
        self.surface = RasterSurface::from_pixels(pixels, self.surface.paint());
        if resized {
            tracing::info!(
                width = self.surface.width(),
                height = self.surface.height(),
                "canvas resized to loaded image"
            );
        }
        self.touch();
        self.document_path = Some(path);
        self.saved_revision = self.revision;
        Ok(())
    }

    /// Starts encoding a copy of the current buffer on a worker thread.
    pub fn save_in_background(&self, path: impl Into<PathBuf>) -> DocumentResult<PendingSave> {
        self.ensure_idle("save")?;
        let receiver = storage::save_in_background(self.surface.pixels().clone(), path.into());
        Ok(PendingSave {
            revision: self.revision,
            receiver,
        })
    }

    /// Waits for a background save. On success the path is remembered, and
    /// the canvas is clean unless it was edited after the save started.
    pub fn complete_save(&mut self, pending: PendingSave) -> DocumentResult<PathBuf> {
        let path = pending
            .receiver
            .recv()
            .map_err(|_| DocumentError::SaveWorkerLost)??;
        self.document_path = Some(path.clone());
        self.saved_revision = pending.revision;
        Ok(path)
    }

    pub fn apply(&mut self, command: Command) -> DocumentResult<()> {
        match command {
            Command::SelectTool { tool } => self.select_tool(tool),
            Command::SetColor { color } => self.set_color(color),
            Command::SetThickness { thickness } => self.set_thickness(thickness),
            Command::SetFill { enabled } => self.set_fill(enabled),
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Clear => self.clear(),
            Command::PointerDown { x, y } => {
                self.pointer_down(x, y);
            }
            Command::PointerDrag { x, y } => {
                self.pointer_drag(x, y);
            }
            Command::PointerUp { x, y } => {
                self.pointer_up(x, y);
            }
            Command::Save { path: Some(path) } => self.save_as(path)?,
            Command::Save { path: None } => self.save()?,
            Command::Load { path } => self.load(path)?,
        }
        Ok(())
    }
}
