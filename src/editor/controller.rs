use serde::{Deserialize, Serialize};

use super::shapes::ShapeKind;
use crate::geometry::{Color, Outline, Point};
use crate::history::HistoryManager;
use crate::surface::{PaintState, RasterSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[serde(alias = "freehand")]
    Pencil,
    Rectangle,
    Oval,
    RightTriangle,
    Triangle,
    Line,
    Diamond,
    Pentagon,
    Arrow,
}

impl ToolKind {
    pub const fn shape(self) -> Option<ShapeKind> {
        match self {
            Self::Pencil => None,
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Oval => Some(ShapeKind::Oval),
            Self::RightTriangle => Some(ShapeKind::RightTriangle),
            Self::Triangle => Some(ShapeKind::Triangle),
            Self::Line => Some(ShapeKind::Line),
            Self::Diamond => Some(ShapeKind::Diamond),
            Self::Pentagon => Some(ShapeKind::Pentagon),
            Self::Arrow => Some(ShapeKind::Arrow),
        }
    }

    pub const fn from_shape(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rectangle => Self::Rectangle,
            ShapeKind::Oval => Self::Oval,
            ShapeKind::RightTriangle => Self::RightTriangle,
            ShapeKind::Triangle => Self::Triangle,
            ShapeKind::Line => Self::Line,
            ShapeKind::Diamond => Self::Diamond,
            ShapeKind::Pentagon => Self::Pentagon,
            ShapeKind::Arrow => Self::Arrow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    /// `cursor` is the last point of the stroke in progress, if any.
    Freehand { cursor: Option<Point> },
    ShapeArmed(ShapeKind),
    ShapeDragging {
        kind: ShapeKind,
        anchor: Point,
        drag: Point,
    },
}

impl Default for ToolState {
    fn default() -> Self {
        Self::Freehand { cursor: None }
    }
}

impl ToolState {
    fn armed_for(tool: ToolKind) -> Self {
        match tool.shape() {
            Some(kind) => Self::ShapeArmed(kind),
            None => Self::Freehand { cursor: None },
        }
    }

    pub const fn tool(&self) -> ToolKind {
        match self {
            Self::Freehand { .. } => ToolKind::Pencil,
            Self::ShapeArmed(kind) | Self::ShapeDragging { kind, .. } => ToolKind::from_shape(*kind),
        }
    }

    pub const fn is_gesture_active(&self) -> bool {
        matches!(
            self,
            Self::Freehand { cursor: Some(_) } | Self::ShapeDragging { .. }
        )
    }
}

/// Mutable drawing targets handed to the controller for one pointer event.
pub struct DrawContext<'a> {
    pub surface: &'a mut RasterSurface,
    pub history: &'a mut HistoryManager,
}

/// What a pointer event did to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEffect {
    /// Snapshot recorded; a stroke or shape gesture began.
    EditStarted,
    /// A freehand segment was drawn into the buffer.
    Drew,
    /// Only the preview moved; the buffer is untouched.
    Previewed,
    /// The previewed shape was flattened into the buffer.
    Committed,
    NoAction,
}

/// In-progress shape, drawn as an overlay and never written to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePreview {
    pub kind: ShapeKind,
    pub outline: Outline,
    pub color: Color,
    pub thickness: u8,
    pub filled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ToolController {
    state: ToolState,
    fill_shapes: bool,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn active_tool(&self) -> ToolKind {
        self.state.tool()
    }

    pub fn fill_shapes(&self) -> bool {
        self.fill_shapes
    }

    pub fn set_fill_shapes(&mut self, fill_shapes: bool) {
        self.fill_shapes = fill_shapes;
    }

    /// Switches tools, dropping any gesture in progress without committing it.
    pub fn select_tool(&mut self, tool: ToolKind) {
        if self.state.is_gesture_active() {
            tracing::debug!(from = ?self.state, "tool switch detached in-progress gesture");
        }
        self.state = ToolState::armed_for(tool);
        tracing::debug!(?tool, "tool selected");
    }

    /// Abandons the current gesture but keeps the selected tool.
    pub fn cancel_gesture(&mut self) {
        self.state = ToolState::armed_for(self.state.tool());
    }

    pub fn pointer_down(&mut self, point: Point, ctx: DrawContext<'_>) -> PointerEffect {
        match self.state {
            ToolState::Freehand { .. } => {
                ctx.history.record_before_edit(ctx.surface);
                self.state = ToolState::Freehand {
                    cursor: Some(point),
                };
                PointerEffect::EditStarted
            }
            ToolState::ShapeArmed(kind) => {
                ctx.history.record_before_edit(ctx.surface);
                self.state = ToolState::ShapeDragging {
                    kind,
                    anchor: point,
                    drag: point,
                };
                PointerEffect::EditStarted
            }
            ToolState::ShapeDragging { .. } => PointerEffect::NoAction,
        }
    }

    pub fn pointer_drag(&mut self, point: Point, ctx: DrawContext<'_>) -> PointerEffect {
        match self.state {
            ToolState::Freehand {
                cursor: Some(previous),
            } => {
                let paint = ctx.surface.paint();
                ctx.surface
                    .draw_segment(previous, point, paint.color, paint.stroke_width);
                self.state = ToolState::Freehand {
                    cursor: Some(point),
                };
                PointerEffect::Drew
            }
            ToolState::ShapeDragging { kind, anchor, .. } => {
                self.state = ToolState::ShapeDragging {
                    kind,
                    anchor,
                    drag: point,
                };
                PointerEffect::Previewed
            }
            ToolState::Freehand { cursor: None } | ToolState::ShapeArmed(_) => {
                PointerEffect::NoAction
            }
        }
    }

    pub fn pointer_up(&mut self, point: Point, ctx: DrawContext<'_>) -> PointerEffect {
        match self.state {
            ToolState::Freehand { .. } => {
                // Segments are committed as they are dragged; this only ends the stroke.
                self.state = ToolState::Freehand { cursor: None };
                PointerEffect::NoAction
            }
            ToolState::ShapeDragging { kind, anchor, .. } => {
                let outline = kind.outline(anchor, point);
                let paint = ctx.surface.paint();
                ctx.surface.rasterize_shape(
                    &outline,
                    paint.color,
                    paint.stroke_width,
                    self.fill_shapes,
                );
                self.state = ToolState::ShapeArmed(kind);
                tracing::debug!(?kind, ?anchor, end = ?point, "shape committed");
                PointerEffect::Committed
            }
            ToolState::ShapeArmed(_) => PointerEffect::NoAction,
        }
    }

    pub fn preview(&self, paint: PaintState) -> Option<ShapePreview> {
        let ToolState::ShapeDragging { kind, anchor, drag } = self.state else {
            return None;
        };
        Some(ShapePreview {
            kind,
            outline: kind.outline(anchor, drag),
            color: paint.color,
            thickness: paint.stroke_width,
            filled: self.fill_shapes,
        })
    }
}
