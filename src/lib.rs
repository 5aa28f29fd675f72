pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod logging;
pub mod script;
pub mod storage;
pub mod surface;

use std::path::Path;

pub use config::{AppConfig, CanvasSize};
pub use editor::{Canvas, Command, DocumentError, ShapeKind, ToolKind};
pub use error::{AppError, AppResult};
pub use geometry::{Color, Point, PresetColor};
pub use history::HistoryManager;
pub use surface::{RasterSurface, Snapshot};

/// Replays `script` onto a fresh canvas sized from `size` or the config file.
pub fn run(script: &Path, size: Option<CanvasSize>) -> AppResult<()> {
    logging::init();
    tracing::info!(script = %script.display(), "starting rasterpaint");

    let config = config::load_app_config();
    let size = size.unwrap_or_else(|| config.canvas_size());
    let mut canvas = Canvas::from_config(&config, size);

    let commands = script::load_script(script)?;
    script::replay(&mut canvas, commands)?;

    if canvas.is_dirty() {
        tracing::warn!("script finished with unsaved changes");
    }
    tracing::info!(
        width = canvas.dimensions().0,
        height = canvas.dimensions().1,
        "replay complete"
    );
    Ok(())
}
