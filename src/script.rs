//! Replays a JSON array of canvas commands.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::editor::{Canvas, Command, DocumentError};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse script {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("command #{index} ({command:?}) failed")]
    Command {
        index: usize,
        command: Command,
        #[source]
        source: DocumentError,
    },
}

pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

pub fn load_script(path: &Path) -> ScriptResult<Vec<Command>> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies commands in order, stopping at the first one that fails.
pub fn replay(canvas: &mut Canvas, commands: Vec<Command>) -> ScriptResult<usize> {
    let total = commands.len();
    for (index, command) in commands.into_iter().enumerate() {
        tracing::trace!(index, ?command, "replaying command");
        canvas
            .apply(command.clone())
            .map_err(|source| ScriptError::Command {
                index,
                command,
                source,
            })?;
    }
    tracing::info!(commands = total, "script replayed");
    Ok(total)
}
