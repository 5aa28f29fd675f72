use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::Color;
use crate::history::HISTORY_CAPACITY;
use crate::surface::{clamp_stroke_width, DEFAULT_STROKE_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "rasterpaint";
const APP_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_CANVAS_WIDTH: u32 = 1000;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 1000;
pub const MIN_RECOMMENDED_WIDTH: u32 = 900;
pub const MIN_RECOMMENDED_HEIGHT: u32 = 800;

/// Settings from `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub canvas_width: Option<u32>,
    #[serde(default)]
    pub canvas_height: Option<u32>,
    #[serde(default)]
    pub default_color: Option<String>,
    #[serde(default)]
    pub default_thickness: Option<i32>,
    #[serde(default)]
    pub history_capacity: Option<usize>,
}

impl AppConfig {
    pub fn canvas_size(&self) -> CanvasSize {
        match (self.canvas_width, self.canvas_height) {
            (Some(width), Some(height)) => CanvasSize::checked(width, height),
            _ => CanvasSize::default(),
        }
    }

    pub fn default_color(&self) -> Color {
        let Some(raw) = self.default_color.as_deref() else {
            return Color::BLACK;
        };
        Color::parse(raw).unwrap_or_else(|| {
            tracing::warn!(
                value = raw,
                "invalid default_color; expected #RRGGBB or a palette name"
            );
            Color::BLACK
        })
    }

    pub fn default_thickness(&self) -> u8 {
        self.default_thickness
            .map_or(DEFAULT_STROKE_WIDTH, clamp_stroke_width)
    }

    /// Clamped to `1..=HISTORY_CAPACITY`; undo depth never exceeds the default.
    pub fn history_capacity(&self) -> usize {
        let Some(requested) = self.history_capacity else {
            return HISTORY_CAPACITY;
        };
        let capacity = requested.clamp(1, HISTORY_CAPACITY);
        if capacity != requested {
            tracing::warn!(
                requested,
                effective = capacity,
                "history_capacity out of range; clamped"
            );
        }
        capacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl CanvasSize {
    /// Zero dimensions fall back to the default size; undersized canvases
    /// are allowed but reported.
    pub fn checked(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            tracing::warn!(width, height, "empty canvas size; using default");
            return Self::default();
        }
        if width < MIN_RECOMMENDED_WIDTH || height < MIN_RECOMMENDED_HEIGHT {
            tracing::warn!(
                width,
                height,
                min_width = MIN_RECOMMENDED_WIDTH,
                min_height = MIN_RECOMMENDED_HEIGHT,
                "canvas smaller than recommended minimum"
            );
        }
        Self { width, height }
    }

    /// Parses user-entered width and height; anything unparseable yields the
    /// default size.
    pub fn from_input(width: &str, height: &str) -> Self {
        match (width.trim().parse::<u32>(), height.trim().parse::<u32>()) {
            (Ok(width), Ok(height)) => Self::checked(width, height),
            _ => {
                tracing::warn!(width, height, "invalid canvas size input; using default");
                Self::default()
            }
        }
    }

    /// `WIDTHxHEIGHT`, as accepted on the command line.
    pub fn parse_dimensions(value: &str) -> Self {
        match value.split_once(['x', 'X']) {
            Some((width, height)) => Self::from_input(width, height),
            None => Self::from_input(value, ""),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Path(#[from] ConfigPathError),
    #[error("failed to read config: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    match read_app_config(xdg_config_home, home) {
        Ok(config) => config,
        Err(ConfigError::Path(_)) => AppConfig::default(),
        Err(err) => {
            tracing::warn!(%err, "failed to load config.json; using defaults");
            AppConfig::default()
        }
    }
}

fn read_app_config(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<AppConfig, ConfigError> {
    let path = app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home)?;
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
