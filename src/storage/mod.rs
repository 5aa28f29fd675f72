use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use image::{ImageFormat, RgbImage};
use thiserror::Error;

const TEMP_SUFFIX: &str = ".partial";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read image {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write image {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode image {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Decodes any supported raster file into an RGB buffer; alpha is dropped.
pub fn load_image(path: &Path) -> StorageResult<RgbImage> {
    let bytes = fs::read(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| StorageError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let pixels = decoded.to_rgb8();
    tracing::info!(
        path = %path.display(),
        width = pixels.width(),
        height = pixels.height(),
        "image loaded"
    );
    Ok(pixels)
}

/// Writes the buffer as PNG. The file is staged next to the target and
/// renamed into place, so a failure never leaves a truncated image behind.
pub fn save_image(pixels: &RgbImage, path: &Path) -> StorageResult<()> {
    let staging = staging_path(path);
    let write_error = |source: io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let result = write_png(pixels, path, &staging)
        .and_then(|()| fs::rename(&staging, path).map_err(write_error));
    if let Err(err) = &result {
        let _ = fs::remove_file(&staging);
        tracing::warn!(path = %path.display(), %err, "image save failed");
    } else {
        tracing::info!(
            path = %path.display(),
            width = pixels.width(),
            height = pixels.height(),
            "image saved"
        );
    }
    result
}

fn write_png(pixels: &RgbImage, path: &Path, staging: &Path) -> StorageResult<()> {
    let write_error = |source: io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(staging).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    pixels
        .write_to(&mut writer, ImageFormat::Png)
        .map_err(|source| StorageError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    let file = writer
        .into_inner()
        .map_err(|err| write_error(err.into_error()))?;
    file.sync_all().map_err(write_error)?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Encodes on a worker thread; the receiver yields exactly one result.
pub fn save_in_background(
    pixels: RgbImage,
    path: PathBuf,
) -> mpsc::Receiver<StorageResult<PathBuf>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = save_image(&pixels, &path).map(|()| path);
        let _ = tx.send(result);
    });
    rx
}
