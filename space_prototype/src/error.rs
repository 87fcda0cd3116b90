//! Error types for asset loading and configuration.
//!
//! Both are recoverable: callers log them and fall back to an empty asset
//! set or the built-in defaults.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn one image file into a collision asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The renderer refused the texture.
    #[error("failed to upload {path}: {message}")]
    Upload { path: PathBuf, message: String },

    #[error("image {path} has an empty {width}x{height} surface")]
    Empty {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// Failure to read `prototype.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
