//! Error types for sgmatch.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for sgmatch operations.
pub type SgmResult<T> = std::result::Result<T, SgmError>;

/// Errors that can occur when building inputs or running the pipeline.
#[derive(Debug, Error)]
pub enum SgmError {
    /// Matcher parameters failed validation. Surfaced before any pixel work.
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },
    /// An image was constructed with zero width or height.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer is shorter than the declared geometry requires.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A stride smaller than the row width was supplied.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Left and right images of a stereo pair disagree on geometry.
    #[error(
        "stereo pair dimension mismatch: left {left_width}x{left_height}, \
         right {right_width}x{right_height}"
    )]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },
    /// An input image could not be read or decoded.
    #[error("failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    /// No filename convention resolved both sides of a scene.
    #[error("no stereo pair found for scene '{scene}'")]
    SceneResolution { scene: String },
    /// An output file or directory could not be written.
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SgmError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        SgmError::Configuration {
            reason: reason.into(),
        }
    }
}
