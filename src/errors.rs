use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the background removal pipeline.
///
/// Each variant captures context specific to its error domain (configuration,
/// filesystem, per-image processing), so callers never have to parse error
/// strings. Variants are built at the failing callsite with explicit path
/// and operation context; there are no blanket conversions. A per-file
/// decode failure is deliberately NOT represented here: the segmenter
/// reports it as an absent result and the batch runner skips the file.
/// Only batch-fatal conditions become `BgcutError`.
#[derive(Error, Debug)]
pub enum BgcutError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, BgcutError>;
