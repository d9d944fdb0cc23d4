//! Error types for fairypack-io.

use fairypack_core::ConvertError;
use thiserror::Error;

/// Result type for fairypack-io operations.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Errors raised while reading a document or writing a package.
#[derive(Debug, Error)]
pub enum PackageError {
    /// No reader handles the given file extension.
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// Structurally invalid input data.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The layer tree could not be translated.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
