//! Error types for the conversion core.

use thiserror::Error;

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors raised while translating a document into UI markup.
///
/// Any of these aborts the whole run; there is no partial package.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A node is missing an attribute the translator needs.
    #[error("Malformed node at {path}: missing {field}")]
    MalformedNode { path: String, field: &'static str },

    /// The supplied build identifier cannot be split into package id and namespace.
    #[error("Invalid build id '{0}'")]
    InvalidBuildId(String),
}

impl ConvertError {
    /// Create a malformed-node error.
    pub fn malformed(path: impl Into<String>, field: &'static str) -> Self {
        Self::MalformedNode {
            path: path.into(),
            field,
        }
    }
}
