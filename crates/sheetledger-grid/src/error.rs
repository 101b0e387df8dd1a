//! Error types for the grid store.

use thiserror::Error;

/// Errors raised by a grid store or by grid addressing.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Document {doc} unreachable: {reason}")]
    Unreachable { doc: String, reason: String },

    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
