//! Error types for meshkit

use thiserror::Error;

/// Main error type for meshkit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Triangle index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: usize, vertex_count: usize },

    #[error("Attribute '{attribute}' has {actual} entries, expected {expected}")]
    AttributeLengthMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Index buffer length {0} is not a multiple of 3")]
    NotTriangulated(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for meshkit operations
pub type Result<T> = std::result::Result<T, Error>;
