//! Error types for reading image records.

use thiserror::Error;

/// Errors that can occur while reading records produced by the backend or
/// the host.
#[derive(Error, Debug)]
pub enum FormatError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid coordinate values
    #[error("Invalid coordinates for box #{index}: {message}")]
    InvalidCoordinates {
        /// Index of the offending box
        index: usize,
        /// Description of the coordinate error
        message: String,
    },

    /// A score outside `[0, 1]`
    #[error("Invalid score {score} for box #{index}")]
    InvalidScore {
        /// Index of the offending box
        index: usize,
        /// The score that was read
        score: f32,
    },
}

impl FormatError {
    /// Create an invalid coordinates error.
    pub fn invalid_coordinates(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidCoordinates {
            index,
            message: message.into(),
        }
    }
}
