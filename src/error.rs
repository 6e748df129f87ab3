use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error in {}: {message}", file.display())]
    ParseError { file: PathBuf, message: String },

    #[error("{} is not an OpenAPI document (no `openapi` or `swagger` key)", .0.display())]
    NotOpenApi(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Builds a [`Error::ParseError`] for `file` from any displayable parser error.
    pub fn parse(file: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::ParseError {
            file: file.into(),
            message: err.to_string(),
        }
    }
}
