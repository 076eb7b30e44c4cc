use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NwsError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidIdentifier(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Resolution error: {0}")]
    ResolutionError(String),
    #[error("{0}")]
    NoDataSources(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
