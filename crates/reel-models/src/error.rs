//! Model validation errors.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Unknown caption alignment: {0} (expected top, center or bottom)")]
    UnknownAlignment(String),

    #[error("Invalid cue timestamp '{0}'. Use HH:MM:SS,mmm")]
    InvalidTimestamp(String),

    #[error("Script contains no scenes")]
    EmptyScript,

    #[error("Scene number must be positive (got {0})")]
    InvalidSceneNumber(i64),

    #[error("Duplicate scene number: {0}")]
    DuplicateScene(u32),
}
