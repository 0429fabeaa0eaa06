//! Error taxonomy shared by the store, the authoring tool and the lesson engine.
//!
//! Wrong answers are never errors: they come back as graded `Outcome`s.
//! These variants describe contract failures only.

use thiserror::Error;

/// Errors raised by lesson loading, saving, authoring and playback.
#[derive(Clone, Debug, Error)]
pub enum EngineError {
    /// The requested lesson id is unknown to the store.
    #[error("lesson not found: {0}")]
    NotFound(String),

    /// Malformed or missing lesson fields, or a malformed answer payload.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The persistence layer failed to read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A block tag with no registered exercise machine.
    #[error("unsupported block type: {0}")]
    UnsupportedBlockType(String),

    /// `advance` was requested while the active block is still being played.
    #[error("block {index} is still in progress")]
    BlockInProgress { index: usize },
}

impl EngineError {
    /// Stable snake_case code used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::Storage(_) => "storage_error",
            EngineError::UnsupportedBlockType(_) => "unsupported_block_type",
            EngineError::BlockInProgress { .. } => "block_in_progress",
        }
    }

    /// Playback cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::UnsupportedBlockType(_))
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::InvalidInput(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
