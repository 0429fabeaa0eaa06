//! One state machine per block kind.

use crate::domain::{BlockConfig, BlockKind};
use crate::engine::Input;
use crate::error::{EngineError, Result};

pub mod accent;
pub mod dialogue;
pub mod flashcard;
pub mod highlight;
pub mod hotspot;
pub mod image_match;
pub mod pick_picture;
pub mod sentence_match;
pub mod single_phrase;
pub mod spelling;
pub mod translation;

/// Decode and validate the config of a block of `kind`.
pub(crate) fn typed_config(kind: BlockKind, value: &serde_json::Value) -> Result<BlockConfig> {
    let cfg = BlockConfig::from_value(kind, value.clone())?;
    cfg.validate()?;
    Ok(cfg)
}

pub(crate) fn unsupported_input(kind: BlockKind, input: &Input) -> EngineError {
    EngineError::invalid(format!("{kind} block does not accept {}", input.name()))
}

pub(crate) fn check_index(index: usize, len: usize, what: &str) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(EngineError::invalid(format!("{what} {index} out of range (have {len})")))
    }
}
