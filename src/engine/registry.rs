//! Block registry: maps a block tag to the constructor of its exercise machine.

use std::collections::HashMap;

use rand::rngs::StdRng;
use tracing::debug;

use crate::domain::{Block, BlockKind};
use crate::engine::exercises;
use crate::engine::Exercise;
use crate::error::{EngineError, Result};

/// Everything a machine may need besides its config.
pub struct BuildContext {
    /// Private randomness for shuffles and decoys.
    pub rng: StdRng,
    /// Hit radius, in percent units, for resolving image clicks to hotspots.
    pub hotspot_hit_radius: f64,
}

/// Decode + validate a config and build a fresh machine from it.
pub type Constructor = fn(&serde_json::Value, BuildContext) -> Result<Box<dyn Exercise>>;

#[derive(Clone, Default)]
pub struct BlockRegistry {
    entries: HashMap<BlockKind, Constructor>,
}

impl BlockRegistry {
    /// Registry with no block types at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with all eleven built-in block types.
    pub fn standard() -> Self {
        let mut r = Self::empty();
        r.register(BlockKind::Flashcard, exercises::flashcard::build);
        r.register(BlockKind::Translation, exercises::translation::build);
        r.register(BlockKind::Hotspot, exercises::hotspot::build);
        r.register(BlockKind::Highlight, exercises::highlight::build);
        r.register(BlockKind::ImageClick, exercises::image_match::build);
        r.register(BlockKind::Dialogue, exercises::dialogue::build);
        r.register(BlockKind::SinglePhrase, exercises::single_phrase::build);
        r.register(BlockKind::SentenceMatch, exercises::sentence_match::build);
        r.register(BlockKind::PickPicture, exercises::pick_picture::build);
        r.register(BlockKind::Accent, exercises::accent::build);
        r.register(BlockKind::Spelling, exercises::spelling::build);
        r
    }

    pub fn register(&mut self, kind: BlockKind, ctor: Constructor) -> &mut Self {
        self.entries.insert(kind, ctor);
        self
    }

    pub fn unregister(&mut self, kind: BlockKind) -> &mut Self {
        self.entries.remove(&kind);
        self
    }

    pub fn supports(&self, tag: &str) -> bool {
        BlockKind::from_tag(tag).is_some_and(|k| self.entries.contains_key(&k))
    }

    /// Registered tags in declaration order.
    pub fn tags(&self) -> Vec<&'static str> {
        BlockKind::ALL
            .into_iter()
            .filter(|k| self.entries.contains_key(k))
            .map(BlockKind::tag)
            .collect()
    }

    /// Build the machine for `block`. Unknown or unregistered tags are an
    /// `UnsupportedBlockType` error, never a silent skip.
    pub fn instantiate(&self, block: &Block, ctx: BuildContext) -> Result<Box<dyn Exercise>> {
        let ctor = block
            .known_kind()
            .and_then(|k| self.entries.get(&k))
            .ok_or_else(|| EngineError::UnsupportedBlockType(block.kind.clone()))?;
        debug!(target: "lesson", block_id = %block.id, kind = %block.kind, "Instantiating exercise");
        ctor(&block.config, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use serde_json::json;

    fn ctx() -> BuildContext {
        BuildContext { rng: StdRng::seed_from_u64(7), hotspot_hit_radius: 5.0 }
    }

    fn block(kind: &str, config: serde_json::Value) -> Block {
        Block { id: "b1".into(), kind: kind.into(), config }
    }

    #[test]
    fn standard_registry_covers_every_kind() {
        let r = BlockRegistry::standard();
        assert_eq!(r.tags().len(), BlockKind::ALL.len());
        for kind in BlockKind::ALL {
            assert!(r.supports(kind.tag()));
        }
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let r = BlockRegistry::standard();
        let err = r.instantiate(&block("crossword", json!({})), ctx()).err().unwrap();
        assert!(matches!(err, EngineError::UnsupportedBlockType(t) if t == "crossword"));
    }

    #[test]
    fn unregistered_kind_is_unsupported() {
        let mut r = BlockRegistry::standard();
        r.unregister(BlockKind::Accent);
        assert!(!r.supports("accent"));
        let err = r.instantiate(&block("accent", json!({"sentences": []})), ctx()).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn builds_the_machine_matching_the_tag() {
        let r = BlockRegistry::standard();
        let ex = r
            .instantiate(&block("singlephrase", json!({"phrases": [{"prompt": "Say hi", "answer": "hola"}]})), ctx())
            .unwrap();
        assert_eq!(ex.kind(), BlockKind::SinglePhrase);
        assert!(!ex.is_exercise_complete());
    }
}
