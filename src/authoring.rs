//! Lesson authoring: builds the block data the runner later plays.
//!
//! A `LessonDraft` is edited block by block. Every config is decoded and
//! validated before it replaces the stored one, so a draft never holds a block
//! the engine would refuse to build.

use tracing::{debug, instrument};

use crate::domain::{Block, BlockConfig, BlockKind, Correction, Lesson, LessonInput};
use crate::error::{EngineError, Result};
use crate::util::split_list;

#[derive(Clone, Debug)]
pub struct LessonDraft {
  id: Option<String>,
  pub name: String,
  pub date: String,
  blocks: Vec<Block>,
  next_block_id: u64,
}

impl LessonDraft {
  pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
    Self { id: None, name: name.into(), date: date.into(), blocks: Vec::new(), next_block_id: 1 }
  }

  /// Reopen a saved lesson for editing; saving again keeps its id.
  pub fn from_lesson(lesson: Lesson) -> Self {
    let next_block_id = lesson.blocks.iter().filter_map(|b| b.id.parse::<u64>().ok()).max().unwrap_or(0) + 1;
    Self {
      id: Some(lesson.id).filter(|id| !id.is_empty()),
      name: lesson.name,
      date: lesson.date,
      blocks: lesson.blocks,
      next_block_id,
    }
  }

  pub fn blocks(&self) -> &[Block] {
    &self.blocks
  }

  /// Append a block of `kind` with an empty config and return its id.
  pub fn add_block(&mut self, kind: BlockKind) -> Result<String> {
    let id = self.next_block_id.to_string();
    self.next_block_id += 1;
    let config = BlockConfig::empty(kind).to_value()?;
    self.blocks.push(Block { id: id.clone(), kind: kind.tag().to_string(), config });
    debug!(target: "lesson", block_id = %id, %kind, "Block added to draft");
    Ok(id)
  }

  /// Replace the config of a block. The config must match the block's type and
  /// pass validation; otherwise the draft is left unchanged.
  #[instrument(level = "debug", skip(self, config), fields(kind = %config.kind()))]
  pub fn configure(&mut self, block_id: &str, config: BlockConfig) -> Result<()> {
    let block = self
      .blocks
      .iter_mut()
      .find(|b| b.id == block_id)
      .ok_or_else(|| EngineError::invalid(format!("no block with id '{block_id}'")))?;
    if block.known_kind() != Some(config.kind()) {
      return Err(EngineError::invalid(format!("block '{block_id}' is a {} block, not {}", block.kind, config.kind())));
    }
    let config = normalize(config);
    config.validate()?;
    block.config = config.to_value()?;
    Ok(())
  }

  /// `configure` from a raw JSON config, decoded according to the block's type.
  pub fn configure_json(&mut self, block_id: &str, raw: serde_json::Value) -> Result<()> {
    let kind = self
      .blocks
      .iter()
      .find(|b| b.id == block_id)
      .ok_or_else(|| EngineError::invalid(format!("no block with id '{block_id}'")))?
      .known_kind()
      .ok_or_else(|| EngineError::invalid(format!("block '{block_id}' has an unknown type")))?;
    self.configure(block_id, BlockConfig::from_value(kind, raw)?)
  }

  pub fn remove_block(&mut self, block_id: &str) -> Result<Block> {
    let pos = self
      .blocks
      .iter()
      .position(|b| b.id == block_id)
      .ok_or_else(|| EngineError::invalid(format!("no block with id '{block_id}'")))?;
    Ok(self.blocks.remove(pos))
  }

  pub fn into_lesson_input(self) -> LessonInput {
    LessonInput { id: self.id, name: Some(self.name), date: Some(self.date), blocks: Some(self.blocks) }
  }
}

fn normalize(config: BlockConfig) -> BlockConfig {
  match config {
    BlockConfig::Spelling(mut c) => {
      for e in &mut c.exercises {
        e.word = e.word.to_uppercase();
      }
      BlockConfig::Spelling(c)
    }
    other => other,
  }
}

fn accented(letter: char) -> Option<char> {
  let lower = match letter.to_lowercase().next()? {
    'a' => 'á',
    'e' => 'é',
    'i' => 'í',
    'o' => 'ó',
    'u' => 'ú',
    'n' => 'ñ',
    _ => return None,
  };
  if letter.is_uppercase() {
    lower.to_uppercase().next()
  } else {
    Some(lower)
  }
}

/// Add or remove the correction at character `index` of `text`.
/// Letters without an accented form are left alone.
pub fn toggle_accent(text: &str, corrections: &mut Vec<Correction>, index: usize) {
  if let Some(pos) = corrections.iter().position(|c| c.index == index) {
    corrections.remove(pos);
    return;
  }
  if let Some(accent) = text.chars().nth(index).and_then(accented) {
    corrections.push(Correction { index, accent: accent.to_string() });
  }
}

/// The sentence as it reads once every correction is applied.
pub fn accent_preview(text: &str, corrections: &[Correction]) -> String {
  text
    .chars()
    .enumerate()
    .map(|(i, c)| match corrections.iter().find(|k| k.index == i) {
      Some(k) => k.accent.clone(),
      None => c.to_string(),
    })
    .collect()
}

/// Parse an authored comma list of picture indices ("0, 2").
pub fn parse_index_list(raw: &str) -> Result<Vec<usize>> {
  split_list(raw)
    .into_iter()
    .filter(|item| !item.is_empty())
    .map(|item| item.parse::<usize>().map_err(|_| EngineError::invalid(format!("'{item}' is not a picture index"))))
    .collect()
}

/// Blank or restore one letter of a spelling word, keeping indices ascending.
pub fn toggle_missing_letter(missing: &mut Vec<usize>, index: usize) {
  match missing.binary_search(&index) {
    Ok(pos) => {
      missing.remove(pos);
    }
    Err(pos) => missing.insert(pos, index),
  }
}
