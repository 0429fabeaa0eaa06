//! Domain models: lessons, blocks, the eleven block kinds and their configuration records.
//!
//! JSON field names follow the stored lesson documents (camelCase).

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::util::{lenient_f64, lenient_id, lenient_usize};

/// The closed set of exercise types a block can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
  Flashcard,
  Translation,
  Hotspot,
  Highlight,
  ImageClick,
  Dialogue,
  SinglePhrase,
  SentenceMatch,
  PickPicture,
  Accent,
  Spelling,
}

impl BlockKind {
  pub const ALL: [BlockKind; 11] = [
    BlockKind::Flashcard,
    BlockKind::Translation,
    BlockKind::Hotspot,
    BlockKind::Highlight,
    BlockKind::ImageClick,
    BlockKind::Dialogue,
    BlockKind::SinglePhrase,
    BlockKind::SentenceMatch,
    BlockKind::PickPicture,
    BlockKind::Accent,
    BlockKind::Spelling,
  ];

  /// Tag as stored in the lesson document's `type` field.
  pub fn tag(self) -> &'static str {
    match self {
      BlockKind::Flashcard => "flashcard",
      BlockKind::Translation => "translation",
      BlockKind::Hotspot => "hotspot",
      BlockKind::Highlight => "highlight",
      BlockKind::ImageClick => "imageclick",
      BlockKind::Dialogue => "dialogue",
      BlockKind::SinglePhrase => "singlephrase",
      BlockKind::SentenceMatch => "sentencematch",
      BlockKind::PickPicture => "pickpicture",
      BlockKind::Accent => "accent",
      BlockKind::Spelling => "spelling",
    }
  }

  pub fn from_tag(tag: &str) -> Option<Self> {
    BlockKind::ALL.into_iter().find(|k| k.tag() == tag)
  }
}

impl std::fmt::Display for BlockKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.tag())
  }
}

/// One block as stored. The tag is kept as text so that documents with tags this
/// build does not know still load; playback reports them as unsupported.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Block {
  #[serde(deserialize_with = "lenient_id")]
  pub id: String,
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default)]
  pub config: serde_json::Value,
}

impl Block {
  pub fn known_kind(&self) -> Option<BlockKind> {
    BlockKind::from_tag(&self.kind)
  }

  /// Decode the raw config into the typed record its tag selects.
  pub fn typed_config(&self) -> Result<BlockConfig> {
    let kind = self
      .known_kind()
      .ok_or_else(|| EngineError::UnsupportedBlockType(self.kind.clone()))?;
    BlockConfig::from_value(kind, self.config.clone())
  }
}

/// A playable lesson. Block order is play order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
  #[serde(default)]
  pub id: String,
  pub name: String,
  pub date: String,
  pub blocks: Vec<Block>,
}

/// Entry of the lesson listing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LessonSummary {
  pub id: String,
  pub name: String,
  pub date: String,
}

/// A lesson as submitted for saving: every field may be missing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LessonInput {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub date: Option<String>,
  #[serde(default)]
  pub blocks: Option<Vec<Block>>,
}

impl LessonInput {
  /// Check required fields; `new_id` supplies the id when the input carries none.
  pub fn into_lesson(self, new_id: impl FnOnce() -> String) -> Result<Lesson> {
    let (Some(name), Some(date), Some(blocks)) = (self.name, self.date, self.blocks) else {
      return Err(EngineError::invalid("Missing required fields"));
    };
    let id = match self.id {
      Some(id) if !id.trim().is_empty() => id,
      _ => new_id(),
    };
    Ok(Lesson { id, name, date, blocks })
  }
}

impl From<Lesson> for LessonInput {
  fn from(l: Lesson) -> Self {
    Self {
      id: Some(l.id).filter(|id| !id.is_empty()),
      name: Some(l.name),
      date: Some(l.date),
      blocks: Some(l.blocks),
    }
  }
}

// ----- per-variant configuration records -----

fn default_time_limit() -> usize {
  300
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Card {
  pub english: String,
  pub spanish: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardConfig {
  #[serde(default)]
  pub instructions: String,
  /// Seconds for the whole deck.
  #[serde(default = "default_time_limit", deserialize_with = "lenient_usize")]
  pub time_limit: usize,
  #[serde(default)]
  pub cards: Vec<Card>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationItem {
  #[serde(default)]
  pub sentence: String,
  #[serde(default)]
  pub correct_answer: String,
  #[serde(default)]
  pub vocabulary: Vec<String>,
}

/// Either a single inline sentence or an authored `sentences` list whose first entry is played.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub sentence: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub correct_answer: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub vocabulary: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub sentences: Vec<TranslationItem>,
}

impl TranslationConfig {
  pub fn item(&self) -> Option<TranslationItem> {
    if !self.sentence.is_empty() || !self.correct_answer.is_empty() {
      return Some(TranslationItem {
        sentence: self.sentence.clone(),
        correct_answer: self.correct_answer.clone(),
        vocabulary: self.vocabulary.clone(),
      });
    }
    self.sentences.first().cloned()
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  /// Percent of the image width.
  #[serde(deserialize_with = "lenient_f64")]
  pub x: f64,
  /// Percent of the image height.
  #[serde(deserialize_with = "lenient_f64")]
  pub y: f64,
  pub answer: String,
  #[serde(default)]
  pub wrong_options: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotspotConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub image_url: String,
  #[serde(default)]
  pub hotspots: Vec<Hotspot>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HighlightItem {
  pub text: String,
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub correct_words: Vec<String>,
}

impl HighlightItem {
  /// Selectable words, split on single spaces like the rendered sentence.
  pub fn words(&self) -> Vec<&str> {
    self.text.split(' ').collect()
  }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HighlightConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub exercises: Vec<HighlightItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageQuestion {
  pub text: String,
  /// 1-based target box.
  #[serde(deserialize_with = "lenient_usize")]
  pub correct_box: usize,
  /// 1-based source image.
  #[serde(deserialize_with = "lenient_usize")]
  pub correct_image: usize,
}

pub const IMAGE_SLOTS: usize = 5;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageClickConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub image1: String,
  #[serde(default)]
  pub image2: String,
  #[serde(default)]
  pub image3: String,
  #[serde(default)]
  pub image4: String,
  #[serde(default)]
  pub image5: String,
  #[serde(default)]
  pub questions: Vec<ImageQuestion>,
}

impl ImageClickConfig {
  pub fn images(&self) -> [&str; IMAGE_SLOTS] {
    [&self.image1, &self.image2, &self.image3, &self.image4, &self.image5]
  }
}

/// Which side of a dialogue a transcript belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeakerSlot {
  A,
  B,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DialogueTurn {
  #[serde(rename = "speakerAEng", default)]
  pub speaker_a_eng: String,
  #[serde(rename = "speakerASpa", default)]
  pub speaker_a_spa: String,
  #[serde(rename = "speakerBEng", default)]
  pub speaker_b_eng: String,
  #[serde(rename = "speakerBSpa", default)]
  pub speaker_b_spa: String,
}

impl DialogueTurn {
  pub fn english(&self, slot: SpeakerSlot) -> &str {
    match slot {
      SpeakerSlot::A => &self.speaker_a_eng,
      SpeakerSlot::B => &self.speaker_b_eng,
    }
  }

  pub fn spanish(&self, slot: SpeakerSlot) -> &str {
    match slot {
      SpeakerSlot::A => &self.speaker_a_spa,
      SpeakerSlot::B => &self.speaker_b_spa,
    }
  }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DialogueConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub dialogues: Vec<DialogueTurn>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Phrase {
  #[serde(default)]
  pub prompt: String,
  pub answer: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SinglePhraseConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub phrases: Vec<Phrase>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSentence {
  pub green_card: String,
  #[serde(default)]
  pub white_cards: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SentenceMatchConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub sentences: Vec<MatchSentence>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PictureItem {
  #[serde(default)]
  pub verb: String,
  #[serde(default)]
  pub images: Vec<String>,
  #[serde(default)]
  pub correct_answers: Vec<usize>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PickPictureConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub exercises: Vec<PictureItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Correction {
  /// Character offset into the sentence text.
  pub index: usize,
  pub accent: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccentSentence {
  pub text: String,
  #[serde(default)]
  pub corrections: Vec<Correction>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AccentConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub sentences: Vec<AccentSentence>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpellingItem {
  pub word: String,
  #[serde(default)]
  pub missing_indices: Vec<usize>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SpellingConfig {
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub exercises: Vec<SpellingItem>,
}

impl Default for FlashcardConfig {
  fn default() -> Self {
    Self { instructions: String::new(), time_limit: default_time_limit(), cards: Vec::new() }
  }
}

/// Typed configuration, one variant per block kind.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockConfig {
  Flashcard(FlashcardConfig),
  Translation(TranslationConfig),
  Hotspot(HotspotConfig),
  Highlight(HighlightConfig),
  ImageClick(ImageClickConfig),
  Dialogue(DialogueConfig),
  SinglePhrase(SinglePhraseConfig),
  SentenceMatch(SentenceMatchConfig),
  PickPicture(PickPictureConfig),
  Accent(AccentConfig),
  Spelling(SpellingConfig),
}

impl BlockConfig {
  /// Empty configuration for a freshly added block.
  pub fn empty(kind: BlockKind) -> Self {
    match kind {
      BlockKind::Flashcard => BlockConfig::Flashcard(FlashcardConfig::default()),
      BlockKind::Translation => BlockConfig::Translation(TranslationConfig::default()),
      BlockKind::Hotspot => BlockConfig::Hotspot(HotspotConfig::default()),
      BlockKind::Highlight => BlockConfig::Highlight(HighlightConfig::default()),
      BlockKind::ImageClick => BlockConfig::ImageClick(ImageClickConfig::default()),
      BlockKind::Dialogue => BlockConfig::Dialogue(DialogueConfig::default()),
      BlockKind::SinglePhrase => BlockConfig::SinglePhrase(SinglePhraseConfig::default()),
      BlockKind::SentenceMatch => BlockConfig::SentenceMatch(SentenceMatchConfig::default()),
      BlockKind::PickPicture => BlockConfig::PickPicture(PickPictureConfig::default()),
      BlockKind::Accent => BlockConfig::Accent(AccentConfig::default()),
      BlockKind::Spelling => BlockConfig::Spelling(SpellingConfig::default()),
    }
  }

  pub fn kind(&self) -> BlockKind {
    match self {
      BlockConfig::Flashcard(_) => BlockKind::Flashcard,
      BlockConfig::Translation(_) => BlockKind::Translation,
      BlockConfig::Hotspot(_) => BlockKind::Hotspot,
      BlockConfig::Highlight(_) => BlockKind::Highlight,
      BlockConfig::ImageClick(_) => BlockKind::ImageClick,
      BlockConfig::Dialogue(_) => BlockKind::Dialogue,
      BlockConfig::SinglePhrase(_) => BlockKind::SinglePhrase,
      BlockConfig::SentenceMatch(_) => BlockKind::SentenceMatch,
      BlockConfig::PickPicture(_) => BlockKind::PickPicture,
      BlockConfig::Accent(_) => BlockKind::Accent,
      BlockConfig::Spelling(_) => BlockKind::Spelling,
    }
  }

  pub fn from_value(kind: BlockKind, value: serde_json::Value) -> Result<Self> {
    // Blocks added but never configured are stored with `{}` or null.
    let value = if value.is_null() { serde_json::json!({}) } else { value };
    let cfg = match kind {
      BlockKind::Flashcard => BlockConfig::Flashcard(serde_json::from_value(value)?),
      BlockKind::Translation => BlockConfig::Translation(serde_json::from_value(value)?),
      BlockKind::Hotspot => BlockConfig::Hotspot(serde_json::from_value(value)?),
      BlockKind::Highlight => BlockConfig::Highlight(serde_json::from_value(value)?),
      BlockKind::ImageClick => BlockConfig::ImageClick(serde_json::from_value(value)?),
      BlockKind::Dialogue => BlockConfig::Dialogue(serde_json::from_value(value)?),
      BlockKind::SinglePhrase => BlockConfig::SinglePhrase(serde_json::from_value(value)?),
      BlockKind::SentenceMatch => BlockConfig::SentenceMatch(serde_json::from_value(value)?),
      BlockKind::PickPicture => BlockConfig::PickPicture(serde_json::from_value(value)?),
      BlockKind::Accent => BlockConfig::Accent(serde_json::from_value(value)?),
      BlockKind::Spelling => BlockConfig::Spelling(serde_json::from_value(value)?),
    };
    Ok(cfg)
  }

  pub fn to_value(&self) -> Result<serde_json::Value> {
    let v = match self {
      BlockConfig::Flashcard(c) => serde_json::to_value(c)?,
      BlockConfig::Translation(c) => serde_json::to_value(c)?,
      BlockConfig::Hotspot(c) => serde_json::to_value(c)?,
      BlockConfig::Highlight(c) => serde_json::to_value(c)?,
      BlockConfig::ImageClick(c) => serde_json::to_value(c)?,
      BlockConfig::Dialogue(c) => serde_json::to_value(c)?,
      BlockConfig::SinglePhrase(c) => serde_json::to_value(c)?,
      BlockConfig::SentenceMatch(c) => serde_json::to_value(c)?,
      BlockConfig::PickPicture(c) => serde_json::to_value(c)?,
      BlockConfig::Accent(c) => serde_json::to_value(c)?,
      BlockConfig::Spelling(c) => serde_json::to_value(c)?,
    };
    Ok(v)
  }

  /// Structural invariants checked before a block is built or played.
  pub fn validate(&self) -> Result<()> {
    match self {
      BlockConfig::Flashcard(c) => {
        if c.time_limit == 0 {
          return Err(EngineError::invalid("flashcard timeLimit must be greater than zero"));
        }
      }
      BlockConfig::Translation(c) => {
        if c.item().is_none() {
          return Err(EngineError::invalid("translation needs a sentence and its answer"));
        }
      }
      BlockConfig::Hotspot(c) => {
        for (i, h) in c.hotspots.iter().enumerate() {
          if !(0.0..=100.0).contains(&h.x) || !(0.0..=100.0).contains(&h.y) {
            return Err(EngineError::invalid(format!("hotspot {i} lies outside the image (0-100%)")));
          }
        }
      }
      BlockConfig::ImageClick(c) => {
        for (i, q) in c.questions.iter().enumerate() {
          if !(1..=IMAGE_SLOTS).contains(&q.correct_box) || !(1..=IMAGE_SLOTS).contains(&q.correct_image) {
            return Err(EngineError::invalid(format!("question {i}: correctBox and correctImage must be 1-5")));
          }
        }
      }
      BlockConfig::PickPicture(c) => {
        for (i, e) in c.exercises.iter().enumerate() {
          if let Some(bad) = e.correct_answers.iter().find(|&&a| a >= e.images.len()) {
            return Err(EngineError::invalid(format!("exercise {i}: answer {bad} has no image")));
          }
        }
      }
      BlockConfig::Accent(c) => {
        for (i, s) in c.sentences.iter().enumerate() {
          let len = s.text.chars().count();
          if let Some(bad) = s.corrections.iter().find(|c| c.index >= len) {
            return Err(EngineError::invalid(format!("sentence {i}: correction at {} is past the text", bad.index)));
          }
          if let Some(bad) = s.corrections.iter().find(|c| s.text.chars().nth(c.index).is_some_and(char::is_whitespace)) {
            return Err(EngineError::invalid(format!("sentence {i}: correction at {} is not a letter", bad.index)));
          }
        }
      }
      BlockConfig::Spelling(c) => {
        for (i, e) in c.exercises.iter().enumerate() {
          let len = e.word.chars().count();
          if e.missing_indices.is_empty() {
            return Err(EngineError::invalid(format!("word {i}: at least one letter must be missing")));
          }
          if e.missing_indices.iter().any(|&m| m >= len) {
            return Err(EngineError::invalid(format!("word {i}: missing index past the end of '{}'", e.word)));
          }
          if e.missing_indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(EngineError::invalid(format!("word {i}: missing indices must increase left to right")));
          }
        }
      }
      BlockConfig::Highlight(_)
      | BlockConfig::Dialogue(_)
      | BlockConfig::SinglePhrase(_)
      | BlockConfig::SentenceMatch(_) => {}
    }
    Ok(())
  }
}
