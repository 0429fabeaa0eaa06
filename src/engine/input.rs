//! Typed inputs consumed by exercise machines, and the speech-recognition
//! bookkeeping of the input adapter.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::SpeakerSlot;
use crate::error::{EngineError, Result};

/// Normalized learner event. The presentation layer translates clicks, typed
/// text and speech results into one of these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Input {
    TextSubmitted { value: String },
    OptionSelected { id: usize },
    /// Click on an image, in percent of its width and height.
    PositionClicked { x: f64, y: f64 },
    /// Click on a numbered target (hotspot marker, image-match box).
    BoxClicked { index: usize },
    /// Toggle a selectable element (word, picture, letter).
    ItemToggled { index: usize },
    PromptSelected { index: usize },
    CompletionSelected { sentence: usize, card: usize },
    TranscriptReceived { text: String, speaker: SpeakerSlot },
    SpeakerSubmitted { speaker: SpeakerSlot },
    /// Submit the current selection.
    Submit,
    /// Move on after a graded unit that waits for the learner.
    Continue,
    Flip,
    TimerTick { remaining_seconds: i64 },
}

impl Input {
    pub fn name(&self) -> &'static str {
        match self {
            Input::TextSubmitted { .. } => "text_submitted",
            Input::OptionSelected { .. } => "option_selected",
            Input::PositionClicked { .. } => "position_clicked",
            Input::BoxClicked { .. } => "box_clicked",
            Input::ItemToggled { .. } => "item_toggled",
            Input::PromptSelected { .. } => "prompt_selected",
            Input::CompletionSelected { .. } => "completion_selected",
            Input::TranscriptReceived { .. } => "transcript_received",
            Input::SpeakerSubmitted { .. } => "speaker_submitted",
            Input::Submit => "submit",
            Input::Continue => "continue",
            Input::Flip => "flip",
            Input::TimerTick { .. } => "timer_tick",
        }
    }
}

/// Whether a recognition request started right away or waits behind a running one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recognition {
    Started,
    Queued,
}

#[derive(Debug, Default, Clone, Copy)]
struct SlotState {
    running: bool,
    queued: u32,
}

/// Serializes speech recognition: at most one session runs per speaker slot;
/// later requests for the same slot wait their turn.
#[derive(Debug, Default)]
pub struct RecognitionQueue {
    slots: HashMap<SpeakerSlot, SlotState>,
}

impl RecognitionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, slot: SpeakerSlot) -> Recognition {
        let state = self.slots.entry(slot).or_default();
        if state.running {
            state.queued += 1;
            Recognition::Queued
        } else {
            state.running = true;
            Recognition::Started
        }
    }

    /// Resolve the running session for `slot` into a transcript input.
    /// Returns whether a queued request for the slot has now started.
    pub fn finish(&mut self, slot: SpeakerSlot, transcript: &str) -> Result<(Input, bool)> {
        let state = self.slots.entry(slot).or_default();
        if !state.running {
            return Err(EngineError::invalid(format!("no recognition running for speaker {slot:?}")));
        }
        let restarted = if state.queued > 0 {
            state.queued -= 1;
            true
        } else {
            state.running = false;
            false
        };
        let input = Input::TranscriptReceived { text: transcript.trim().to_lowercase(), speaker: slot };
        Ok((input, restarted))
    }

    pub fn is_running(&self, slot: SpeakerSlot) -> bool {
        self.slots.get(&slot).is_some_and(|s| s.running)
    }

    /// Drop every running and queued session, e.g. when the block changes.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
