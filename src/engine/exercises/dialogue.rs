//! Dialogue: both speakers say their line; each submitted line is graded on its own.

use crate::domain::{BlockConfig, BlockKind, DialogueConfig, SpeakerSlot};
use crate::engine::exercises::{typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, Outcome, Prompt, Verdict};
use crate::error::{EngineError, Result};
use crate::util::normalize_spoken;

#[derive(Default)]
struct Turn {
    transcript: [Option<String>; 2],
    submitted: [Option<bool>; 2],
}

fn slot_index(slot: SpeakerSlot) -> usize {
    match slot {
        SpeakerSlot::A => 0,
        SpeakerSlot::B => 1,
    }
}

pub struct Dialogue {
    cfg: DialogueConfig,
    current: usize,
    turn: Turn,
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::Dialogue(cfg) = typed_config(BlockKind::Dialogue, value)? else {
        return Err(EngineError::invalid("expected a dialogue config"));
    };
    Ok(Box::new(Dialogue { cfg, current: 0, turn: Turn::default() }))
}

impl Dialogue {
    fn done(&self) -> bool {
        self.current >= self.cfg.dialogues.len()
    }
}

impl Exercise for Dialogue {
    fn kind(&self) -> BlockKind {
        BlockKind::Dialogue
    }

    fn current_prompt(&self) -> Prompt {
        match self.cfg.dialogues.get(self.current) {
            Some(d) => Prompt::Dialogue {
                instructions: self.cfg.instructions.clone(),
                position: self.current + 1,
                total: self.cfg.dialogues.len(),
                speaker_a: d.english(SpeakerSlot::A).to_string(),
                speaker_b: d.english(SpeakerSlot::B).to_string(),
                transcript_a: self.turn.transcript[0].clone(),
                transcript_b: self.turn.transcript[1].clone(),
                submitted_a: self.turn.submitted[0].is_some(),
                submitted_b: self.turn.submitted[1].is_some(),
            },
            None => Prompt::Finished { kind: BlockKind::Dialogue, message: "All dialogue exercises completed!".into() },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        match input {
            Input::TranscriptReceived { text, speaker } => {
                let slot = slot_index(speaker);
                if self.done() || self.turn.submitted[slot].is_some() {
                    return Ok(Outcome::ignored(self.done()));
                }
                self.turn.transcript[slot] = Some(text.to_lowercase());
                Ok(Outcome::pending(false))
            }
            Input::SpeakerSubmitted { speaker } => {
                let slot = slot_index(speaker);
                let Some(turn) = self.cfg.dialogues.get(self.current) else {
                    return Ok(Outcome::ignored(true));
                };
                if self.turn.submitted[slot].is_some() {
                    return Ok(Outcome::ignored(false));
                }
                let expected = turn.spanish(speaker).to_string();
                let heard = self.turn.transcript[slot].as_deref().unwrap_or_default();
                let correct = normalize_spoken(heard) == normalize_spoken(&expected);
                self.turn.submitted[slot] = Some(correct);

                let both = self.turn.submitted.iter().all(Option::is_some);
                if both {
                    self.current += 1;
                    self.turn = Turn::default();
                }
                let verdict = if correct { Verdict::Correct } else { Verdict::Incorrect };
                let mut out = Outcome::graded(correct, self.done()).with_feedback(Feedback::new(verdict).with_expected(expected));
                // A speaker line is graded, but the turn only closes with both lines in.
                out.unit_complete = both;
                Ok(out)
            }
            other => Err(unsupported_input(BlockKind::Dialogue, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.done()
    }
}
