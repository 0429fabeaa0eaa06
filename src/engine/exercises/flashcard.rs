//! Flashcards: type the Spanish side of each card before the deck timer runs out.

use crate::domain::{BlockConfig, BlockKind, FlashcardConfig};
use crate::engine::exercises::{typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, Outcome, Points, Prompt, Verdict};
use crate::error::{EngineError, Result};
use crate::util::typed_answer_matches;

pub struct Flashcard {
    cfg: FlashcardConfig,
    current: usize,
    flipped: bool,
    remaining: i64,
    expired: bool,
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::Flashcard(cfg) = typed_config(BlockKind::Flashcard, value)? else {
        return Err(EngineError::invalid("expected a flashcard config"));
    };
    Ok(Box::new(Flashcard::new(cfg)))
}

impl Flashcard {
    pub fn new(cfg: FlashcardConfig) -> Self {
        let remaining = i64::try_from(cfg.time_limit).unwrap_or(i64::MAX);
        Self { cfg, current: 0, flipped: false, remaining, expired: false }
    }

    fn cards_done(&self) -> bool {
        self.current >= self.cfg.cards.len()
    }

    fn time_up() -> Outcome {
        Outcome {
            awarded: Points::ZERO,
            unit_complete: false,
            exercise_complete: true,
            feedback: Feedback::new(Verdict::TimeUp),
        }
    }
}

impl Exercise for Flashcard {
    fn kind(&self) -> BlockKind {
        BlockKind::Flashcard
    }

    fn current_prompt(&self) -> Prompt {
        if self.expired {
            return Prompt::Finished { kind: BlockKind::Flashcard, message: "Time is up!".into() };
        }
        match self.cfg.cards.get(self.current) {
            Some(card) => Prompt::Flashcard {
                instructions: self.cfg.instructions.clone(),
                front: card.english.clone(),
                back: card.spanish.clone(),
                flipped: self.flipped,
                cards_remaining: self.cfg.cards.len() - self.current,
                total: self.cfg.cards.len(),
                time_remaining: self.remaining.max(0),
            },
            None => Prompt::Finished { kind: BlockKind::Flashcard, message: "All flashcards completed!".into() },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        match input {
            Input::TimerTick { remaining_seconds } => {
                if self.is_exercise_complete() {
                    return Ok(Outcome::ignored(true));
                }
                self.remaining = remaining_seconds;
                if remaining_seconds < 0 {
                    self.expired = true;
                    return Ok(Self::time_up());
                }
                Ok(Outcome::pending(false))
            }
            // The timer wins any race with an answer.
            _ if self.expired => Ok(Self::time_up()),
            Input::Flip => {
                if !self.cards_done() {
                    self.flipped = !self.flipped;
                }
                Ok(Outcome::pending(self.cards_done()))
            }
            Input::TextSubmitted { value } => {
                let Some(card) = self.cfg.cards.get(self.current) else {
                    return Ok(Outcome::ignored(true));
                };
                let correct = typed_answer_matches(&value, &card.spanish);
                let expected = card.spanish.clone();
                self.current += 1;
                self.flipped = false;
                Ok(Outcome::graded(correct, self.cards_done())
                    .with_feedback(Feedback::new(if correct { Verdict::Correct } else { Verdict::Incorrect }).with_expected(expected)))
            }
            other => Err(unsupported_input(BlockKind::Flashcard, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.expired || self.cards_done()
    }

    fn timer_remaining(&self) -> Option<i64> {
        (!self.is_exercise_complete()).then_some(self.remaining)
    }
}
