//! Lesson execution engine.
//!
//! A [`LessonRunner`] walks a lesson's blocks in order. For each block the
//! [`BlockRegistry`] builds a fresh [`Exercise`] machine from the block config;
//! the machine grades typed [`Input`]s and reports [`Outcome`]s whose points the
//! runner adds to its [`ScoreLedger`].

use serde::Serialize;

use crate::domain::BlockKind;
use crate::error::Result;

pub mod exercises;
pub mod input;
pub mod points;
pub mod registry;
pub mod runner;

pub use input::{Input, Recognition, RecognitionQueue};
pub use points::{Points, ScoreLedger};
pub use registry::{BlockRegistry, BuildContext, Constructor};
pub use runner::{Advance, EngineSettings, LessonRunner, RenderState, RunnerState};

/// Where a machine stands with respect to its current unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for input on the current unit.
    Presenting,
    /// The unit was graded and the learner has to move on explicitly.
    Evaluated,
    /// Terminal.
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Input accepted, nothing graded yet.
    Pending,
    Correct,
    Partial,
    Incorrect,
    /// Input had no effect (finished unit, non-target box, ...).
    Ignored,
    /// The block timer ran out.
    TimeUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkState {
    Correct,
    Wrong,
}

/// Per-element annotation, e.g. one letter of an accent sentence or one hotspot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mark {
    pub index: usize,
    pub state: MarkState,
    /// Text to show in place of the element (the accented letter).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl Mark {
    pub fn correct(index: usize) -> Self {
        Self { index, state: MarkState::Correct, replacement: None }
    }

    pub fn wrong(index: usize) -> Self {
        Self { index, state: MarkState::Wrong, replacement: None }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Feedback {
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Feedback {
    pub fn new(verdict: Verdict) -> Self {
        Self { verdict, expected: None, marks: Vec::new() }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }
}

/// Result of one submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outcome {
    pub awarded: Points,
    pub unit_complete: bool,
    pub exercise_complete: bool,
    pub feedback: Feedback,
}

impl Outcome {
    /// Input accepted without grading anything.
    pub fn pending(exercise_complete: bool) -> Self {
        Self {
            awarded: Points::ZERO,
            unit_complete: false,
            exercise_complete,
            feedback: Feedback::new(Verdict::Pending),
        }
    }

    pub fn ignored(exercise_complete: bool) -> Self {
        Self {
            awarded: Points::ZERO,
            unit_complete: false,
            exercise_complete,
            feedback: Feedback::new(Verdict::Ignored),
        }
    }

    /// One unit graded all-or-nothing.
    pub fn graded(correct: bool, exercise_complete: bool) -> Self {
        Self {
            awarded: if correct { Points::ONE } else { Points::ZERO },
            unit_complete: true,
            exercise_complete,
            feedback: Feedback::new(if correct { Verdict::Correct } else { Verdict::Incorrect }),
        }
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Common capability of every block-type state machine.
///
/// A machine owns all of its per-block state and is dropped when the runner
/// leaves the block. Once `is_exercise_complete` returns true it stays true.
pub trait Exercise: Send {
    fn kind(&self) -> BlockKind;

    /// Render-agnostic description of what to show right now.
    fn current_prompt(&self) -> Prompt;

    /// Apply one normalized input. Wrong answers are graded outcomes; only
    /// inputs the block cannot interpret are errors.
    fn submit(&mut self, input: Input) -> Result<Outcome>;

    fn is_exercise_complete(&self) -> bool;

    fn phase(&self) -> Phase {
        if self.is_exercise_complete() {
            Phase::Done
        } else {
            Phase::Presenting
        }
    }

    /// Seconds left on the block timer, for blocks that run one.
    fn timer_remaining(&self) -> Option<i64> {
        None
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotState {
    Unvisited,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpotView {
    pub x: f64,
    pub y: f64,
    pub state: SpotState,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuizView {
    pub spot: usize,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LetterView {
    pub index: usize,
    pub letter: char,
    pub selectable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchCardView {
    pub green_card: String,
    pub white_cards: Vec<String>,
}

/// What the presentation layer should show for the active block.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prompt {
    Flashcard {
        instructions: String,
        front: String,
        back: String,
        flipped: bool,
        cards_remaining: usize,
        total: usize,
        time_remaining: i64,
    },
    Translation {
        instructions: String,
        sentence: String,
        vocabulary: Vec<String>,
    },
    Hotspot {
        instructions: String,
        image_url: String,
        spots: Vec<SpotView>,
        remaining: usize,
        quiz: Option<QuizView>,
    },
    Highlight {
        instructions: String,
        position: usize,
        total: usize,
        words: Vec<String>,
        question: String,
        selected: Vec<usize>,
    },
    ImageClick {
        instructions: String,
        position: usize,
        total: usize,
        images: Vec<String>,
        question: String,
        target_box: usize,
        selected_image: Option<usize>,
        filled: Vec<Option<usize>>,
    },
    Dialogue {
        instructions: String,
        position: usize,
        total: usize,
        speaker_a: String,
        speaker_b: String,
        transcript_a: Option<String>,
        transcript_b: Option<String>,
        submitted_a: bool,
        submitted_b: bool,
    },
    SinglePhrase {
        instructions: String,
        position: usize,
        total: usize,
        prompt: String,
        last_transcript: Option<String>,
    },
    SentenceMatch {
        instructions: String,
        cards: Vec<MatchCardView>,
        selected_prompt: Option<usize>,
        matched: usize,
        total: usize,
    },
    PickPicture {
        instructions: String,
        position: usize,
        total: usize,
        verb: String,
        images: Vec<String>,
        selected: Vec<usize>,
    },
    Accent {
        instructions: String,
        position: usize,
        total: usize,
        letters: Vec<LetterView>,
        selected: Vec<usize>,
        evaluated: bool,
    },
    Spelling {
        instructions: String,
        position: usize,
        total: usize,
        hint: String,
        options: Vec<char>,
        picked: Vec<char>,
    },
    /// The block has nothing left to present.
    Finished { kind: BlockKind, message: String },
}
