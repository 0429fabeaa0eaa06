//! Lesson runner: plays a lesson's blocks in order and keeps the score.
//!
//! The runner owns exactly one exercise machine at a time. Leaving a block drops
//! its machine; the next block always starts from a freshly built one.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::domain::Lesson;
use crate::engine::{BlockRegistry, BuildContext, Exercise, Feedback, Input, Outcome, Phase, Points, Prompt, ScoreLedger};
use crate::error::{EngineError, Result};

/// Knobs passed down to every exercise machine the runner builds.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub hotspot_hit_radius: f64,
    /// Fixed seed for shuffles and decoys; entropy when unset.
    pub rng_seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { hotspot_hit_radius: 5.0, rng_seed: None }
    }
}

/// Progression record of one playthrough.
#[derive(Clone, Debug, Serialize)]
pub struct RunnerState {
    pub lesson: Lesson,
    pub block_index: usize,
    pub score: Points,
}

/// Result of a successful `advance`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Advance {
    /// The block at `index` is now active.
    Block { index: usize },
    LessonComplete { final_score: Points },
}

/// Pure data snapshot for the presentation layer.
#[derive(Clone, Debug, Serialize)]
pub struct RenderState {
    pub lesson_id: String,
    pub lesson_name: String,
    pub lesson_date: String,
    pub block_index: usize,
    pub total_blocks: usize,
    pub block_kind: Option<String>,
    pub progress: f64,
    pub score: Points,
    pub prompt: Option<Prompt>,
    pub phase: Phase,
    pub feedback: Option<Feedback>,
    pub time_remaining: Option<i64>,
    pub next_block_available: bool,
    pub lesson_complete: bool,
}

pub struct LessonRunner {
    registry: Arc<BlockRegistry>,
    settings: EngineSettings,
    rng: StdRng,
    lesson: Option<Lesson>,
    block_index: usize,
    ledger: ScoreLedger,
    active: Option<Box<dyn Exercise>>,
    /// Why the current block could not be built; repeated on every later call.
    stalled: Option<EngineError>,
    last_feedback: Option<Feedback>,
    progress: watch::Sender<f64>,
}

impl LessonRunner {
    pub fn new(registry: Arc<BlockRegistry>, settings: EngineSettings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (progress, _) = watch::channel(0.0);
        Self {
            registry,
            settings,
            rng,
            lesson: None,
            block_index: 0,
            ledger: ScoreLedger::new(),
            active: None,
            stalled: None,
            last_feedback: None,
            progress,
        }
    }

    /// Receiver of the progress fraction `block_index / total_blocks`,
    /// updated after every transition.
    pub fn subscribe_progress(&self) -> watch::Receiver<f64> {
        self.progress.subscribe()
    }

    /// Begin a playthrough: index 0, score 0, first block instantiated.
    ///
    /// A first block that cannot be built (unsupported type, invalid config)
    /// leaves the lesson loaded but stalled; the error is returned here and
    /// again on every later call.
    #[instrument(level = "info", skip(self, lesson), fields(lesson_id = %lesson.id, blocks = lesson.blocks.len()))]
    pub fn start(&mut self, lesson: Lesson) -> Result<RenderState> {
        self.ledger.reset();
        self.block_index = 0;
        self.active = None;
        self.stalled = None;
        self.last_feedback = None;
        self.lesson = Some(lesson);
        self.publish_progress();
        info!(target: "lesson", "Lesson started");
        if !self.is_complete() {
            self.instantiate_current()?;
        }
        self.snapshot()
    }

    /// Route one input to the active block and bank whatever it awards.
    #[instrument(level = "debug", skip(self, input), fields(block = self.block_index, input = input.name()))]
    pub fn submit(&mut self, input: Input) -> Result<Outcome> {
        self.loaded()?;
        if self.is_complete() {
            return Err(EngineError::invalid("lesson already complete"));
        }
        let index = self.block_index;
        let exercise = self.active_mut()?;
        let out = exercise.submit(input)?;
        if out.unit_complete || !out.awarded.is_zero() {
            let total = self.ledger.award(out.awarded);
            debug!(target: "lesson", block = index, awarded = %out.awarded, total = %total, verdict = ?out.feedback.verdict, "Unit graded");
        }
        if out.exercise_complete {
            info!(target: "lesson", block = index, score = %self.ledger.total(), "Block complete");
        }
        self.last_feedback = Some(out.feedback.clone());
        Ok(out)
    }

    /// One period of the block timer. `None` when the active block runs no timer.
    pub fn tick(&mut self) -> Result<Option<Outcome>> {
        let remaining = match self.active.as_ref().and_then(|e| e.timer_remaining()) {
            Some(r) if !self.is_complete() => r,
            _ => return Ok(None),
        };
        let out = self.submit(Input::TimerTick { remaining_seconds: remaining - 1 })?;
        if out.exercise_complete && remaining - 1 < 0 {
            info!(target: "lesson", block = self.block_index, "Block timer expired");
        }
        Ok(Some(out))
    }

    /// Move to the next block once the active one is done. At the end of the
    /// lesson this reports the final score, any number of times.
    #[instrument(level = "info", skip(self), fields(block = self.block_index))]
    pub fn advance(&mut self) -> Result<Advance> {
        let total = self.loaded()?.blocks.len();
        if self.is_complete() {
            return Ok(Advance::LessonComplete { final_score: self.ledger.total() });
        }
        let done = self.active_mut()?.is_exercise_complete();
        if !done {
            return Err(EngineError::BlockInProgress { index: self.block_index });
        }

        self.active = None;
        self.last_feedback = None;
        self.block_index += 1;
        self.publish_progress();

        if self.block_index == total {
            let final_score = self.ledger.total();
            info!(target: "lesson", %final_score, units = self.ledger.awards(), "Lesson complete");
            return Ok(Advance::LessonComplete { final_score });
        }
        self.instantiate_current()?;
        Ok(Advance::Block { index: self.block_index })
    }

    pub fn snapshot(&self) -> Result<RenderState> {
        let lesson = self.loaded()?;
        let complete = self.is_complete();
        let block_done = self.active.as_ref().is_some_and(|e| e.is_exercise_complete());
        Ok(RenderState {
            lesson_id: lesson.id.clone(),
            lesson_name: lesson.name.clone(),
            lesson_date: lesson.date.clone(),
            block_index: self.block_index,
            total_blocks: lesson.blocks.len(),
            block_kind: lesson.blocks.get(self.block_index).map(|b| b.kind.clone()),
            progress: self.progress_fraction(),
            score: self.ledger.total(),
            prompt: self.active.as_ref().map(|e| e.current_prompt()),
            phase: match &self.active {
                _ if complete => Phase::Done,
                Some(e) => e.phase(),
                None => Phase::Presenting,
            },
            feedback: self.last_feedback.clone(),
            time_remaining: self.active.as_ref().and_then(|e| e.timer_remaining()),
            next_block_available: !complete && block_done,
            lesson_complete: complete,
        })
    }

    pub fn state(&self) -> Option<RunnerState> {
        self.lesson.as_ref().map(|lesson| RunnerState {
            lesson: lesson.clone(),
            block_index: self.block_index,
            score: self.ledger.total(),
        })
    }

    pub fn score(&self) -> Points {
        self.ledger.total()
    }

    pub fn is_complete(&self) -> bool {
        self.lesson.as_ref().is_some_and(|l| self.block_index >= l.blocks.len())
    }

    fn loaded(&self) -> Result<&Lesson> {
        self.lesson.as_ref().ok_or_else(|| EngineError::invalid("no lesson loaded"))
    }

    fn active_mut(&mut self) -> Result<&mut Box<dyn Exercise>> {
        if let Some(e) = &self.stalled {
            return Err(e.clone());
        }
        self.active.as_mut().ok_or_else(|| EngineError::invalid("no active block"))
    }

    fn instantiate_current(&mut self) -> Result<()> {
        let ctx = BuildContext {
            rng: StdRng::seed_from_u64(self.rng.gen()),
            hotspot_hit_radius: self.settings.hotspot_hit_radius,
        };
        let lesson = self.loaded()?;
        let block = lesson
            .blocks
            .get(self.block_index)
            .ok_or_else(|| EngineError::invalid(format!("no block at index {}", self.block_index)))?;
        match self.registry.instantiate(block, ctx) {
            Ok(exercise) => {
                info!(target: "lesson", block = self.block_index, kind = %block.kind, block_id = %block.id, "Block started");
                self.active = Some(exercise);
                Ok(())
            }
            Err(e) => {
                warn!(target: "lesson", block = self.block_index, kind = %block.kind, error = %e, "Block could not be instantiated");
                self.stalled = Some(e.clone());
                Err(e)
            }
        }
    }

    fn progress_fraction(&self) -> f64 {
        match self.lesson.as_ref().map(|l| l.blocks.len()) {
            Some(0) => 1.0,
            Some(total) => self.block_index as f64 / total as f64,
            None => 0.0,
        }
    }

    fn publish_progress(&self) {
        self.progress.send_replace(self.progress_fraction());
    }
}
