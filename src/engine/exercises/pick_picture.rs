//! Pick the picture: select every image that shows the verb. All or nothing.

use std::collections::BTreeSet;

use crate::domain::{BlockConfig, BlockKind, PickPictureConfig};
use crate::engine::exercises::{check_index, typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, Mark, Outcome, Prompt, Verdict};
use crate::error::{EngineError, Result};

pub struct PickPicture {
    cfg: PickPictureConfig,
    current: usize,
    selected: BTreeSet<usize>,
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::PickPicture(cfg) = typed_config(BlockKind::PickPicture, value)? else {
        return Err(EngineError::invalid("expected a pickpicture config"));
    };
    Ok(Box::new(PickPicture { cfg, current: 0, selected: BTreeSet::new() }))
}

impl PickPicture {
    fn done(&self) -> bool {
        self.current >= self.cfg.exercises.len()
    }
}

impl Exercise for PickPicture {
    fn kind(&self) -> BlockKind {
        BlockKind::PickPicture
    }

    fn current_prompt(&self) -> Prompt {
        match self.cfg.exercises.get(self.current) {
            Some(e) => Prompt::PickPicture {
                instructions: self.cfg.instructions.clone(),
                position: self.current + 1,
                total: self.cfg.exercises.len(),
                verb: e.verb.clone(),
                images: e.images.clone(),
                selected: self.selected.iter().copied().collect(),
            },
            None => Prompt::Finished {
                kind: BlockKind::PickPicture,
                message: "All picture selection exercises completed!".into(),
            },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        if self.done() && matches!(input, Input::ItemToggled { .. } | Input::Submit) {
            return Ok(Outcome::ignored(true));
        }
        match input {
            Input::ItemToggled { index } => {
                check_index(index, self.cfg.exercises[self.current].images.len(), "image")?;
                if !self.selected.remove(&index) {
                    self.selected.insert(index);
                }
                Ok(Outcome::pending(false))
            }
            Input::Submit => {
                let expected: BTreeSet<usize> = self.cfg.exercises[self.current].correct_answers.iter().copied().collect();
                let correct = self.selected == expected;
                let marks = self
                    .selected
                    .iter()
                    .map(|&i| if expected.contains(&i) { Mark::correct(i) } else { Mark::wrong(i) })
                    .collect();
                let verdict = if correct { Verdict::Correct } else { Verdict::Incorrect };
                self.current += 1;
                self.selected.clear();
                Ok(Outcome::graded(correct, self.done()).with_feedback(Feedback::new(verdict).with_marks(marks)))
            }
            other => Err(unsupported_input(BlockKind::PickPicture, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.done()
    }
}
