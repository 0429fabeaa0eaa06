//! Image matching: select one of five images, then drop it into the box the question names.

use crate::domain::{BlockConfig, BlockKind, ImageClickConfig, IMAGE_SLOTS};
use crate::engine::exercises::{check_index, typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, Mark, Outcome, Prompt, Verdict};
use crate::error::{EngineError, Result};

pub struct ImageMatch {
    cfg: ImageClickConfig,
    current: usize,
    selected: Option<usize>,
    filled: [Option<usize>; IMAGE_SLOTS],
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::ImageClick(cfg) = typed_config(BlockKind::ImageClick, value)? else {
        return Err(EngineError::invalid("expected an imageclick config"));
    };
    Ok(Box::new(ImageMatch::new(cfg)))
}

impl ImageMatch {
    pub fn new(cfg: ImageClickConfig) -> Self {
        Self { cfg, current: 0, selected: None, filled: [None; IMAGE_SLOTS] }
    }

    fn done(&self) -> bool {
        self.current >= self.cfg.questions.len()
    }
}

impl Exercise for ImageMatch {
    fn kind(&self) -> BlockKind {
        BlockKind::ImageClick
    }

    fn current_prompt(&self) -> Prompt {
        match self.cfg.questions.get(self.current) {
            Some(q) => Prompt::ImageClick {
                instructions: self.cfg.instructions.clone(),
                position: self.current + 1,
                total: self.cfg.questions.len(),
                images: self.cfg.images().iter().map(|s| s.to_string()).collect(),
                question: q.text.clone(),
                target_box: q.correct_box - 1,
                selected_image: self.selected,
                filled: self.filled.to_vec(),
            },
            None => Prompt::Finished {
                kind: BlockKind::ImageClick,
                message: "All image matching exercises completed!".into(),
            },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        match input {
            Input::OptionSelected { id } => {
                check_index(id, IMAGE_SLOTS, "image")?;
                if self.done() {
                    return Ok(Outcome::ignored(true));
                }
                self.selected = Some(id);
                Ok(Outcome::pending(false))
            }
            Input::BoxClicked { index } => {
                check_index(index, IMAGE_SLOTS, "box")?;
                let Some(q) = self.cfg.questions.get(self.current) else {
                    return Ok(Outcome::ignored(true));
                };
                // Only the question's own box takes a placement.
                let Some(image) = self.selected.filter(|_| index == q.correct_box - 1) else {
                    return Ok(Outcome::ignored(false));
                };
                let correct = image == q.correct_image - 1;
                let mark = if correct { Mark::correct(index) } else { Mark::wrong(index) };
                let verdict = if correct { Verdict::Correct } else { Verdict::Incorrect };
                self.filled[index] = Some(image);
                self.selected = None;
                self.current += 1;
                Ok(Outcome::graded(correct, self.done()).with_feedback(Feedback::new(verdict).with_marks(vec![mark])))
            }
            other => Err(unsupported_input(BlockKind::ImageClick, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageQuestion;
    use crate::engine::Points;

    fn animals() -> ImageMatch {
        ImageMatch::new(ImageClickConfig {
            instructions: "Match the animals".into(),
            image1: "gato.png".into(),
            image2: "perro.png".into(),
            image3: "pez.png".into(),
            image4: "pajaro.png".into(),
            image5: "caballo.png".into(),
            questions: vec![
                ImageQuestion { text: "el perro".into(), correct_box: 3, correct_image: 2 },
                ImageQuestion { text: "el pez".into(), correct_box: 1, correct_image: 3 },
            ],
        })
    }

    #[test]
    fn placement_in_other_boxes_is_ignored() {
        let mut ex = animals();
        ex.submit(Input::OptionSelected { id: 1 }).unwrap();
        let out = ex.submit(Input::BoxClicked { index: 0 }).unwrap();
        assert_eq!(out.feedback.verdict, Verdict::Ignored);
        assert!(matches!(ex.current_prompt(), Prompt::ImageClick { position: 1, selected_image: Some(1), .. }));
    }

    #[test]
    fn placement_without_selection_is_ignored() {
        let mut ex = animals();
        let out = ex.submit(Input::BoxClicked { index: 2 }).unwrap();
        assert_eq!(out.feedback.verdict, Verdict::Ignored);
    }

    #[test]
    fn correct_image_in_target_box_scores() {
        let mut ex = animals();
        ex.submit(Input::OptionSelected { id: 1 }).unwrap();
        let first = ex.submit(Input::BoxClicked { index: 2 }).unwrap();
        assert_eq!(first.awarded, Points::ONE);
        assert!(!first.exercise_complete);

        ex.submit(Input::OptionSelected { id: 4 }).unwrap();
        let second = ex.submit(Input::BoxClicked { index: 0 }).unwrap();
        assert_eq!(second.awarded, Points::ZERO);
        assert!(second.unit_complete);
        assert!(second.exercise_complete);
        assert!(ex.is_exercise_complete());
    }

    #[test]
    fn filled_boxes_persist_across_questions() {
        let mut ex = animals();
        ex.submit(Input::OptionSelected { id: 1 }).unwrap();
        ex.submit(Input::BoxClicked { index: 2 }).unwrap();
        let Prompt::ImageClick { filled, target_box, .. } = ex.current_prompt() else { panic!("expected image prompt") };
        assert_eq!(filled[2], Some(1));
        assert_eq!(target_box, 0);
    }

    #[test]
    fn out_of_range_image_is_invalid() {
        let mut ex = animals();
        assert!(ex.submit(Input::OptionSelected { id: 5 }).is_err());
    }
}
