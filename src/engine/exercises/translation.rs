//! Translation: one typed sentence, graded once.

use crate::domain::{BlockConfig, BlockKind, TranslationItem};
use crate::engine::exercises::{typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, Outcome, Prompt, Verdict};
use crate::error::{EngineError, Result};
use crate::util::typed_answer_matches;

pub struct Translation {
    instructions: String,
    item: TranslationItem,
    answered: Option<bool>,
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::Translation(cfg) = typed_config(BlockKind::Translation, value)? else {
        return Err(EngineError::invalid("expected a translation config"));
    };
    let item = cfg.item().ok_or_else(|| EngineError::invalid("translation has no sentence"))?;
    Ok(Box::new(Translation { instructions: cfg.instructions, item, answered: None }))
}

impl Exercise for Translation {
    fn kind(&self) -> BlockKind {
        BlockKind::Translation
    }

    fn current_prompt(&self) -> Prompt {
        match self.answered {
            None => Prompt::Translation {
                instructions: self.instructions.clone(),
                sentence: self.item.sentence.clone(),
                vocabulary: self.item.vocabulary.clone(),
            },
            Some(true) => Prompt::Finished {
                kind: BlockKind::Translation,
                message: "Correct! Your translation was accurate.".into(),
            },
            Some(false) => Prompt::Finished {
                kind: BlockKind::Translation,
                message: format!("Correct translation: {}", self.item.correct_answer),
            },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        match input {
            Input::TextSubmitted { value } => {
                if self.answered.is_some() {
                    return Ok(Outcome::ignored(true));
                }
                let correct = typed_answer_matches(&value, &self.item.correct_answer);
                self.answered = Some(correct);
                let verdict = if correct { Verdict::Correct } else { Verdict::Incorrect };
                Ok(Outcome::graded(correct, true)
                    .with_feedback(Feedback::new(verdict).with_expected(self.item.correct_answer.clone())))
            }
            other => Err(unsupported_input(BlockKind::Translation, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.answered.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::exercises::testing::ctx;
    use crate::engine::Points;
    use serde_json::json;

    fn translation() -> Box<dyn Exercise> {
        build(
            &json!({"instructions": "Translate", "sentence": "I want coffee", "correctAnswer": "Quiero café", "vocabulary": ["café"]}),
            ctx(),
        )
        .unwrap()
    }

    #[test]
    fn correct_answer_scores_once_and_ends_block() {
        let mut ex = translation();
        let out = ex.submit(Input::TextSubmitted { value: " quiero CAFÉ ".into() }).unwrap();
        assert_eq!(out.awarded, Points::ONE);
        assert!(out.exercise_complete);

        let again = ex.submit(Input::TextSubmitted { value: "quiero café".into() }).unwrap();
        assert_eq!(again.awarded, Points::ZERO);
        assert_eq!(again.feedback.verdict, Verdict::Ignored);
    }

    #[test]
    fn wrong_answer_is_terminal_too() {
        let mut ex = translation();
        let out = ex.submit(Input::TextSubmitted { value: "quiero té".into() }).unwrap();
        assert_eq!(out.awarded, Points::ZERO);
        assert!(out.exercise_complete);
        assert_eq!(out.feedback.expected.as_deref(), Some("Quiero café"));
    }

    #[test]
    fn unconfigured_translation_is_invalid() {
        assert!(build(&json!({}), ctx()).is_err());
    }
}
