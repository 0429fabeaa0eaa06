//! Accents: mark every letter of a sentence that needs a diacritic.
//!
//! A sentence is submitted once; the graded view stays up until the learner
//! moves on explicitly.

use std::collections::BTreeSet;

use crate::domain::{AccentConfig, BlockConfig, BlockKind};
use crate::engine::exercises::{check_index, typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, LetterView, Mark, Outcome, Phase, Prompt, Verdict};
use crate::error::{EngineError, Result};

pub struct Accent {
    cfg: AccentConfig,
    current: usize,
    selected: BTreeSet<usize>,
    evaluated: bool,
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::Accent(cfg) = typed_config(BlockKind::Accent, value)? else {
        return Err(EngineError::invalid("expected an accent config"));
    };
    Ok(Box::new(Accent::new(cfg)))
}

/// Grade one selection against the correction positions.
/// Returns whether it is exact plus per-position marks (with the accented letter
/// for correctly selected positions).
pub fn grade_accents(selected: &BTreeSet<usize>, corrections: &[crate::domain::Correction]) -> (bool, Vec<Mark>) {
    let required: BTreeSet<usize> = corrections.iter().map(|c| c.index).collect();
    let mut marks: Vec<Mark> = required
        .iter()
        .map(|&i| {
            if selected.contains(&i) {
                let accent = corrections.iter().find(|c| c.index == i).map(|c| c.accent.clone());
                Mark { replacement: accent, ..Mark::correct(i) }
            } else {
                Mark::wrong(i)
            }
        })
        .collect();
    marks.extend(selected.difference(&required).map(|&i| Mark::wrong(i)));
    marks.sort_by_key(|m| m.index);
    (*selected == required, marks)
}

impl Accent {
    pub fn new(cfg: AccentConfig) -> Self {
        Self { cfg, current: 0, selected: BTreeSet::new(), evaluated: false }
    }

    fn done(&self) -> bool {
        self.current >= self.cfg.sentences.len()
    }
}

impl Exercise for Accent {
    fn kind(&self) -> BlockKind {
        BlockKind::Accent
    }

    fn current_prompt(&self) -> Prompt {
        match self.cfg.sentences.get(self.current) {
            Some(s) => Prompt::Accent {
                instructions: self.cfg.instructions.clone(),
                position: self.current + 1,
                total: self.cfg.sentences.len(),
                letters: s
                    .text
                    .chars()
                    .enumerate()
                    .map(|(index, letter)| LetterView { index, letter, selectable: !letter.is_whitespace() })
                    .collect(),
                selected: self.selected.iter().copied().collect(),
                evaluated: self.evaluated,
            },
            None => Prompt::Finished { kind: BlockKind::Accent, message: "All accent exercises completed!".into() },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        if self.done() {
            return match input {
                Input::ItemToggled { .. } | Input::Submit | Input::Continue => Ok(Outcome::ignored(true)),
                other => Err(unsupported_input(BlockKind::Accent, &other)),
            };
        }
        match input {
            Input::ItemToggled { index } => {
                if self.evaluated {
                    return Ok(Outcome::ignored(false));
                }
                let text = &self.cfg.sentences[self.current].text;
                check_index(index, text.chars().count(), "letter")?;
                if text.chars().nth(index).is_some_and(char::is_whitespace) {
                    return Err(EngineError::invalid(format!("position {index} is not a letter")));
                }
                if !self.selected.remove(&index) {
                    self.selected.insert(index);
                }
                Ok(Outcome::pending(false))
            }
            Input::Submit => {
                if self.evaluated {
                    return Ok(Outcome::ignored(false));
                }
                let (correct, marks) = grade_accents(&self.selected, &self.cfg.sentences[self.current].corrections);
                self.evaluated = true;
                let verdict = if correct { Verdict::Correct } else { Verdict::Incorrect };
                Ok(Outcome::graded(correct, false).with_feedback(Feedback::new(verdict).with_marks(marks)))
            }
            Input::Continue => {
                if !self.evaluated {
                    return Err(EngineError::invalid("submit the sentence before moving on"));
                }
                self.current += 1;
                self.selected.clear();
                self.evaluated = false;
                Ok(Outcome::pending(self.done()))
            }
            other => Err(unsupported_input(BlockKind::Accent, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.done()
    }

    fn phase(&self) -> Phase {
        if self.done() {
            Phase::Done
        } else if self.evaluated {
            Phase::Evaluated
        } else {
            Phase::Presenting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccentSentence, Correction};
    use crate::engine::{MarkState, Points};

    // "el nino esta aqui": n(5)->ñ, a(11)->á, i(16)->í
    fn sentence() -> Accent {
        Accent::new(AccentConfig {
            instructions: "Add the accents".into(),
            sentences: vec![AccentSentence {
                text: "el nino esta aqui".into(),
                corrections: vec![
                    Correction { index: 5, accent: "ñ".into() },
                    Correction { index: 11, accent: "á".into() },
                    Correction { index: 16, accent: "í".into() },
                ],
            }],
        })
    }

    fn select(ex: &mut Accent, positions: &[usize]) {
        for &i in positions {
            ex.submit(Input::ItemToggled { index: i }).unwrap();
        }
    }

    #[test]
    fn exact_positions_score_one_point() {
        let mut ex = sentence();
        select(&mut ex, &[16, 5, 11]);
        let out = ex.submit(Input::Submit).unwrap();
        assert_eq!(out.awarded, Points::ONE);
        assert!(out.feedback.marks.iter().all(|m| m.state == MarkState::Correct));
        assert_eq!(out.feedback.marks[0].replacement.as_deref(), Some("ñ"));
    }

    #[test]
    fn superset_and_subset_score_zero() {
        let mut superset = sentence();
        select(&mut superset, &[5, 11, 16, 0]);
        let out = superset.submit(Input::Submit).unwrap();
        assert_eq!(out.awarded, Points::ZERO);
        assert!(out.feedback.marks.iter().any(|m| m.index == 0 && m.state == MarkState::Wrong));

        let mut subset = sentence();
        select(&mut subset, &[5, 11]);
        let out = subset.submit(Input::Submit).unwrap();
        assert_eq!(out.awarded, Points::ZERO);
        assert!(out.feedback.marks.iter().any(|m| m.index == 16 && m.state == MarkState::Wrong));
    }

    #[test]
    fn one_submission_then_explicit_continue() {
        let mut ex = sentence();
        select(&mut ex, &[5, 11, 16]);
        ex.submit(Input::Submit).unwrap();
        assert_eq!(ex.phase(), Phase::Evaluated);
        assert!(!ex.is_exercise_complete());

        let again = ex.submit(Input::Submit).unwrap();
        assert_eq!(again.feedback.verdict, Verdict::Ignored);
        assert_eq!(again.awarded, Points::ZERO);

        let next = ex.submit(Input::Continue).unwrap();
        assert!(next.exercise_complete);
        assert_eq!(ex.phase(), Phase::Done);
    }

    #[test]
    fn continue_before_submit_is_invalid() {
        let mut ex = sentence();
        assert!(ex.submit(Input::Continue).is_err());
    }

    #[test]
    fn spaces_are_not_selectable() {
        let mut ex = sentence();
        assert!(ex.submit(Input::ItemToggled { index: 2 }).is_err());
        assert!(ex.submit(Input::ItemToggled { index: 40 }).is_err());
    }
}
