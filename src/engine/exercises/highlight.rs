//! Highlight: pick the words of a sentence that answer a question. Partial credit.

use std::collections::BTreeSet;

use crate::domain::{BlockConfig, BlockKind, HighlightConfig};
use crate::engine::exercises::{check_index, typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, Mark, Outcome, Points, Prompt, Verdict};
use crate::error::{EngineError, Result};

pub struct Highlight {
    cfg: HighlightConfig,
    current: usize,
    selected: BTreeSet<usize>,
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::Highlight(cfg) = typed_config(BlockKind::Highlight, value)? else {
        return Err(EngineError::invalid("expected a highlight config"));
    };
    Ok(Box::new(Highlight { cfg, current: 0, selected: BTreeSet::new() }))
}

/// Credit for one exercise. `selected` is in sentence order.
///
/// The rules are checked in this order: everything right and nothing wrong is
/// full credit; at most one correct word missing and nothing wrong is 0.75; a
/// single correct first word and nothing wrong is 0.5 (only reachable when the
/// 0.75 rule did not already apply).
pub fn highlight_credit(selected: &[&str], correct_words: &[String]) -> Points {
    let is_correct = |w: &str| correct_words.iter().any(|c| c == w);
    let correct_count = selected.iter().filter(|w| is_correct(**w)).count();
    let incorrect_count = selected.len() - correct_count;

    if incorrect_count > 0 {
        return Points::ZERO;
    }
    if correct_count == correct_words.len() {
        Points::ONE
    } else if correct_count + 1 >= correct_words.len() {
        Points::THREE_QUARTERS
    } else if correct_count == 1 && selected.first().is_some_and(|w| is_correct(*w)) {
        Points::HALF
    } else {
        Points::ZERO
    }
}

impl Highlight {
    fn done(&self) -> bool {
        self.current >= self.cfg.exercises.len()
    }
}

impl Exercise for Highlight {
    fn kind(&self) -> BlockKind {
        BlockKind::Highlight
    }

    fn current_prompt(&self) -> Prompt {
        match self.cfg.exercises.get(self.current) {
            Some(item) => Prompt::Highlight {
                instructions: self.cfg.instructions.clone(),
                position: self.current + 1,
                total: self.cfg.exercises.len(),
                words: item.words().into_iter().map(String::from).collect(),
                question: item.question.clone(),
                selected: self.selected.iter().copied().collect(),
            },
            None => Prompt::Finished { kind: BlockKind::Highlight, message: "All highlight exercises completed!".into() },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        if self.done() && matches!(input, Input::ItemToggled { .. } | Input::Submit) {
            return Ok(Outcome::ignored(true));
        }
        match input {
            Input::ItemToggled { index } => {
                let item = &self.cfg.exercises[self.current];
                check_index(index, item.words().len(), "word")?;
                if !self.selected.remove(&index) {
                    self.selected.insert(index);
                }
                Ok(Outcome::pending(false))
            }
            Input::Submit => {
                let item = &self.cfg.exercises[self.current];
                let words = item.words();
                let picked: Vec<&str> = self.selected.iter().map(|&i| words[i]).collect();
                let awarded = highlight_credit(&picked, &item.correct_words);
                let marks = self
                    .selected
                    .iter()
                    .map(|&i| if item.correct_words.iter().any(|c| c == words[i]) { Mark::correct(i) } else { Mark::wrong(i) })
                    .collect();
                let verdict = if awarded == Points::ONE {
                    Verdict::Correct
                } else if awarded.is_zero() {
                    Verdict::Incorrect
                } else {
                    Verdict::Partial
                };
                let feedback = Feedback::new(verdict).with_expected(item.correct_words.join(", ")).with_marks(marks);

                self.current += 1;
                self.selected.clear();
                Ok(Outcome { awarded, unit_complete: true, exercise_complete: self.done(), feedback })
            }
            other => Err(unsupported_input(BlockKind::Highlight, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HighlightItem;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn exact_selection_is_full_credit() {
        let correct = words(&["gato", "perro", "pez"]);
        assert_eq!(highlight_credit(&["gato", "perro", "pez"], &correct), Points::ONE);
    }

    #[test]
    fn one_missing_word_is_three_quarters() {
        let correct = words(&["gato", "perro", "pez"]);
        assert_eq!(highlight_credit(&["gato", "pez"], &correct), Points::THREE_QUARTERS);
    }

    #[test]
    fn only_first_correct_word_is_half() {
        let correct = words(&["gato", "perro", "pez"]);
        assert_eq!(highlight_credit(&["gato"], &correct), Points::HALF);
    }

    #[test]
    fn any_incorrect_word_is_zero() {
        let correct = words(&["gato", "perro", "pez"]);
        assert_eq!(highlight_credit(&["el", "gato", "perro", "pez"], &correct), Points::ZERO);
    }

    #[test]
    fn single_correct_word_list_takes_the_three_quarter_branch_first() {
        let correct = words(&["gato"]);
        assert_eq!(highlight_credit(&["gato"], &correct), Points::ONE);
        assert_eq!(highlight_credit(&[], &correct), Points::THREE_QUARTERS);
    }

    #[test]
    fn scores_are_additive_across_exercises() {
        let cfg = HighlightConfig {
            instructions: "Select the animals".into(),
            exercises: vec![
                HighlightItem { text: "el gato y el perro".into(), question: "Animals?".into(), correct_words: words(&["gato", "perro"]) },
                HighlightItem { text: "un pez azul".into(), question: "Animals?".into(), correct_words: words(&["pez"]) },
            ],
        };
        let mut ex = Highlight { cfg, current: 0, selected: BTreeSet::new() };

        ex.submit(Input::ItemToggled { index: 1 }).unwrap();
        let first = ex.submit(Input::Submit).unwrap();
        assert_eq!(first.awarded, Points::THREE_QUARTERS);
        assert_eq!(first.feedback.verdict, Verdict::Partial);
        assert!(!first.exercise_complete);

        ex.submit(Input::ItemToggled { index: 1 }).unwrap();
        ex.submit(Input::ItemToggled { index: 1 }).unwrap();
        ex.submit(Input::ItemToggled { index: 1 }).unwrap();
        let second = ex.submit(Input::Submit).unwrap();
        assert_eq!(second.awarded, Points::ONE);
        assert!(second.exercise_complete);
        assert_eq!((first.awarded + second.awarded).as_f64(), 1.75);
    }

    #[test]
    fn toggling_past_the_sentence_is_invalid() {
        let cfg = HighlightConfig {
            instructions: String::new(),
            exercises: vec![HighlightItem { text: "hola".into(), question: String::new(), correct_words: words(&["hola"]) }],
        };
        let mut ex = Highlight { cfg, current: 0, selected: BTreeSet::new() };
        assert!(ex.submit(Input::ItemToggled { index: 4 }).is_err());
    }
}
