//! Sentence match: select a green prompt card, then one of the white cards that completes it.
//!
//! Any white card of the selected prompt counts as a match, and nothing stops the
//! same prompt from being matched more than once. The block ends once the number
//! of matches reaches the number of sentences.

use crate::domain::{BlockConfig, BlockKind, SentenceMatchConfig};
use crate::engine::exercises::{check_index, typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, MatchCardView, Outcome, Points, Prompt, Verdict};
use crate::error::{EngineError, Result};

pub struct SentenceMatch {
    cfg: SentenceMatchConfig,
    selected_prompt: Option<usize>,
    matched: usize,
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::SentenceMatch(cfg) = typed_config(BlockKind::SentenceMatch, value)? else {
        return Err(EngineError::invalid("expected a sentencematch config"));
    };
    Ok(Box::new(SentenceMatch { cfg, selected_prompt: None, matched: 0 }))
}

impl SentenceMatch {
    fn done(&self) -> bool {
        self.matched >= self.cfg.sentences.len()
    }
}

impl Exercise for SentenceMatch {
    fn kind(&self) -> BlockKind {
        BlockKind::SentenceMatch
    }

    fn current_prompt(&self) -> Prompt {
        Prompt::SentenceMatch {
            instructions: self.cfg.instructions.clone(),
            cards: self
                .cfg
                .sentences
                .iter()
                .map(|s| MatchCardView { green_card: s.green_card.clone(), white_cards: s.white_cards.clone() })
                .collect(),
            selected_prompt: self.selected_prompt,
            matched: self.matched,
            total: self.cfg.sentences.len(),
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        match input {
            Input::PromptSelected { index } => {
                check_index(index, self.cfg.sentences.len(), "prompt card")?;
                self.selected_prompt = Some(index);
                Ok(Outcome::pending(self.done()))
            }
            Input::CompletionSelected { sentence, card } => {
                check_index(sentence, self.cfg.sentences.len(), "sentence")?;
                check_index(card, self.cfg.sentences[sentence].white_cards.len(), "white card")?;
                if self.done() {
                    return Ok(Outcome::ignored(true));
                }
                if self.selected_prompt != Some(sentence) {
                    return Ok(Outcome {
                        awarded: Points::ZERO,
                        unit_complete: false,
                        exercise_complete: false,
                        feedback: Feedback::new(Verdict::Incorrect),
                    });
                }
                self.matched += 1;
                Ok(Outcome::graded(true, self.done()))
            }
            other => Err(unsupported_input(BlockKind::SentenceMatch, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MatchSentence;

    fn cards() -> SentenceMatch {
        SentenceMatch {
            cfg: SentenceMatchConfig {
                instructions: "Complete the sentences".into(),
                sentences: vec![
                    MatchSentence { green_card: "Yo tengo".into(), white_cards: vec!["hambre".into(), "sed".into()] },
                    MatchSentence { green_card: "Ella es".into(), white_cards: vec!["alta".into()] },
                ],
            },
            selected_prompt: None,
            matched: 0,
        }
    }

    #[test]
    fn completion_of_another_prompt_scores_nothing() {
        let mut ex = cards();
        ex.submit(Input::PromptSelected { index: 0 }).unwrap();
        let out = ex.submit(Input::CompletionSelected { sentence: 1, card: 0 }).unwrap();
        assert_eq!(out.awarded, Points::ZERO);
        assert_eq!(out.feedback.verdict, Verdict::Incorrect);
    }

    #[test]
    fn any_completion_of_the_selected_prompt_matches() {
        let mut ex = cards();
        ex.submit(Input::PromptSelected { index: 0 }).unwrap();
        assert_eq!(ex.submit(Input::CompletionSelected { sentence: 0, card: 1 }).unwrap().awarded, Points::ONE);
        ex.submit(Input::PromptSelected { index: 1 }).unwrap();
        let last = ex.submit(Input::CompletionSelected { sentence: 1, card: 0 }).unwrap();
        assert!(last.exercise_complete);
    }

    #[test]
    fn repeated_matches_of_one_prompt_count_toward_completion() {
        let mut ex = cards();
        ex.submit(Input::PromptSelected { index: 0 }).unwrap();
        ex.submit(Input::CompletionSelected { sentence: 0, card: 0 }).unwrap();
        let second = ex.submit(Input::CompletionSelected { sentence: 0, card: 0 }).unwrap();
        assert_eq!(second.awarded, Points::ONE);
        assert!(second.exercise_complete);
    }

    #[test]
    fn unknown_cards_are_invalid() {
        let mut ex = cards();
        assert!(ex.submit(Input::PromptSelected { index: 2 }).is_err());
        assert!(ex.submit(Input::CompletionSelected { sentence: 1, card: 1 }).is_err());
    }
}
