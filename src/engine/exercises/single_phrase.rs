//! Single phrase: say the answer to a prompt. Mismatches are retried until right.

use crate::domain::{BlockConfig, BlockKind, SinglePhraseConfig};
use crate::engine::exercises::{typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, Outcome, Points, Prompt, Verdict};
use crate::error::{EngineError, Result};

pub struct SinglePhrase {
    cfg: SinglePhraseConfig,
    current: usize,
    last_transcript: Option<String>,
}

pub fn build(value: &serde_json::Value, _ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::SinglePhrase(cfg) = typed_config(BlockKind::SinglePhrase, value)? else {
        return Err(EngineError::invalid("expected a singlephrase config"));
    };
    Ok(Box::new(SinglePhrase { cfg, current: 0, last_transcript: None }))
}

impl SinglePhrase {
    fn done(&self) -> bool {
        self.current >= self.cfg.phrases.len()
    }
}

impl Exercise for SinglePhrase {
    fn kind(&self) -> BlockKind {
        BlockKind::SinglePhrase
    }

    fn current_prompt(&self) -> Prompt {
        match self.cfg.phrases.get(self.current) {
            Some(p) => Prompt::SinglePhrase {
                instructions: self.cfg.instructions.clone(),
                position: self.current + 1,
                total: self.cfg.phrases.len(),
                prompt: p.prompt.clone(),
                last_transcript: self.last_transcript.clone(),
            },
            None => Prompt::Finished { kind: BlockKind::SinglePhrase, message: "All phrase exercises completed!".into() },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        match input {
            Input::TranscriptReceived { text, .. } => {
                let Some(phrase) = self.cfg.phrases.get(self.current) else {
                    return Ok(Outcome::ignored(true));
                };
                let heard = text.to_lowercase();
                if heard == phrase.answer.to_lowercase() {
                    self.current += 1;
                    self.last_transcript = None;
                    return Ok(Outcome::graded(true, self.done()));
                }
                self.last_transcript = Some(heard);
                Ok(Outcome {
                    awarded: Points::ZERO,
                    unit_complete: false,
                    exercise_complete: false,
                    feedback: Feedback::new(Verdict::Incorrect),
                })
            }
            other => Err(unsupported_input(BlockKind::SinglePhrase, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Phrase, SpeakerSlot};

    fn said(text: &str) -> Input {
        Input::TranscriptReceived { text: text.into(), speaker: SpeakerSlot::A }
    }

    fn phrases() -> SinglePhrase {
        SinglePhrase {
            cfg: SinglePhraseConfig {
                instructions: "Answer aloud".into(),
                phrases: vec![
                    Phrase { prompt: "How do you say thanks?".into(), answer: "Gracias".into() },
                    Phrase { prompt: "How do you say please?".into(), answer: "por favor".into() },
                ],
            },
            current: 0,
            last_transcript: None,
        }
    }

    #[test]
    fn mismatch_retries_the_same_phrase() {
        let mut ex = phrases();
        for _ in 0..3 {
            let out = ex.submit(said("grasias")).unwrap();
            assert_eq!(out.awarded, Points::ZERO);
            assert!(!out.unit_complete);
        }
        assert!(matches!(ex.current_prompt(), Prompt::SinglePhrase { position: 1, .. }));
    }

    #[test]
    fn each_match_scores_and_advances() {
        let mut ex = phrases();
        assert_eq!(ex.submit(said("GRACIAS")).unwrap().awarded, Points::ONE);
        let last = ex.submit(said("por favor")).unwrap();
        assert_eq!(last.awarded, Points::ONE);
        assert!(last.exercise_complete);
    }
}
