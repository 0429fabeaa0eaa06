//! Spelling: fill the blanked letters of a word, left to right, from a shuffled
//! set of letter options.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{BlockConfig, BlockKind, SpellingConfig, SpellingItem};
use crate::engine::exercises::{check_index, typed_config, unsupported_input};
use crate::engine::{BuildContext, Exercise, Feedback, Input, Outcome, Prompt, Verdict};
use crate::error::{EngineError, Result};

/// Options offered per word before duplicates are removed.
const OPTION_COUNT: usize = 4;

pub struct Spelling {
    cfg: SpellingConfig,
    current: usize,
    options: Vec<char>,
    picked: Vec<char>,
    rng: StdRng,
}

pub fn build(value: &serde_json::Value, ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::Spelling(cfg) = typed_config(BlockKind::Spelling, value)? else {
        return Err(EngineError::invalid("expected a spelling config"));
    };
    Ok(Box::new(Spelling::new(cfg, ctx.rng)))
}

fn missing_letters(item: &SpellingItem) -> Vec<char> {
    let letters: Vec<char> = item.word.chars().collect();
    item.missing_indices.iter().filter_map(|&i| letters.get(i).copied()).collect()
}

/// The missing letters plus random decoys, deduplicated and shuffled.
pub fn letter_options(item: &SpellingItem, rng: &mut StdRng) -> Vec<char> {
    let mut pool = missing_letters(item);
    let decoys = OPTION_COUNT.saturating_sub(item.missing_indices.len());
    pool.extend((0..decoys).map(|_| rng.gen_range(b'A'..=b'Z') as char));

    let mut options = Vec::with_capacity(pool.len());
    for c in pool {
        if !options.contains(&c) {
            options.push(c);
        }
    }
    options.shuffle(rng);
    options
}

impl Spelling {
    fn new(cfg: SpellingConfig, mut rng: StdRng) -> Self {
        let options = cfg.exercises.first().map(|e| letter_options(e, &mut rng)).unwrap_or_default();
        Self { cfg, current: 0, options, picked: Vec::new(), rng }
    }

    fn done(&self) -> bool {
        self.current >= self.cfg.exercises.len()
    }

    /// Word with blanks, the picked letters filling them from the left.
    fn hint(&self, item: &SpellingItem) -> String {
        let mut picked = self.picked.iter();
        item.word
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if item.missing_indices.contains(&i) {
                    picked.next().copied().unwrap_or('_')
                } else {
                    c
                }
            })
            .collect()
    }
}

impl Exercise for Spelling {
    fn kind(&self) -> BlockKind {
        BlockKind::Spelling
    }

    fn current_prompt(&self) -> Prompt {
        match self.cfg.exercises.get(self.current) {
            Some(item) => Prompt::Spelling {
                instructions: self.cfg.instructions.clone(),
                position: self.current + 1,
                total: self.cfg.exercises.len(),
                hint: self.hint(item),
                options: self.options.clone(),
                picked: self.picked.clone(),
            },
            None => Prompt::Finished { kind: BlockKind::Spelling, message: "All spelling exercises completed!".into() },
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        match input {
            Input::OptionSelected { id } => {
                if self.done() {
                    return Ok(Outcome::ignored(true));
                }
                check_index(id, self.options.len(), "letter option")?;
                self.picked.push(self.options[id]);

                let expected = missing_letters(&self.cfg.exercises[self.current]);
                if self.picked.len() < expected.len() {
                    return Ok(Outcome::pending(false));
                }
                let correct = self.picked == expected;
                let word = self.cfg.exercises[self.current].word.clone();
                self.current += 1;
                self.picked.clear();
                self.options = match self.cfg.exercises.get(self.current) {
                    Some(next) => letter_options(next, &mut self.rng),
                    None => Vec::new(),
                };
                let verdict = if correct { Verdict::Correct } else { Verdict::Incorrect };
                Ok(Outcome::graded(correct, self.done()).with_feedback(Feedback::new(verdict).with_expected(word)))
            }
            other => Err(unsupported_input(BlockKind::Spelling, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.done()
    }
}
