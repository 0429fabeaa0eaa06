//! Hotspots: click a marked spot on an image, then name it from a shuffled list.
//!
//! Spots can be visited in any order; each one is quizzed exactly once.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::{BlockConfig, BlockKind, HotspotConfig};
use crate::engine::exercises::{check_index, typed_config, unsupported_input};
use crate::engine::{
    BuildContext, Exercise, Feedback, Input, Mark, Outcome, Prompt, QuizView, SpotState, SpotView, Verdict,
};
use crate::error::{EngineError, Result};

const QUIZ_QUESTION: &str = "What is this?";

struct OpenQuiz {
    spot: usize,
    options: Vec<String>,
}

pub struct Hotspot {
    cfg: HotspotConfig,
    results: Vec<Option<bool>>,
    quiz: Option<OpenQuiz>,
    rng: StdRng,
    hit_radius: f64,
}

pub fn build(value: &serde_json::Value, ctx: BuildContext) -> Result<Box<dyn Exercise>> {
    let BlockConfig::Hotspot(cfg) = typed_config(BlockKind::Hotspot, value)? else {
        return Err(EngineError::invalid("expected a hotspot config"));
    };
    Ok(Box::new(Hotspot::new(cfg, ctx)))
}

impl Hotspot {
    pub fn new(cfg: HotspotConfig, ctx: BuildContext) -> Self {
        let results = vec![None; cfg.hotspots.len()];
        Self { cfg, results, quiz: None, rng: ctx.rng, hit_radius: ctx.hotspot_hit_radius }
    }

    fn remaining(&self) -> usize {
        self.results.iter().filter(|r| r.is_none()).count()
    }

    /// Nearest spot within the hit radius of a click.
    fn spot_at(&self, x: f64, y: f64) -> Option<usize> {
        self.cfg
            .hotspots
            .iter()
            .enumerate()
            .map(|(i, h)| (i, (h.x - x).hypot(h.y - y)))
            .filter(|(_, d)| *d <= self.hit_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn open(&mut self, spot: usize) -> Outcome {
        if self.results[spot].is_some() {
            return Outcome::ignored(self.is_exercise_complete());
        }
        let h = &self.cfg.hotspots[spot];
        let mut options = Vec::with_capacity(h.wrong_options.len() + 1);
        options.push(h.answer.clone());
        options.extend(h.wrong_options.iter().cloned());
        options.shuffle(&mut self.rng);
        self.quiz = Some(OpenQuiz { spot, options });
        Outcome::pending(false)
    }
}

impl Exercise for Hotspot {
    fn kind(&self) -> BlockKind {
        BlockKind::Hotspot
    }

    fn current_prompt(&self) -> Prompt {
        let spots = self
            .cfg
            .hotspots
            .iter()
            .zip(&self.results)
            .map(|(h, r)| SpotView {
                x: h.x,
                y: h.y,
                state: match r {
                    None => SpotState::Unvisited,
                    Some(true) => SpotState::Correct,
                    Some(false) => SpotState::Incorrect,
                },
            })
            .collect();
        Prompt::Hotspot {
            instructions: self.cfg.instructions.clone(),
            image_url: self.cfg.image_url.clone(),
            spots,
            remaining: self.remaining(),
            quiz: self.quiz.as_ref().map(|q| QuizView {
                spot: q.spot,
                question: QUIZ_QUESTION.into(),
                options: q.options.clone(),
            }),
        }
    }

    fn submit(&mut self, input: Input) -> Result<Outcome> {
        match input {
            Input::BoxClicked { index } => {
                check_index(index, self.cfg.hotspots.len(), "hotspot")?;
                Ok(self.open(index))
            }
            Input::PositionClicked { x, y } => match self.spot_at(x, y) {
                Some(spot) => Ok(self.open(spot)),
                None => Ok(Outcome::ignored(self.is_exercise_complete())),
            },
            Input::OptionSelected { id } => {
                let quiz = self
                    .quiz
                    .take()
                    .ok_or_else(|| EngineError::invalid("no hotspot quiz is open"))?;
                if let Err(e) = check_index(id, quiz.options.len(), "option") {
                    self.quiz = Some(quiz);
                    return Err(e);
                }
                let answer = &self.cfg.hotspots[quiz.spot].answer;
                let correct = quiz.options[id] == *answer;
                self.results[quiz.spot] = Some(correct);
                let mark = if correct { Mark::correct(quiz.spot) } else { Mark::wrong(quiz.spot) };
                let verdict = if correct { Verdict::Correct } else { Verdict::Incorrect };
                let feedback = Feedback::new(verdict).with_expected(answer.clone()).with_marks(vec![mark]);
                Ok(Outcome::graded(correct, self.is_exercise_complete()).with_feedback(feedback))
            }
            other => Err(unsupported_input(BlockKind::Hotspot, &other)),
        }
    }

    fn is_exercise_complete(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Hotspot as Spot;
    use crate::engine::exercises::testing::{ctx, ctx_seeded};
    use crate::engine::Points;

    fn kitchen() -> HotspotConfig {
        let spot = |x: f64, y: f64, answer: &str, wrong: &[&str]| Spot {
            label: None,
            x,
            y,
            answer: answer.into(),
            wrong_options: wrong.iter().map(|w| (*w).into()).collect(),
        };
        HotspotConfig {
            instructions: "Name the objects".into(),
            image_url: "kitchen.png".into(),
            hotspots: vec![
                spot(10.0, 10.0, "la mesa", &["la silla", "la puerta"]),
                spot(50.0, 50.0, "la nevera", &["el horno"]),
                spot(90.0, 20.0, "la ventana", &["el techo", "el suelo", "la pared"]),
            ],
        }
    }

    fn answer_spot(ex: &mut Hotspot, spot: usize, correctly: bool) -> Outcome {
        ex.submit(Input::BoxClicked { index: spot }).unwrap();
        let Prompt::Hotspot { quiz: Some(quiz), .. } = ex.current_prompt() else { panic!("quiz should be open") };
        let answer = &ex.cfg.hotspots[spot].answer;
        let id = quiz.options.iter().position(|o| (o == answer) == correctly).unwrap();
        ex.submit(Input::OptionSelected { id }).unwrap()
    }

    #[test]
    fn quiz_contains_answer_and_wrong_options() {
        let mut ex = Hotspot::new(kitchen(), ctx());
        ex.submit(Input::BoxClicked { index: 2 }).unwrap();
        let Prompt::Hotspot { quiz: Some(quiz), .. } = ex.current_prompt() else { panic!("quiz should be open") };
        let mut options = quiz.options.clone();
        options.sort();
        assert_eq!(options, vec!["el suelo", "el techo", "la pared", "la ventana"]);
    }

    #[test]
    fn completes_after_every_spot_regardless_of_order() {
        for (seed, order) in [(1, [0, 1, 2]), (2, [2, 0, 1]), (3, [1, 2, 0])] {
            let mut ex = Hotspot::new(kitchen(), ctx_seeded(seed));
            let mut total = Points::ZERO;
            for (n, spot) in order.into_iter().enumerate() {
                assert!(!ex.is_exercise_complete());
                let out = answer_spot(&mut ex, spot, spot != 1);
                total += out.awarded;
                assert_eq!(out.exercise_complete, n == 2);
            }
            assert!(ex.is_exercise_complete());
            assert_eq!(total, Points::whole(2));
        }
    }

    #[test]
    fn attempted_spot_cannot_be_quizzed_again() {
        let mut ex = Hotspot::new(kitchen(), ctx());
        answer_spot(&mut ex, 0, true);
        let out = ex.submit(Input::BoxClicked { index: 0 }).unwrap();
        assert_eq!(out.feedback.verdict, Verdict::Ignored);
        assert!(ex.submit(Input::OptionSelected { id: 0 }).is_err());
    }

    #[test]
    fn image_clicks_resolve_to_nearest_spot() {
        let mut ex = Hotspot::new(kitchen(), ctx());
        ex.submit(Input::PositionClicked { x: 52.0, y: 48.5 }).unwrap();
        assert!(matches!(ex.current_prompt(), Prompt::Hotspot { quiz: Some(QuizView { spot: 1, .. }), .. }));

        let miss = ex.submit(Input::PositionClicked { x: 30.0, y: 80.0 }).unwrap();
        assert_eq!(miss.feedback.verdict, Verdict::Ignored);
    }

    #[test]
    fn bad_option_keeps_quiz_open() {
        let mut ex = Hotspot::new(kitchen(), ctx());
        ex.submit(Input::BoxClicked { index: 1 }).unwrap();
        assert!(ex.submit(Input::OptionSelected { id: 9 }).is_err());
        assert!(matches!(ex.current_prompt(), Prompt::Hotspot { quiz: Some(_), .. }));
    }
}
