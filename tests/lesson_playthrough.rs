//! End-to-end playthroughs through the public runner API.

use std::sync::Arc;

use serde_json::{json, Value};

use lesson_engine::domain::SpeakerSlot;
use lesson_engine::engine::{Advance, EngineSettings, Prompt, Verdict};
use lesson_engine::{Block, BlockRegistry, EngineError, Input, Lesson, LessonRunner, Points};

fn block(id: &str, kind: &str, config: Value) -> Block {
    Block { id: id.into(), kind: kind.into(), config }
}

fn lesson(blocks: Vec<Block>) -> Lesson {
    Lesson { id: "demo".into(), name: "Demo".into(), date: "2024-06-01".into(), blocks }
}

fn runner() -> LessonRunner {
    LessonRunner::new(Arc::new(BlockRegistry::standard()), EngineSettings { rng_seed: Some(2024), ..Default::default() })
}

fn started(blocks: Vec<Block>) -> LessonRunner {
    let mut r = runner();
    r.start(lesson(blocks)).unwrap();
    r
}

#[test]
fn flashcard_answer_is_case_insensitive() {
    let mut r = started(vec![block(
        "1",
        "flashcard",
        json!({"timeLimit": 300, "cards": [{"english": "hello", "spanish": "hola"}]}),
    )]);
    let out = r.submit(Input::TextSubmitted { value: "HOLA".into() }).unwrap();
    assert_eq!(out.awarded, Points::ONE);
    assert!(out.exercise_complete);
    assert_eq!(r.score(), Points::ONE);
    assert!(r.snapshot().unwrap().next_block_available);
}

#[test]
fn pick_picture_requires_the_exact_set() {
    let config = json!({"exercises": [{"verb": "correr", "images": ["a", "b", "c"], "correctAnswers": [0, 2]}]});

    let mut exact = started(vec![block("1", "pickpicture", config.clone())]);
    exact.submit(Input::ItemToggled { index: 2 }).unwrap();
    exact.submit(Input::ItemToggled { index: 0 }).unwrap();
    assert_eq!(exact.submit(Input::Submit).unwrap().awarded, Points::ONE);

    let mut superset = started(vec![block("1", "pickpicture", config)]);
    for i in [0, 1, 2] {
        superset.submit(Input::ItemToggled { index: i }).unwrap();
    }
    assert_eq!(superset.submit(Input::Submit).unwrap().awarded, Points::ZERO);
}

#[test]
fn dialogue_turn_needs_both_speakers() {
    let mut r = started(vec![block(
        "1",
        "dialogue",
        json!({"dialogues": [{
            "speakerAEng": "What time is it?", "speakerASpa": "qué hora es",
            "speakerBEng": "It is one.", "speakerBSpa": "es la una"
        }]}),
    )]);
    r.submit(Input::TranscriptReceived { text: "¿qué hora es?".into(), speaker: SpeakerSlot::A }).unwrap();
    let a = r.submit(Input::SpeakerSubmitted { speaker: SpeakerSlot::A }).unwrap();
    assert_eq!(a.awarded, Points::ONE);
    assert!(matches!(r.advance(), Err(EngineError::BlockInProgress { index: 0 })));

    r.submit(Input::TranscriptReceived { text: "son las dos".into(), speaker: SpeakerSlot::B }).unwrap();
    let b = r.submit(Input::SpeakerSubmitted { speaker: SpeakerSlot::B }).unwrap();
    assert_eq!(b.awarded, Points::ZERO);
    assert!(b.exercise_complete);
    assert_eq!(r.advance().unwrap(), Advance::LessonComplete { final_score: Points::ONE });
}

#[test]
fn highlight_credit_values_add_up() {
    let item = json!({"text": "el gato negro come pescado", "question": "Nouns and adjectives?", "correctWords": ["gato", "negro", "pescado"]});
    let mut r = started(vec![block("1", "highlight", json!({"exercises": [item.clone(), item.clone(), item.clone(), item]}))]);

    let mut play = |picks: &[usize]| {
        for &i in picks {
            r.submit(Input::ItemToggled { index: i }).unwrap();
        }
        r.submit(Input::Submit).unwrap()
    };
    assert_eq!(play(&[1, 2, 4]).awarded, Points::ONE);
    assert_eq!(play(&[1, 2]).awarded, Points::THREE_QUARTERS);
    assert_eq!(play(&[1]).awarded, Points::HALF);
    let last = play(&[0, 1, 2, 4]);
    assert_eq!(last.awarded, Points::ZERO);
    assert!(last.exercise_complete);

    assert_eq!(r.score(), Points::from_quarters(9));
}

#[test]
fn accent_sentence_scores_only_the_exact_set() {
    let config = json!({"sentences": [
        {"text": "mama esta aqui", "corrections": [{"index": 3, "accent": "á"}, {"index": 8, "accent": "á"}, {"index": 13, "accent": "í"}]},
        {"text": "el cafe", "corrections": [{"index": 6, "accent": "é"}]}
    ]});
    let mut r = started(vec![block("1", "accent", config)]);
    for i in [3, 8, 13, 0] {
        r.submit(Input::ItemToggled { index: i }).unwrap();
    }
    assert_eq!(r.submit(Input::Submit).unwrap().awarded, Points::ZERO);
    assert!(matches!(r.advance(), Err(EngineError::BlockInProgress { .. })));
    r.submit(Input::Continue).unwrap();

    r.submit(Input::ItemToggled { index: 6 }).unwrap();
    let out = r.submit(Input::Submit).unwrap();
    assert_eq!(out.awarded, Points::ONE);
    assert_eq!(out.feedback.marks[0].replacement.as_deref(), Some("é"));
    let end = r.submit(Input::Continue).unwrap();
    assert!(end.exercise_complete);
}

fn answer_open_quiz(r: &mut LessonRunner, answer: &str) {
    let Some(Prompt::Hotspot { quiz: Some(quiz), .. }) = r.snapshot().unwrap().prompt else {
        panic!("expected an open hotspot quiz");
    };
    let id = quiz.options.iter().position(|o| o == answer).unwrap();
    r.submit(Input::OptionSelected { id }).unwrap();
}

#[test]
fn hotspots_complete_in_any_click_order() {
    let config = json!({"imageUrl": "kitchen.png", "hotspots": [
        {"x": 10, "y": 10, "answer": "mesa", "wrongOptions": ["silla", "cama"]},
        {"x": 50, "y": 50, "answer": "horno", "wrongOptions": ["nevera"]},
        {"x": 90, "y": 20, "answer": "ventana", "wrongOptions": ["puerta"]}
    ]});
    for order in [[0usize, 1, 2], [2, 0, 1], [1, 2, 0]] {
        let mut r = started(vec![block("1", "hotspot", config.clone())]);
        let answers = ["mesa", "horno", "ventana"];
        for (n, &spot) in order.iter().enumerate() {
            assert!(!r.snapshot().unwrap().next_block_available);
            if n == 1 {
                let (x, y) = [(10.0, 10.0), (51.0, 49.0), (90.0, 22.0)][spot];
                r.submit(Input::PositionClicked { x, y }).unwrap();
            } else {
                r.submit(Input::BoxClicked { index: spot }).unwrap();
            }
            answer_open_quiz(&mut r, answers[spot]);
        }
        assert!(r.snapshot().unwrap().next_block_available);
        assert_eq!(r.score(), Points::whole(3));
    }
}

#[test]
fn spelling_is_graded_independently_of_the_option_shuffle() {
    let config = json!({"exercises": [{"word": "PERRO", "missingIndices": [1, 4]}]});
    for seed in 0..10 {
        let mut r = LessonRunner::new(
            Arc::new(BlockRegistry::standard()),
            EngineSettings { rng_seed: Some(seed), ..Default::default() },
        );
        r.start(lesson(vec![block("1", "spelling", config.clone())])).unwrap();
        for letter in ['E', 'O'] {
            let Some(Prompt::Spelling { options, .. }) = r.snapshot().unwrap().prompt else {
                panic!("expected spelling");
            };
            let id = options.iter().position(|&c| c == letter).unwrap();
            r.submit(Input::OptionSelected { id }).unwrap();
        }
        assert_eq!(r.score(), Points::ONE);
        assert!(r.snapshot().unwrap().next_block_available);
    }
}

#[test]
fn block_index_moves_by_one_and_completion_is_idempotent() {
    let mut r = started(vec![
        block("1", "translation", json!({"sentences": [{"sentence": "I read", "correctAnswer": "Yo leo"}]})),
        block("2", "translation", json!({"sentence": "You read", "correctAnswer": "Tú lees"})),
        block("3", "sentencematch", json!({"sentences": []})),
    ]);
    let mut previous = r.snapshot().unwrap().block_index;
    for answer in ["yo leo", "tu lees"] {
        let out = r.submit(Input::TextSubmitted { value: answer.into() }).unwrap();
        assert!(out.exercise_complete);
        let next = r.advance().unwrap();
        assert_eq!(next, Advance::Block { index: previous + 1 });
        previous += 1;
    }
    assert_eq!(r.score(), Points::ONE);

    let end = r.advance().unwrap();
    assert_eq!(end, Advance::LessonComplete { final_score: Points::ONE });
    for _ in 0..3 {
        assert_eq!(r.advance().unwrap(), end);
    }
    assert_eq!(r.state().unwrap().block_index, 3);
}

#[test]
fn completed_blocks_stay_complete() {
    let mut r = started(vec![block("1", "translation", json!({"sentence": "Thanks", "correctAnswer": "Gracias"}))]);
    r.submit(Input::TextSubmitted { value: "de nada".into() }).unwrap();
    let again = r.submit(Input::TextSubmitted { value: "gracias".into() }).unwrap();
    assert!(again.exercise_complete);
    assert_eq!(again.feedback.verdict, Verdict::Ignored);
    assert_eq!(r.score(), Points::ZERO);
}

#[test]
fn unsupported_block_type_stops_playback() {
    let mut r = runner();
    let err = r
        .start(lesson(vec![block("1", "crossword", json!({})), block("2", "translation", json!({}))]))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedBlockType(ref t) if t == "crossword"));
    assert!(err.is_fatal());
    assert!(r.submit(Input::Submit).is_err());
    assert!(r.advance().is_err());
}
