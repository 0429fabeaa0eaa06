//! A lesson authored with `LessonDraft`, saved to disk, loaded back and played.

use std::sync::Arc;

use lesson_engine::authoring::{toggle_accent, LessonDraft};
use lesson_engine::domain::{AccentConfig, AccentSentence, BlockConfig, Card, FlashcardConfig, SpellingConfig, SpellingItem};
use lesson_engine::engine::{Advance, EngineSettings, Prompt};
use lesson_engine::store::{FileLessonStore, LessonStore};
use lesson_engine::{BlockKind, BlockRegistry, Input, LessonRunner, Points};

#[tokio::test]
async fn authored_lesson_plays_back_from_disk() {
    let mut draft = LessonDraft::new("Casa", "2024-07-07");

    let cards = draft.add_block(BlockKind::Flashcard).unwrap();
    draft
        .configure(
            &cards,
            BlockConfig::Flashcard(FlashcardConfig {
                instructions: "Type the Spanish word".into(),
                time_limit: 60,
                cards: vec![Card { english: "house".into(), spanish: "casa".into() }],
            }),
        )
        .unwrap();

    let accents = draft.add_block(BlockKind::Accent).unwrap();
    let text = "la cancion";
    let mut corrections = Vec::new();
    toggle_accent(text, &mut corrections, 8);
    draft
        .configure(
            &accents,
            BlockConfig::Accent(AccentConfig {
                instructions: String::new(),
                sentences: vec![AccentSentence { text: text.into(), corrections }],
            }),
        )
        .unwrap();

    let spelling = draft.add_block(BlockKind::Spelling).unwrap();
    draft
        .configure(
            &spelling,
            BlockConfig::Spelling(SpellingConfig {
                instructions: String::new(),
                exercises: vec![SpellingItem { word: "sol".into(), missing_indices: vec![0] }],
            }),
        )
        .unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let store = FileLessonStore::new(tmp.path());
    let id = store.put(draft.into_lesson_input()).await.unwrap();
    let lesson = store.get(&id).await.unwrap();
    assert_eq!(lesson.blocks.len(), 3);

    let mut runner = LessonRunner::new(
        Arc::new(BlockRegistry::standard()),
        EngineSettings { rng_seed: Some(1), ..Default::default() },
    );
    let progress = runner.subscribe_progress();
    runner.start(lesson).unwrap();

    runner.submit(Input::TextSubmitted { value: "Casa".into() }).unwrap();
    assert_eq!(runner.advance().unwrap(), Advance::Block { index: 1 });
    assert!((*progress.borrow() - 1.0 / 3.0).abs() < 1e-9);

    runner.submit(Input::ItemToggled { index: 8 }).unwrap();
    let graded = runner.submit(Input::Submit).unwrap();
    assert_eq!(graded.feedback.marks[0].replacement.as_deref(), Some("ó"));
    runner.submit(Input::Continue).unwrap();
    runner.advance().unwrap();

    let Some(Prompt::Spelling { hint, options, .. }) = runner.snapshot().unwrap().prompt else {
        panic!("expected spelling prompt");
    };
    assert_eq!(hint, "_OL");
    let id = options.iter().position(|&c| c == 'S').unwrap();
    runner.submit(Input::OptionSelected { id }).unwrap();

    assert_eq!(runner.advance().unwrap(), Advance::LessonComplete { final_score: Points::whole(3) });
    assert_eq!(*progress.borrow(), 1.0);
}
