//! Lesson persistence: an opaque document store keyed by lesson id.
//!
//! `FileLessonStore` keeps one pretty-printed JSON document per lesson under a
//! directory; `MemoryLessonStore` keeps them in process.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Lesson, LessonInput, LessonSummary};
use crate::error::{EngineError, Result};

#[async_trait]
pub trait LessonStore: Send + Sync {
    /// Summaries of every stored lesson, ordered by id.
    async fn list(&self) -> Result<Vec<LessonSummary>>;

    /// The lesson with `id`, or `NotFound`.
    async fn get(&self, id: &str) -> Result<Lesson>;

    /// Save a lesson and return its id. Missing `name`, `date` or `blocks`
    /// is `InvalidInput`; an absent id is generated.
    async fn put(&self, lesson: LessonInput) -> Result<String>;
}

fn new_lesson_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Ids become file names, so anything that could escape the directory is rejected.
fn check_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return Err(EngineError::invalid(format!("invalid lesson id '{id}'")));
    }
    Ok(())
}

pub struct FileLessonStore {
    dir: PathBuf,
}

#[derive(Deserialize)]
struct StoredHeader {
    #[serde(default)]
    name: String,
    #[serde(default)]
    date: String,
}

impl FileLessonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        check_id(id)?;
        Ok(self.dir.join(format!("{id}.json")))
    }
}

#[async_trait]
impl LessonStore for FileLessonStore {
    #[instrument(level = "debug", skip(self), fields(dir = %self.dir.display()))]
    async fn list(&self) -> Result<Vec<LessonSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut out = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(target: "store", path = %path.display(), error = %e, "Skipping unreadable lesson file");
                    continue;
                }
            };
            match serde_json::from_str::<StoredHeader>(&raw) {
                Ok(h) => out.push(LessonSummary { id, name: h.name, date: h.date }),
                Err(e) => warn!(target: "store", path = %path.display(), error = %e, "Skipping malformed lesson file"),
            }
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(target: "store", count = out.len(), "Listed lessons");
        Ok(out)
    }

    #[instrument(level = "debug", skip(self))]
    async fn get(&self, id: &str) -> Result<Lesson> {
        let path = self.path_for(id)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(EngineError::NotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        };
        let mut lesson: Lesson = serde_json::from_str(&raw)
            .map_err(|e| EngineError::Storage(format!("lesson '{id}' is not valid JSON: {e}")))?;
        lesson.id = id.to_string();
        Ok(lesson)
    }

    #[instrument(level = "info", skip(self, lesson))]
    async fn put(&self, lesson: LessonInput) -> Result<String> {
        let lesson = lesson.into_lesson(new_lesson_id)?;
        let path = self.path_for(&lesson.id)?;
        let body = serde_json::to_string_pretty(&lesson).map_err(|e| EngineError::Storage(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, body).await?;
        info!(target: "store", id = %lesson.id, name = %lesson.name, blocks = lesson.blocks.len(), "Lesson saved");
        Ok(lesson.id)
    }
}

#[derive(Default)]
pub struct MemoryLessonStore {
    lessons: RwLock<HashMap<String, Lesson>>,
}

impl MemoryLessonStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LessonStore for MemoryLessonStore {
    async fn list(&self) -> Result<Vec<LessonSummary>> {
        let lessons = self.lessons.read().await;
        let mut out: Vec<LessonSummary> = lessons
            .values()
            .map(|l| LessonSummary { id: l.id.clone(), name: l.name.clone(), date: l.date.clone() })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn get(&self, id: &str) -> Result<Lesson> {
        self.lessons
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    async fn put(&self, lesson: LessonInput) -> Result<String> {
        let lesson = lesson.into_lesson(new_lesson_id)?;
        check_id(&lesson.id)?;
        let id = lesson.id.clone();
        self.lessons.write().await.insert(id.clone(), lesson);
        debug!(target: "store", %id, "Lesson saved in memory");
        Ok(id)
    }
}
