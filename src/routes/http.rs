//! HTTP endpoint handlers for the lesson store. Thin wrappers over `LessonStore`;
//! each handler is instrumented and errors map onto status codes.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument, warn};

use crate::domain::{Lesson, LessonInput, LessonSummary};
use crate::error::EngineError;
use crate::protocol::*;
use crate::state::AppState;

impl EngineError {
  pub fn status(&self) -> StatusCode {
    match self {
      EngineError::NotFound(_) => StatusCode::NOT_FOUND,
      EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
      EngineError::UnsupportedBlockType(_) => StatusCode::UNPROCESSABLE_ENTITY,
      EngineError::BlockInProgress { .. } => StatusCode::CONFLICT,
      EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for EngineError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(target: "store", error = %self, "Request failed");
    } else {
      warn!(target: "store", error = %self, kind = self.kind(), "Request rejected");
    }
    (status, Json(ErrorOut { error: self.to_string(), kind: self.kind().to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_block_types(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(BlockTypesOut { types: state.registry.tags() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_lessons(State(state): State<Arc<AppState>>) -> Result<Json<Vec<LessonSummary>>, EngineError> {
  let lessons = state.store.list().await?;
  info!(target: "store", count = lessons.len(), "HTTP lessons listed");
  Ok(Json(lessons))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_lesson(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Lesson>, EngineError> {
  let lesson = state.store.get(&id).await?;
  info!(target: "store", %id, blocks = lesson.blocks.len(), "HTTP lesson served");
  Ok(Json(lesson))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_lesson(
  State(state): State<Arc<AppState>>,
  body: Result<Json<LessonInput>, JsonRejection>,
) -> Result<impl IntoResponse, EngineError> {
  let Json(input) = body.map_err(|e| EngineError::InvalidInput(e.body_text()))?;
  let id = state.store.put(input).await?;
  Ok(Json(SavedOut { id, message: "Lesson saved successfully".into() }))
}
