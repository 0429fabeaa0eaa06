//! WebSocket play session. Each connection owns one `LessonRunner`; client
//! messages are parsed as JSON and answered with one or more server messages.
//! A periodic tick drives the block timer between client messages.

use std::sync::Arc;
use std::time::Duration;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

use crate::engine::{Advance, LessonRunner, Recognition, RecognitionQueue, Verdict};
use crate::error::EngineError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "lesson_engine", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "lesson_engine", "WebSocket connected");
  let period = Duration::from_millis(state.config.engine.tick_millis.max(1));
  let mut ticker = interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  let mut session = PlaySession::new(state);

  loop {
    let replies = tokio::select! {
      msg = socket.recv() => match msg {
        Some(Ok(Message::Text(txt))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "lesson_engine", message = %trunc_for_log(&txt, 200), "WS received");
            session.handle(incoming).await
          }
          Err(e) => vec![ServerWsMessage::Error { kind: "invalid_input".into(), message: format!("Invalid JSON: {}", e) }],
        },
        Some(Ok(Message::Ping(payload))) => {
          if let Err(e) = socket.send(Message::Pong(payload)).await {
            error!(target: "lesson_engine", error = %e, "WS pong send error");
            break;
          }
          continue;
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Err(e)) => {
          error!(target: "lesson_engine", error = %e, "WS receive error");
          break;
        }
        Some(Ok(_)) => continue,
      },
      _ = ticker.tick() => session.on_tick(),
    };
    if session.take_timer_restart() {
      ticker.reset();
    }

    if !send_all(&mut socket, replies).await {
      break;
    }
  }
  info!(target: "lesson_engine", "WebSocket disconnected");
}

async fn send_all(socket: &mut WebSocket, replies: Vec<ServerWsMessage>) -> bool {
  for reply in replies {
    let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "kind": "storage_error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "lesson_engine", error = %e, "WS send error");
      return false;
    }
  }
  true
}

fn error_message(e: &EngineError) -> ServerWsMessage {
  ServerWsMessage::Error { kind: e.kind().into(), message: e.to_string() }
}

/// Input adapter and playback state of one connection.
pub struct PlaySession {
  state: Arc<AppState>,
  runner: LessonRunner,
  recognition: RecognitionQueue,
  /// A new block became active; its timer counts from now.
  restart_timer: bool,
}

impl PlaySession {
  pub fn new(state: Arc<AppState>) -> Self {
    let runner = state.new_runner();
    Self { state, runner, recognition: RecognitionQueue::new(), restart_timer: false }
  }

  /// Whether a block started since the last call.
  pub fn take_timer_restart(&mut self) -> bool {
    std::mem::take(&mut self.restart_timer)
  }

  fn state_message(&self) -> ServerWsMessage {
    match self.runner.snapshot() {
      Ok(state) => ServerWsMessage::State { state },
      Err(e) => error_message(&e),
    }
  }

  /// Apply one client message and return the replies, in order.
  pub async fn handle(&mut self, msg: ClientWsMessage) -> Vec<ServerWsMessage> {
    match msg {
      ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

      ClientWsMessage::LoadLesson { lesson_id } => {
        let lesson = match self.state.store.get(&lesson_id).await {
          Ok(lesson) => lesson,
          Err(e) => return vec![error_message(&e)],
        };
        self.recognition.clear();
        match self.runner.start(lesson) {
          Ok(state) => {
            self.restart_timer = true;
            vec![ServerWsMessage::State { state }]
          }
          Err(e) => vec![error_message(&e), self.state_message()],
        }
      }

      ClientWsMessage::Input { input } => self.submit(input),

      ClientWsMessage::Advance => match self.runner.advance() {
        Ok(Advance::Block { .. }) => {
          self.recognition.clear();
          self.restart_timer = true;
          vec![self.state_message()]
        }
        Ok(Advance::LessonComplete { final_score }) => {
          self.recognition.clear();
          vec![ServerWsMessage::LessonComplete { final_score }, self.state_message()]
        }
        Err(e) => vec![error_message(&e)],
      },

      ClientWsMessage::StartRecognition { speaker } => {
        let status = self.recognition.begin(speaker);
        debug!(target: "lesson", ?speaker, ?status, "Speech recognition requested");
        vec![ServerWsMessage::RecognitionStarted { speaker, status }]
      }

      ClientWsMessage::RecognitionResult { speaker, transcript } => {
        let (input, restarted) = match self.recognition.finish(speaker, &transcript) {
          Ok(done) => done,
          Err(e) => return vec![error_message(&e)],
        };
        let mut replies = self.submit(input);
        if restarted {
          replies.push(ServerWsMessage::RecognitionStarted { speaker, status: Recognition::Started });
        }
        replies
      }

      ClientWsMessage::Snapshot => vec![self.state_message()],
    }
  }

  fn submit(&mut self, input: crate::engine::Input) -> Vec<ServerWsMessage> {
    match self.runner.submit(input) {
      Ok(outcome) => vec![ServerWsMessage::Outcome { outcome }, self.state_message()],
      Err(e) => vec![error_message(&e)],
    }
  }

  /// One timer period. Only blocks with a running timer produce replies.
  pub fn on_tick(&mut self) -> Vec<ServerWsMessage> {
    match self.runner.tick() {
      Ok(Some(outcome)) if outcome.feedback.verdict == Verdict::TimeUp => {
        vec![ServerWsMessage::Outcome { outcome }, self.state_message()]
      }
      Ok(Some(_)) => vec![self.state_message()],
      Ok(None) => Vec::new(),
      Err(e) => vec![error_message(&e)],
    }
  }
}
