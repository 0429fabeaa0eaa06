//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).

use serde::{Deserialize, Serialize};

use crate::domain::SpeakerSlot;
use crate::engine::{Input, Outcome, Points, Recognition, RenderState};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    LoadLesson {
        #[serde(rename = "lessonId")]
        lesson_id: String,
    },
    /// One normalized learner event for the active block.
    Input {
        input: Input,
    },
    Advance,
    StartRecognition {
        speaker: SpeakerSlot,
    },
    /// A speech recognition session for `speaker` produced `transcript`.
    RecognitionResult {
        speaker: SpeakerSlot,
        transcript: String,
    },
    Snapshot,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    State {
        state: RenderState,
    },
    Outcome {
        outcome: Outcome,
    },
    LessonComplete {
        #[serde(rename = "finalScore")]
        final_score: Points,
    },
    RecognitionStarted {
        speaker: SpeakerSlot,
        status: Recognition,
    },
    Error {
        kind: String,
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedOut {
    pub id: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct BlockTypesOut {
    pub types: Vec<&'static str>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
    pub kind: String,
}
