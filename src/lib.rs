//! Lesson execution engine for interactive language-learning lessons.
//!
//! A lesson is an ordered list of typed exercise blocks. The [`engine`] plays
//! them one at a time and grades learner input; [`store`] persists lessons,
//! [`authoring`] builds them, and [`routes`] serves both over HTTP/WebSocket.

pub mod authoring;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;

pub use domain::{Block, BlockKind, Lesson};
pub use engine::{BlockRegistry, Input, LessonRunner, Outcome, Points};
pub use error::{EngineError, Result};
