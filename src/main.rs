//! Lesson engine server
//!
//! - Axum HTTP API for the lesson store + WebSocket play sessions
//! - Static player/authoring pages (./static/index.html)
//!
//! Important env variables:
//!   PORT               : u16 (default 3000, or [server] port)
//!   LESSONS_DIR        : lesson directory (default "lessons", or [store] dir)
//!   LESSON_CONFIG_PATH : path to TOML config
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use lesson_engine::config::AppConfig;
use lesson_engine::routes::build_router;
use lesson_engine::state::AppState;
use lesson_engine::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::from_env();
  let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

  let state = Arc::new(AppState::new(config));
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "lesson_engine", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "lesson_engine", "Shutdown requested");
    })
    .await?;
  Ok(())
}
