//! Server configuration from TOML, with environment overrides.
//!
//! Schema (every key optional):
//!
//! ```toml
//! [server]
//! port = 3000
//!
//! [store]
//! dir = "lessons"
//!
//! [engine]
//! hotspot_hit_radius = 5.0
//! tick_millis = 1000
//! rng_seed = 7
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::engine::EngineSettings;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub store: StoreConfig,
  #[serde(default)]
  pub engine: EngineConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_port")]
  pub port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
  #[serde(default = "default_store_dir")]
  pub dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
  /// Click distance, in percent of the image, that still hits a hotspot.
  #[serde(default = "default_hit_radius")]
  pub hotspot_hit_radius: f64,
  /// Period of the flashcard timer.
  #[serde(default = "default_tick_millis")]
  pub tick_millis: u64,
  #[serde(default)]
  pub rng_seed: Option<u64>,
}

fn default_port() -> u16 {
  3000
}

fn default_store_dir() -> PathBuf {
  PathBuf::from("lessons")
}

fn default_hit_radius() -> f64 {
  5.0
}

fn default_tick_millis() -> u64 {
  1000
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { port: default_port() }
  }
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self { dir: default_store_dir() }
  }
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self { hotspot_hit_radius: default_hit_radius(), tick_millis: default_tick_millis(), rng_seed: None }
  }
}

impl EngineConfig {
  pub fn settings(&self) -> EngineSettings {
    EngineSettings { hotspot_hit_radius: self.hotspot_hit_radius, rng_seed: self.rng_seed }
  }
}

impl AppConfig {
  /// Config from LESSON_CONFIG_PATH (defaults when unset or unreadable),
  /// then PORT and LESSONS_DIR on top.
  pub fn from_env() -> Self {
    let mut cfg = load_config_from_env().unwrap_or_default();
    cfg.apply_overrides(std::env::var("PORT").ok(), std::env::var("LESSONS_DIR").ok());
    cfg
  }

  fn apply_overrides(&mut self, port: Option<String>, lessons_dir: Option<String>) {
    if let Some(p) = port {
      match p.parse::<u16>() {
        Ok(port) => self.server.port = port,
        Err(e) => warn!(target: "lesson_engine", value = %p, error = %e, "Ignoring invalid PORT"),
      }
    }
    if let Some(dir) = lessons_dir.filter(|d| !d.is_empty()) {
      self.store.dir = PathBuf::from(dir);
    }
  }
}

/// Attempt to load `AppConfig` from LESSON_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("LESSON_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "lesson_engine", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "lesson_engine", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "lesson_engine", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
