//! Server configuration.
//!
//! Read from an optional TOML file, then overridden by `RELIEF_`-prefixed
//! environment variables. Nested keys use a double underscore, e.g.
//! `RELIEF_RETRY__MAX_ATTEMPTS=5`.

use std::path::{Path, PathBuf};

use relief_core::retry::RetryPolicy;
use serde::Deserialize;

/// Runtime server configuration. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Install the built-in policy set at startup, keeping existing entries.
  pub seed_default_policies: bool,
  pub retry:                 RetryPolicy,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  8080,
      store_path:            PathBuf::from("relief.db"),
      seed_default_policies: true,
      retry:                 RetryPolicy::default(),
    }
  }
}

impl ServerConfig {
  /// Layer `path` (if it exists) and the environment over the defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("RELIEF")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
