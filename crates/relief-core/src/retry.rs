//! Local retry of transient store failures.

use std::{fmt::Display, future::Future, time::Duration};

use serde::Deserialize;
use tracing::warn;

use crate::store::Transient;

/// How often, and how patiently, a store call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
  /// Total attempts including the first; values below 1 behave as 1.
  pub max_attempts:       u32,
  /// Delay before the second attempt; doubled for each one after.
  pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
  fn default() -> Self { Self { max_attempts: 3, initial_backoff_ms: 50 } }
}

impl RetryPolicy {
  /// Never retry.
  pub const NONE: Self = Self { max_attempts: 1, initial_backoff_ms: 0 };

  /// Run `op` until it succeeds, fails permanently, or attempts run out.
  ///
  /// `op` must be idempotent: a transient error can arrive after the write
  /// it reports on has already committed.
  pub async fn run<T, E, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, E>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
  {
    let mut backoff = Duration::from_millis(self.initial_backoff_ms);
    let mut attempt = 1;
    loop {
      match op().await {
        Err(e) if e.is_transient() && attempt < self.max_attempts => {
          warn!(operation, attempt, error = %e, "transient store failure; retrying");
          tokio::time::sleep(backoff).await;
          backoff = backoff.saturating_mul(2);
          attempt += 1;
        }
        other => return other,
      }
    }
  }
}
