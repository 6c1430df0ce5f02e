//! Error types for `relief-core`.
//!
//! Every variant except [`Error::Internal`] is a final, caller-facing answer
//! and is never retried.

use thiserror::Error;
use uuid::Uuid;

use crate::{duplicate::DuplicateMatch, request::RequestStatus};

#[derive(Debug, Error)]
pub enum Error {
  #[error("no verified identity")]
  Unauthenticated,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("relief request not found: {0}")]
  RequestNotFound(Uuid),

  #[error("policy not found: {0}")]
  PolicyNotFound(String),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("duplicate of active relief request {}: {}", .0.original_request_id, .0.reason)]
  DuplicateConflict(DuplicateMatch),

  #[error("relief request {id} is already {status}")]
  InvalidTransition { id: Uuid, status: RequestStatus },

  #[error("conflict: {0}")]
  Conflict(String),

  /// A persistence failure that was not transient, or outlasted its retries.
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn internal(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Internal(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::RequestNotFound(_) | Self::PolicyNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
