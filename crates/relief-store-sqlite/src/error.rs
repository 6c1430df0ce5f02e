//! Error type for `relief-store-sqlite`.

use relief_core::store::Transient;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value that does not decode into its domain type.
  #[error("invalid stored value: {0}")]
  Decode(String),

  #[error("value out of range: {0}")]
  OutOfRange(String),
}

impl Transient for Error {
  /// A busy or locked database clears on its own; nothing else does.
  fn is_transient(&self) -> bool {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) => matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked),
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
