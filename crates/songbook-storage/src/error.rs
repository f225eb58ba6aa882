use songbook_core::CoreError;
use thiserror::Error;

/// Failures inside the SQLite adapter. Converted to [`CoreError`] at the port
/// boundary, prefixed with the name of the failing operation.
#[derive(Debug, Error)]
pub enum StorageError {
  #[error("pool error: {0}")]
  Pool(#[from] diesel::r2d2::PoolError),

  #[error("query error: {0}")]
  Query(#[from] diesel::result::Error),

  #[error("migration error: {0}")]
  Migration(String),

  #[error("blocking task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  #[error("deadline of {0} ms exceeded")]
  Timeout(u64),
}

impl StorageError {
  pub fn into_core(self, op: &str) -> CoreError {
    match self {
      StorageError::Migration(msg) => CoreError::Migration(format!("{op}: {msg}")),
      StorageError::Timeout(ms) => CoreError::Timeout(ms),
      other => CoreError::repository(op, other),
    }
  }
}
