// crates/songbook-core/src/errors.rs
use thiserror::Error;

/// Core error for the Songbook catalog.
///
/// Upper layers (HTTP, CLI) map each variant to a status code or a log line.
#[derive(Debug, Error)]
pub enum CoreError {
  /// The request is well formed but its content is not acceptable.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("repository error: {0}")]
  Repository(String),

  #[error("migration error: {0}")]
  Migration(String),

  #[error("storage deadline exceeded after {0} ms")]
  Timeout(u64),

  #[error("not found")]
  NotFound,
}

impl CoreError {
  /// Wraps a storage failure with the name of the operation that produced it.
  pub fn repository(op: &str, err: impl std::fmt::Display) -> Self {
    CoreError::Repository(format!("{op}: {err}"))
  }
}
