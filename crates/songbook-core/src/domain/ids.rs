use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a persisted song.
///
/// Always assigned by the storage layer on insert; clients only ever echo back
/// a value they received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(i64);

impl SongId {
  pub fn from_i64(raw: i64) -> Self {
    SongId(raw)
  }

  pub fn as_i64(&self) -> i64 {
    self.0
  }
}

impl From<i64> for SongId {
  fn from(raw: i64) -> Self {
    SongId(raw)
  }
}

impl From<SongId> for i64 {
  fn from(id: SongId) -> Self {
    id.0
  }
}

impl fmt::Display for SongId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}
