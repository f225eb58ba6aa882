use crate::domain::ids::SongId;
use serde::{Deserialize, Serialize};

/// A song in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
  /// Identity assigned by the storage layer.
  pub id: SongId,
  /// Performer or artist name. Set once on creation.
  pub group: String,
  /// Song title. Set once on creation.
  pub song: String,
  /// Free-form release date, e.g. `2006-07-16` or `16.07.2006`.
  pub release_date: String,
  /// Link to the media or lyrics page.
  pub link: String,
  /// Lyrics body.
  pub text: String,
}

/// Fields supplied when a song is created. Everything else starts empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
  pub group: String,
  pub song: String,
}

impl NewSong {
  pub fn new(group: impl Into<String>, song: impl Into<String>) -> Self {
    Self { group: group.into(), song: song.into() }
  }
}

/// The mutable part of a song.
///
/// An update overwrites all three fields; a missing field in a request
/// body becomes an empty string rather than "keep the old value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDetail {
  #[serde(default)]
  pub release_date: String,
  #[serde(default)]
  pub link: String,
  #[serde(default)]
  pub text: String,
}

impl Song {
  pub fn detail(&self) -> SongDetail {
    SongDetail { release_date: self.release_date.clone(), link: self.link.clone(), text: self.text.clone() }
  }
}
