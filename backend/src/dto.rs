use serde::Deserialize;
use songbook_core::domain::{SongDetail, SongId};

/// Query string of the listing endpoints. Everything stays a raw string so
/// bad pagination can be coerced instead of rejected.
#[derive(Debug, Default, Deserialize)]
pub struct SongsQuery {
  pub group: Option<String>,
  pub song: Option<String>,
  pub page: Option<String>,
  #[serde(rename = "pageSize")]
  pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
  #[serde(default)]
  pub group: String,
  #[serde(default)]
  pub song: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSongRequest {
  pub song_id: SongId,
  #[serde(default)]
  pub song_detail: SongDetail,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSongRequest {
  pub song_id: SongId,
}
