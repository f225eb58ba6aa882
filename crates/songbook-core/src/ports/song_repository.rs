use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{NewSong, Pagination, Song, SongDetail, SongFilter, SongId};
use crate::errors::CoreError;

/// Port over the persisted song catalog.
///
/// Implementations must bind every caller-supplied value as a query
/// parameter and wrap failures with the operation name
/// (`create_song: ...`, `get_songs: ...`).
#[async_trait]
pub trait SongRepository: Send + Sync {
  /// Creates the backing schema if it is missing. Safe to call repeatedly.
  async fn apply_migrations(&self) -> Result<(), CoreError>;

  /// Inserts a song with only `group`/`song` set and returns the stored row.
  async fn create_song(&self, new_song: NewSong) -> Result<Song, CoreError>;

  /// Lists songs matching `filter`, ordered by ascending id, one page at a time.
  async fn get_songs(&self, filter: &SongFilter, page: Pagination) -> Result<Vec<Song>, CoreError>;

  async fn find_song(&self, id: SongId) -> Result<Option<Song>, CoreError>;

  /// Overwrites the mutable fields of `id`. Returns the number of rows
  /// touched; zero means the id does not exist and is not an error.
  async fn update_song(&self, id: SongId, detail: SongDetail) -> Result<u64, CoreError>;

  /// Hard-deletes `id`. Returns the number of rows removed; zero is not an error.
  async fn delete_song(&self, id: SongId) -> Result<u64, CoreError>;
}

#[async_trait]
impl<R: SongRepository + ?Sized> SongRepository for Arc<R> {
  async fn apply_migrations(&self) -> Result<(), CoreError> {
    (**self).apply_migrations().await
  }

  async fn create_song(&self, new_song: NewSong) -> Result<Song, CoreError> {
    (**self).create_song(new_song).await
  }

  async fn get_songs(&self, filter: &SongFilter, page: Pagination) -> Result<Vec<Song>, CoreError> {
    (**self).get_songs(filter, page).await
  }

  async fn find_song(&self, id: SongId) -> Result<Option<Song>, CoreError> {
    (**self).find_song(id).await
  }

  async fn update_song(&self, id: SongId, detail: SongDetail) -> Result<u64, CoreError> {
    (**self).update_song(id, detail).await
  }

  async fn delete_song(&self, id: SongId) -> Result<u64, CoreError> {
    (**self).delete_song(id).await
  }
}
