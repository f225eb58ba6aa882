use crate::domain::{NewSong, Pagination, Song, SongDetail, SongFilter, SongId};
use crate::errors::CoreError;
use crate::ports::SongRepository;

/// Entry point for the song catalog.
///
/// Owns the boundary contract so the repository can stay a thin query layer:
/// - `create` rejects blank `group` / `song`,
/// - `list` coerces bad pagination to `page=1, page_size=10`,
/// - update/delete on a missing id succeed with zero rows affected.
pub struct CatalogService<R>
where
  R: SongRepository,
{
  repo: R,
}

impl<R> CatalogService<R>
where
  R: SongRepository,
{
  pub fn new(repo: R) -> Self {
    Self { repo }
  }

  pub async fn migrate(&self) -> Result<(), CoreError> {
    self.repo.apply_migrations().await
  }

  // -------- COMMAND (write) --------

  pub async fn create(&self, group: &str, song: &str) -> Result<Song, CoreError> {
    require_non_blank("group", group)?;
    require_non_blank("song", song)?;

    self.repo.create_song(NewSong::new(group, song)).await
  }

  pub async fn update(&self, id: SongId, detail: SongDetail) -> Result<u64, CoreError> {
    self.repo.update_song(id, detail).await
  }

  pub async fn delete(&self, id: SongId) -> Result<u64, CoreError> {
    self.repo.delete_song(id).await
  }

  // -------- QUERY (read) --------

  /// Lists songs from raw request values. Never fails on bad pagination.
  pub async fn list(
    &self,
    group: Option<&str>,
    song: Option<&str>,
    page: Option<&str>,
    page_size: Option<&str>,
  ) -> Result<Vec<Song>, CoreError> {
    let filter = SongFilter::new(group, song);
    let page = Pagination::from_raw(page, page_size);
    self.repo.get_songs(&filter, page).await
  }

  pub async fn get(&self, id: SongId) -> Result<Song, CoreError> {
    self.repo.find_song(id).await?.ok_or(CoreError::NotFound)
  }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
  if value.trim().is_empty() {
    return Err(CoreError::Validation(format!("`{field}` must not be empty")));
  }
  Ok(())
}
