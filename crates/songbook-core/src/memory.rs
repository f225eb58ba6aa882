//! In-memory `SongRepository`, used as a fake in tests.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{NewSong, Pagination, Song, SongDetail, SongFilter, SongId};
use crate::errors::CoreError;
use crate::ports::SongRepository;

#[derive(Default)]
struct Inner {
  // BTreeMap keeps rows in id order, matching the SQL adapter's ORDER BY id.
  rows: BTreeMap<SongId, Song>,
  last_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemorySongRepository {
  inner: Arc<Mutex<Inner>>,
}

impl InMemorySongRepository {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self, op: &str) -> Result<std::sync::MutexGuard<'_, Inner>, CoreError> {
    self.inner.lock().map_err(|_| CoreError::repository(op, "store mutex poisoned"))
  }
}

#[async_trait]
impl SongRepository for InMemorySongRepository {
  async fn apply_migrations(&self) -> Result<(), CoreError> {
    Ok(())
  }

  async fn create_song(&self, new_song: NewSong) -> Result<Song, CoreError> {
    let mut inner = self.lock("create_song")?;

    // Ids grow monotonically and are never handed out twice, even after deletes.
    inner.last_id += 1;
    let id = SongId::from_i64(inner.last_id);

    let song = Song {
      id,
      group: new_song.group,
      song: new_song.song,
      release_date: String::new(),
      link: String::new(),
      text: String::new(),
    };
    inner.rows.insert(id, song.clone());
    Ok(song)
  }

  async fn get_songs(&self, filter: &SongFilter, page: Pagination) -> Result<Vec<Song>, CoreError> {
    let inner = self.lock("get_songs")?;

    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);

    Ok(inner.rows.values().filter(|s| filter.matches(&s.group, &s.song)).skip(skip).take(take).cloned().collect())
  }

  async fn find_song(&self, id: SongId) -> Result<Option<Song>, CoreError> {
    Ok(self.lock("find_song")?.rows.get(&id).cloned())
  }

  async fn update_song(&self, id: SongId, detail: SongDetail) -> Result<u64, CoreError> {
    let mut inner = self.lock("update_song")?;
    match inner.rows.get_mut(&id) {
      Some(song) => {
        song.release_date = detail.release_date;
        song.link = detail.link;
        song.text = detail.text;
        Ok(1)
      }
      None => Ok(0),
    }
  }

  async fn delete_song(&self, id: SongId) -> Result<u64, CoreError> {
    Ok(self.lock("delete_song")?.rows.remove(&id).map_or(0, |_| 1))
  }
}
