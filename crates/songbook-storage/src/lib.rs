pub mod config;
pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod schema;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use tracing::{debug, info};

use songbook_core::domain::{NewSong, Pagination, Song, SongDetail, SongFilter, SongId};
use songbook_core::errors::CoreError;
use songbook_core::ports::SongRepository;

pub use config::StorageConfig;
pub use error::StorageError;
pub use pool::{DbPool, build_pool};

use crate::models::{NewSongRow, SongChangeset, SongRow};
use crate::schema::songs;

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// `SongRepository` over SQLite via diesel and an r2d2 pool.
///
/// Diesel is blocking, so every call checks out a connection and runs on
/// tokio's blocking pool, bounded by `query_timeout`. Writes commit only if
/// they finish before that deadline. The pool is shared; the repository adds
/// no locking of its own.
#[derive(Clone)]
pub struct SqliteSongRepository {
  pool: DbPool,
  query_timeout: Duration,
}

impl SqliteSongRepository {
  pub fn new(pool: DbPool) -> Self {
    Self { pool, query_timeout: DEFAULT_QUERY_TIMEOUT }
  }

  pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
    self.query_timeout = query_timeout;
    self
  }

  /// Builds the pool described by `cfg` and wraps it.
  pub fn from_config(cfg: &StorageConfig) -> Result<Self, CoreError> {
    let pool = build_pool(cfg).map_err(|e| e.into_core("open_pool"))?;
    info!(database_url = %cfg.database_url, pool_size = cfg.pool_size, "storage pool ready");
    Ok(Self::new(pool).with_query_timeout(cfg.query_timeout()))
  }

  pub fn pool(&self) -> &DbPool {
    &self.pool
  }

  /// Runs `f` on a pooled connection off the async runtime, under the
  /// repository deadline. Errors come back prefixed with `op`.
  async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T, CoreError>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
  {
    self.dispatch(op, false, move |conn, _| f(conn)).await
  }

  /// Like [`run`](Self::run), but inside an immediate transaction that only
  /// commits while the caller is still waiting. A call that times out or is
  /// dropped rolls back. On timeout the caller waits for the blocking task to
  /// settle, so `Timeout` always means nothing was written.
  async fn run_write<T, F>(&self, op: &'static str, f: F) -> Result<T, CoreError>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
  {
    self
      .dispatch(op, true, move |conn, cutoff| {
        conn.immediate_transaction(|conn| {
          let out = f(conn)?;
          cutoff.check()?;
          Ok(out)
        })
      })
      .await
  }

  async fn dispatch<T, F>(&self, op: &'static str, settle: bool, f: F) -> Result<T, CoreError>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection, &Cutoff) -> Result<T, StorageError> + Send + 'static,
  {
    let timeout_ms = u64::try_from(self.query_timeout.as_millis()).unwrap_or(u64::MAX);
    let cutoff = Cutoff::new(self.query_timeout, timeout_ms);
    let _abandon = AbandonOnDrop(cutoff.clone());

    let pool = self.pool.clone();
    let task_cutoff = cutoff.clone();
    let mut task = tokio::task::spawn_blocking(move || {
      let mut conn = pool.get()?;
      f(&mut conn, &task_cutoff)
    });

    let waited = tokio::time::timeout(self.query_timeout, &mut task).await;
    let joined = match waited {
      Ok(joined) => joined,
      Err(_) => {
        cutoff.abandon();
        if !settle {
          return Err(StorageError::Timeout(timeout_ms).into_core(op));
        }
        debug!(op, timeout_ms, "deadline passed, waiting for rollback");
        task.await
      }
    };

    joined.map_err(|e| StorageError::from(e).into_core(op))?.map_err(|e| e.into_core(op))
  }
}

/// Shared between a call and its blocking task. Tripped when the caller stops
/// waiting; a passed deadline counts as tripped too.
#[derive(Clone)]
struct Cutoff {
  abandoned: Arc<AtomicBool>,
  deadline: Option<Instant>,
  timeout_ms: u64,
}

impl Cutoff {
  fn new(timeout: Duration, timeout_ms: u64) -> Self {
    Self { abandoned: Arc::new(AtomicBool::new(false)), deadline: Instant::now().checked_add(timeout), timeout_ms }
  }

  fn abandon(&self) {
    self.abandoned.store(true, Ordering::Release);
  }

  fn check(&self) -> Result<(), StorageError> {
    if self.abandoned.load(Ordering::Acquire) || self.deadline.is_some_and(|d| Instant::now() >= d) {
      return Err(StorageError::Timeout(self.timeout_ms));
    }
    Ok(())
  }
}

/// Trips the cutoff when the calling future is dropped mid-flight.
struct AbandonOnDrop(Cutoff);

impl Drop for AbandonOnDrop {
  fn drop(&mut self) {
    self.0.abandon();
  }
}

#[async_trait]
impl SongRepository for SqliteSongRepository {
  async fn apply_migrations(&self) -> Result<(), CoreError> {
    let applied = self.run("apply_migrations", migrations::run_migrations).await?;
    if applied.is_empty() {
      info!("schema up to date");
    } else {
      info!(versions = ?applied, "applied migrations");
    }
    Ok(())
  }

  async fn create_song(&self, new_song: NewSong) -> Result<Song, CoreError> {
    let row = self
      .run_write("create_song", move |conn| {
        let row: SongRow = diesel::insert_into(songs::table)
          .values(&NewSongRow { group_name: &new_song.group, song: &new_song.song })
          .returning(SongRow::as_returning())
          .get_result(conn)?;
        Ok(row)
      })
      .await?;

    debug!(id = row.id, "song created");
    Ok(row.into())
  }

  async fn get_songs(&self, filter: &SongFilter, page: Pagination) -> Result<Vec<Song>, CoreError> {
    let filter = filter.clone();

    let rows = self
      .run("get_songs", move |conn| {
        let mut query = songs::table.select(SongRow::as_select()).into_boxed::<Sqlite>();

        if let Some(group) = &filter.group {
          query = query.filter(songs::group_name.eq(group));
        }
        if let Some(song) = &filter.song {
          query = query.filter(songs::song.eq(song));
        }

        let rows: Vec<SongRow> = query.order(songs::id.asc()).limit(page.limit()).offset(page.offset()).load(conn)?;
        Ok(rows)
      })
      .await?;

    debug!(count = rows.len(), page = page.page(), page_size = page.page_size(), "songs listed");
    Ok(rows.into_iter().map(Song::from).collect())
  }

  async fn find_song(&self, id: SongId) -> Result<Option<Song>, CoreError> {
    let row = self
      .run("find_song", move |conn| {
        let row: Option<SongRow> = songs::table.find(id.as_i64()).select(SongRow::as_select()).first(conn).optional()?;
        Ok(row)
      })
      .await?;

    Ok(row.map(Song::from))
  }

  async fn update_song(&self, id: SongId, detail: SongDetail) -> Result<u64, CoreError> {
    let affected = self
      .run_write("update_song", move |conn| {
        let changes = SongChangeset { release_date: &detail.release_date, link: &detail.link, text: &detail.text };
        let n = diesel::update(songs::table.find(id.as_i64())).set(&changes).execute(conn)?;
        Ok(n as u64)
      })
      .await?;

    debug!(%id, affected, "song updated");
    Ok(affected)
  }

  async fn delete_song(&self, id: SongId) -> Result<u64, CoreError> {
    let affected = self
      .run_write("delete_song", move |conn| {
        let n = diesel::delete(songs::table.find(id.as_i64())).execute(conn)?;
        Ok(n as u64)
      })
      .await?;

    debug!(%id, affected, "song deleted");
    Ok(affected)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use diesel::connection::SimpleConnection;
  use tempfile::{TempDir, tempdir};

  async fn repo() -> (TempDir, SqliteSongRepository) {
    let tmp = tempdir().unwrap();
    let mut cfg = StorageConfig::for_url(tmp.path().join("songs.db").to_string_lossy());
    cfg.pool_size = 2;

    let repo = SqliteSongRepository::from_config(&cfg).unwrap();
    repo.apply_migrations().await.unwrap();
    (tmp, repo)
  }

  async fn seed(repo: &SqliteSongRepository, rows: &[(&str, &str)]) -> Vec<Song> {
    let mut out = Vec::new();
    for (group, song) in rows {
      out.push(repo.create_song(NewSong::new(*group, *song)).await.unwrap());
    }
    out
  }

  #[tokio::test]
  async fn test_migrations_are_idempotent() {
    let (_tmp, repo) = repo().await;
    repo.apply_migrations().await.unwrap();
    repo.apply_migrations().await.unwrap();
  }

  #[tokio::test]
  async fn test_migrations_accept_preexisting_table() {
    let tmp = tempdir().unwrap();
    let cfg = StorageConfig::for_url(tmp.path().join("legacy.db").to_string_lossy());
    let repo = SqliteSongRepository::from_config(&cfg).unwrap();

    repo
      .pool()
      .get()
      .unwrap()
      .batch_execute(
        "CREATE TABLE songs (id INTEGER PRIMARY KEY AUTOINCREMENT, \"group\" TEXT NOT NULL, song TEXT NOT NULL, \
         releasedate TEXT NOT NULL DEFAULT '', link TEXT NOT NULL DEFAULT '', text TEXT NOT NULL DEFAULT '');",
      )
      .unwrap();

    repo.apply_migrations().await.unwrap();
    assert_eq!(repo.create_song(NewSong::new("Muse", "Starlight")).await.unwrap().song, "Starlight");
  }

  #[tokio::test]
  async fn test_create_returns_row_with_defaults() {
    let (_tmp, repo) = repo().await;

    let song = repo.create_song(NewSong::new("Muse", "Starlight")).await.unwrap();
    assert_eq!(song.group, "Muse");
    assert_eq!(song.song, "Starlight");
    assert_eq!((song.release_date.as_str(), song.link.as_str(), song.text.as_str()), ("", "", ""));

    let listed = repo.get_songs(&SongFilter::new(Some("Muse"), None), Pagination::default()).await.unwrap();
    assert_eq!(listed, vec![song]);
  }

  #[tokio::test]
  async fn test_repository_does_not_reject_empty_strings() {
    let (_tmp, repo) = repo().await;
    let song = repo.create_song(NewSong::new("", "")).await.unwrap();
    assert_eq!(song.group, "");
  }

  #[tokio::test]
  async fn test_filters_combine_with_and() {
    let (_tmp, repo) = repo().await;
    seed(&repo, &[("Muse", "Starlight"), ("Muse", "Uprising"), ("Queen", "Starlight")]).await;

    let all = repo.get_songs(&SongFilter::new(Some(""), Some("")), Pagination::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let muse = repo.get_songs(&SongFilter::new(Some("Muse"), None), Pagination::default()).await.unwrap();
    assert!(muse.iter().all(|s| s.group == "Muse"));
    assert_eq!(muse.len(), 2);

    let both =
      repo.get_songs(&SongFilter::new(Some("Muse"), Some("Starlight")), Pagination::default()).await.unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].song, "Starlight");
  }

  #[tokio::test]
  async fn test_filter_values_are_bound_not_interpolated() {
    let (_tmp, repo) = repo().await;
    seed(&repo, &[("Muse", "Starlight")]).await;

    let hostile = SongFilter::new(Some("x' OR '1'='1"), None);
    assert!(repo.get_songs(&hostile, Pagination::default()).await.unwrap().is_empty());

    let quoted = repo.create_song(NewSong::new("Guns N' Roses", "\"Patience\"")).await.unwrap();
    let found = repo.get_songs(&SongFilter::new(Some("Guns N' Roses"), None), Pagination::default()).await.unwrap();
    assert_eq!(found, vec![quoted]);
  }

  #[tokio::test]
  async fn test_pagination_is_ordered_and_disjoint() {
    let (_tmp, repo) = repo().await;
    let titles: Vec<String> = (0..12).map(|i| format!("Track {i}")).collect();
    let rows: Vec<(&str, &str)> = titles.iter().map(|t| ("Band", t.as_str())).collect();
    let created = seed(&repo, &rows).await;

    let filter = SongFilter::new(Some("Band"), None);
    let first = repo.get_songs(&filter, Pagination::new(1, 5).unwrap()).await.unwrap();
    let second = repo.get_songs(&filter, Pagination::new(2, 5).unwrap()).await.unwrap();
    let third = repo.get_songs(&filter, Pagination::new(3, 5).unwrap()).await.unwrap();
    let beyond = repo.get_songs(&filter, Pagination::new(4, 5).unwrap()).await.unwrap();

    assert_eq!(first, created[0..5]);
    assert_eq!(second, created[5..10]);
    assert_eq!(third, created[10..12]);
    assert!(beyond.is_empty());
  }

  #[tokio::test]
  async fn test_update_overwrites_mutable_fields_only() {
    let (_tmp, repo) = repo().await;
    let song = repo.create_song(NewSong::new("Muse", "Starlight")).await.unwrap();

    let detail =
      SongDetail { release_date: "2006-01-01".into(), link: "http://x".into(), text: "la la".into() };
    assert_eq!(repo.update_song(song.id, detail.clone()).await.unwrap(), 1);

    let stored = repo.find_song(song.id).await.unwrap().unwrap();
    assert_eq!(stored.detail(), detail);
    assert_eq!((stored.group.as_str(), stored.song.as_str()), ("Muse", "Starlight"));

    // A second update replaces wholesale: omitted values become empty.
    let partial = SongDetail { text: "new text".into(), ..Default::default() };
    repo.update_song(song.id, partial.clone()).await.unwrap();
    assert_eq!(repo.find_song(song.id).await.unwrap().unwrap().detail(), partial);
  }

  #[tokio::test]
  async fn test_missing_id_is_a_silent_noop() {
    let (_tmp, repo) = repo().await;
    let missing = SongId::from_i64(4242);

    assert_eq!(repo.update_song(missing, SongDetail::default()).await.unwrap(), 0);
    assert_eq!(repo.delete_song(missing).await.unwrap(), 0);
    assert!(repo.find_song(missing).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_delete_is_idempotent_and_ids_are_not_reused() {
    let (_tmp, repo) = repo().await;
    let first = repo.create_song(NewSong::new("Muse", "Starlight")).await.unwrap();

    assert_eq!(repo.delete_song(first.id).await.unwrap(), 1);
    assert_eq!(repo.delete_song(first.id).await.unwrap(), 0);

    let second = repo.create_song(NewSong::new("Muse", "Starlight")).await.unwrap();
    assert!(second.id > first.id);
  }

  #[tokio::test]
  async fn test_errors_carry_operation_name() {
    let tmp = tempdir().unwrap();
    let cfg = StorageConfig::for_url(tmp.path().join("empty.db").to_string_lossy());
    let repo = SqliteSongRepository::from_config(&cfg).unwrap();

    // No migrations applied: the table does not exist.
    let err = repo.get_songs(&SongFilter::default(), Pagination::default()).await.unwrap_err();
    assert!(matches!(err, CoreError::Repository(_)));
    assert!(err.to_string().contains("get_songs:"), "{err}");

    let err = repo.create_song(NewSong::new("Muse", "Starlight")).await.unwrap_err();
    assert!(err.to_string().contains("create_song:"), "{err}");
  }

  #[tokio::test]
  async fn test_timed_out_writes_roll_back() {
    let tmp = tempdir().unwrap();
    let mut cfg = StorageConfig::for_url(tmp.path().join("songs.db").to_string_lossy());
    cfg.pool_size = 3;
    cfg.busy_timeout_ms = 3_000;
    cfg.query_timeout_ms = 200;

    let repo = SqliteSongRepository::from_config(&cfg).unwrap();
    repo.apply_migrations().await.unwrap();
    let song = repo.create_song(NewSong::new("Muse", "Starlight")).await.unwrap();

    // Another connection holds the write lock well past the deadline.
    let mut holder = repo.pool().get().unwrap();
    holder.batch_execute("BEGIN EXCLUSIVE;").unwrap();
    let release = std::thread::spawn(move || {
      std::thread::sleep(Duration::from_millis(800));
      holder.batch_execute("COMMIT;").unwrap();
    });

    let detail = SongDetail { text: "too late".into(), ..Default::default() };
    let (updated, created) =
      tokio::join!(repo.update_song(song.id, detail), repo.create_song(NewSong::new("Muse", "Uprising")));
    assert!(matches!(updated, Err(CoreError::Timeout(200))), "{updated:?}");
    assert!(matches!(created, Err(CoreError::Timeout(200))), "{created:?}");
    release.join().unwrap();

    assert_eq!(repo.find_song(song.id).await.unwrap().unwrap().detail(), SongDetail::default());
    let all = repo.get_songs(&SongFilter::default(), Pagination::default()).await.unwrap();
    assert_eq!(all, vec![song]);
  }
}
