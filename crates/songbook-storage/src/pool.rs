use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;

use crate::config::StorageConfig;
use crate::error::StorageError;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Applies per-connection pragmas every time r2d2 opens a connection.
#[derive(Debug)]
struct SqlitePragmas {
  busy_timeout_ms: u64,
  journal_mode: Option<String>,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    let mut pragmas = format!("PRAGMA busy_timeout = {};", self.busy_timeout_ms);
    // journal_mode is checked against SQLite's fixed list in StorageConfig::validate.
    if let Some(mode) = &self.journal_mode {
      pragmas.push_str(&format!(" PRAGMA journal_mode = {mode};"));
    }
    conn.batch_execute(&pragmas).map_err(diesel::r2d2::Error::QueryError)
  }
}

/// Builds the process-wide pool. Connections are opened eagerly, so a bad
/// `database_url` fails here rather than on the first request.
pub fn build_pool(cfg: &StorageConfig) -> Result<DbPool, StorageError> {
  let manager = ConnectionManager::<SqliteConnection>::new(&cfg.database_url);

  let pool = Pool::builder()
    .max_size(cfg.pool_size)
    .connection_timeout(cfg.connection_timeout())
    .connection_customizer(Box::new(SqlitePragmas {
      busy_timeout_ms: cfg.busy_timeout_ms,
      journal_mode: cfg.journal_mode.clone(),
    }))
    .build(manager)?;

  Ok(pool)
}
