use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::StorageError;

/// DDL compiled into the binary. Every script is written create-if-not-exists,
/// so it is also safe against a database whose table predates the
/// migration bookkeeping.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies every pending migration and returns the versions that ran.
/// Running it again on an up-to-date database is a no-op.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<Vec<String>, StorageError> {
  let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| StorageError::Migration(e.to_string()))?;
  Ok(applied.into_iter().map(|v| v.to_string()).collect())
}
