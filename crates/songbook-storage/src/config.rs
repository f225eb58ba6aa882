use serde::{Deserialize, Serialize};
use songbook_config::{ConfigBackend, ConfigError, TomlConfigBackend, config_backend, env_override, paths};
use std::path::PathBuf;
use std::time::Duration;

const JOURNAL_MODES: &[&str] = &["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
  /// SQLite path or `file:` URL. Overridden by `SONGBOOK_DATABASE_URL`.
  pub database_url: String,
  /// Maximum pooled connections.
  pub pool_size: u32,
  /// How long a call waits to check a connection out of the pool.
  pub connection_timeout_ms: u64,
  /// How long SQLite waits on a locked database before failing a statement.
  pub busy_timeout_ms: u64,
  /// Deadline for a whole repository call, checkout included.
  pub query_timeout_ms: u64,
  pub journal_mode: Option<String>,
}

impl Default for StorageConfig {
  fn default() -> Self {
    let db_path = paths().map(|p| p.data_dir.join("songbook.db")).unwrap_or_else(|_| PathBuf::from("songbook.db"));

    StorageConfig {
      database_url: db_path.to_string_lossy().into_owned(),
      pool_size: 8,
      connection_timeout_ms: 5_000,
      busy_timeout_ms: 5_000,
      query_timeout_ms: 10_000,
      journal_mode: Some("WAL".to_string()),
    }
  }
}

impl StorageConfig {
  /// Loads `[storage]` from the global config file, writing defaults back so
  /// the file documents every knob, then applies environment overrides.
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(config_backend()?)
  }

  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg: StorageConfig = backend.load_section_with_default("storage")?;
    backend.save_section("storage", &cfg)?;
    cfg.with_env_overrides()
  }

  pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
    if let Some(url) = env_override::<String>("SONGBOOK_DATABASE_URL")? {
      self.database_url = url;
    }
    self.validate()?;
    Ok(self)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.database_url.trim().is_empty() {
      return Err(ConfigError::Other("storage.database_url must not be empty".into()));
    }
    if self.pool_size == 0 {
      return Err(ConfigError::Other("storage.pool_size must be at least 1".into()));
    }
    if self.connection_timeout_ms == 0 {
      return Err(ConfigError::Other("storage.connection_timeout_ms must be at least 1".into()));
    }
    if self.query_timeout_ms == 0 {
      return Err(ConfigError::Other("storage.query_timeout_ms must be at least 1".into()));
    }
    if let Some(mode) = &self.journal_mode {
      if !JOURNAL_MODES.contains(&mode.to_ascii_uppercase().as_str()) {
        return Err(ConfigError::Other(format!("storage.journal_mode `{mode}` is not a SQLite journal mode")));
      }
    }
    Ok(())
  }

  pub fn connection_timeout(&self) -> Duration {
    Duration::from_millis(self.connection_timeout_ms)
  }

  pub fn query_timeout(&self) -> Duration {
    Duration::from_millis(self.query_timeout_ms)
  }

  /// Config pointing at `database_url` with the remaining defaults.
  pub fn for_url(database_url: impl Into<String>) -> Self {
    StorageConfig { database_url: database_url.into(), ..Default::default() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn test_load_from_writes_defaults_back() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::from_file(tmp.path().join("songbook.toml"));

    let cfg = StorageConfig::load_from(&backend).unwrap();
    assert_eq!(cfg.pool_size, 8);

    let raw = std::fs::read_to_string(backend.path()).unwrap();
    assert!(raw.contains("[storage]"));
    assert!(raw.contains("query_timeout_ms = 10000"));
  }

  #[test]
  fn test_partial_section_keeps_defaults() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("songbook.toml");
    std::fs::write(&path, "[storage]\ndatabase_url = \"/srv/songs.db\"\npool_size = 2\n").unwrap();

    let cfg: StorageConfig = TomlConfigBackend::from_file(&path).load_section("storage").unwrap();
    assert_eq!(cfg.database_url, "/srv/songs.db");
    assert_eq!(cfg.pool_size, 2);
    assert_eq!(cfg.busy_timeout_ms, 5_000);
  }

  #[test]
  fn test_validate_rejects_bad_values() {
    let mut cfg = StorageConfig::for_url("songs.db");
    assert!(cfg.validate().is_ok());

    cfg.journal_mode = Some("wal; DROP TABLE songs".into());
    assert!(cfg.validate().is_err());

    cfg.journal_mode = Some("wal".into());
    cfg.pool_size = 0;
    assert!(cfg.validate().is_err());

    cfg.pool_size = 1;
    cfg.connection_timeout_ms = 0;
    assert!(cfg.validate().is_err());

    cfg.connection_timeout_ms = 1;
    cfg.query_timeout_ms = 0;
    assert!(cfg.validate().is_err());

    cfg.query_timeout_ms = 1;
    assert!(cfg.validate().is_ok());
  }
}
