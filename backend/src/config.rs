use serde::{Deserialize, Serialize};
use songbook_config::{ConfigBackend, ConfigError, TomlConfigBackend, config_backend, env_override};
use std::time::Duration;

/// `[server]` section of songbook.toml.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
  /// Worker threads; defaults to the number of physical cores.
  pub workers: Option<usize>,
  /// Grace period for in-flight requests after a shutdown signal.
  pub shutdown_timeout_secs: u64,
  /// Default `tracing` filter when `RUST_LOG` is unset.
  pub log_filter: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    ServerConfig {
      host: "0.0.0.0".to_string(),
      port: 8080,
      workers: None,
      shutdown_timeout_secs: 10,
      log_filter: "info".to_string(),
    }
  }
}

impl ServerConfig {
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(config_backend()?)
  }

  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg: ServerConfig = backend.load_section_with_default("server")?;
    backend.save_section("server", &cfg)?;
    cfg.with_env_overrides()
  }

  pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
    if let Some(host) = env_override::<String>("SONGBOOK_HOST")? {
      self.host = host;
    }
    if let Some(port) = env_override::<u16>("SONGBOOK_PORT")? {
      self.port = port;
    }
    Ok(self)
  }

  pub fn shutdown_timeout(&self) -> Duration {
    Duration::from_secs(self.shutdown_timeout_secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn test_server_section_defaults_and_overrides() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("songbook.toml");
    std::fs::write(&path, "# local dev\n[server]\nport = 9000\n").unwrap();

    let backend = TomlConfigBackend::from_file(&path);
    let cfg: ServerConfig = backend.load_section_with_default("server").unwrap();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.shutdown_timeout(), Duration::from_secs(10));
  }
}
