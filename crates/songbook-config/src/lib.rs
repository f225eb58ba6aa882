mod backend;
mod env;
mod io;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use env::env_override;
pub use io::atomic_write_str;
pub use paths::{ConfigError, SongbookPaths};

use once_cell::sync::OnceCell;

static PATHS: OnceCell<SongbookPaths> = OnceCell::new();
static CONFIG_BACKEND: OnceCell<TomlConfigBackend> = OnceCell::new();

/// Process-wide paths (portable via `SONGBOOK_BASE_DIR`, or system dirs).
/// Detected on first use; a failed detection is retried on the next call.
pub fn paths() -> Result<&'static SongbookPaths, ConfigError> {
  PATHS.get_or_try_init(SongbookPaths::detect)
}

/// Process-wide config backend bound to [`paths`].
pub fn config_backend() -> Result<&'static TomlConfigBackend, ConfigError> {
  CONFIG_BACKEND.get_or_try_init(|| Ok(TomlConfigBackend::new(paths()?.clone())))
}
