use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter` (the `[server]
/// log_filter` setting). The subscriber also captures `log` records, which
/// is how actix-web's access logger reaches the same output.
pub fn init(default_filter: &str) -> anyhow::Result<()> {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(default_filter))
    .map_err(|e| anyhow!("invalid log filter `{default_filter}`: {e}"))?;

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .try_init()
    .map_err(|e| anyhow!("install tracing subscriber: {e}"))
}
