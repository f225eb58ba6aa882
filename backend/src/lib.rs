mod config;
mod dto;
mod error;
mod handlers;
pub mod infrastructure;

use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing::info;

use songbook_core::ports::SongRepository;
use songbook_core::services::CatalogService;
use songbook_storage::{SqliteSongRepository, StorageConfig};

pub use config::ServerConfig;
pub use handlers::configure;

/// The catalog behind a trait object, so tests can run the same routes over
/// the in-memory repository.
pub type SharedCatalog = CatalogService<Arc<dyn SongRepository>>;

/// Shared application state handed to every worker.
pub struct AppState {
  pub catalog: SharedCatalog,
}

impl AppState {
  pub fn new(repo: Arc<dyn SongRepository>) -> Self {
    Self { catalog: CatalogService::new(repo) }
  }
}

/// Loads config, opens storage, migrates and serves until SIGINT/SIGTERM.
///
/// Any failure before the listener is up (config, pool, migrations) aborts
/// startup; the service never serves an unmigrated schema.
pub async fn run() -> anyhow::Result<()> {
  // A missing .env is normal outside development.
  let _ = dotenvy::dotenv();

  let server_cfg = ServerConfig::load().context("load [server] config")?;
  infrastructure::logging::init(&server_cfg.log_filter)?;

  // --- Dependency Injection Phase ---

  // 1. Persistence adapter (SQLite pool). Fails fast on a bad database_url.
  let storage_cfg = StorageConfig::load().context("load [storage] config")?;
  let repo = SqliteSongRepository::from_config(&storage_cfg).context("open storage")?;

  // 2. Service wiring.
  let state = web::Data::new(AppState::new(Arc::new(repo)));

  // 3. Schema, before the first request can arrive.
  state.catalog.migrate().await.context("apply migrations")?;

  serve(state, &server_cfg).await?;

  info!("gracefully stopped");
  Ok(())
}

/// Binds and runs the HTTP server. actix-web handles the shutdown signals and
/// drains in-flight requests for `shutdown_timeout`; the pool is dropped with
/// the last reference to `state`.
pub async fn serve(state: web::Data<AppState>, cfg: &ServerConfig) -> anyhow::Result<()> {
  let mut server = HttpServer::new(move || App::new().app_data(state.clone()).wrap(Logger::default()).configure(configure))
    .shutdown_timeout(cfg.shutdown_timeout().as_secs());

  if let Some(workers) = cfg.workers {
    server = server.workers(workers);
  }

  let server = server.bind((cfg.host.as_str(), cfg.port)).with_context(|| format!("bind {}:{}", cfg.host, cfg.port))?;
  info!(host = %cfg.host, port = cfg.port, "listening");

  server.run().await.context("http server")
}
