use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};
use songbook_core::domain::SongId;
use tracing::{error, info};

use crate::AppState;
use crate::dto::{CreateSongRequest, DeleteSongRequest, SongsQuery, UpdateSongRequest};
use crate::error::ApiError;

/// Registers every route under `/api/v1`. The legacy paths (`/info`,
/// `/create`) stay mapped to the same handlers as their `/songs/...` forms.
pub fn configure(cfg: &mut web::ServiceConfig) {
  cfg.app_data(json_config()).service(
    web::scope("/api/v1")
      .route("/songs/index", web::get().to(get_songs))
      .route("/info", web::get().to(get_songs))
      .route("/songs/create", web::post().to(create_song))
      .route("/create", web::post().to(create_song))
      .route("/songs/{id:\\d+}", web::get().to(get_song))
      .route("/update", web::put().to(update_song))
      .route("/delete", web::delete().to(delete_song)),
  );
}

/// Bodies are accepted without a JSON content type; any decode failure is a
/// 400 with a fixed message, the decoder detail only goes to the log.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().content_type_required(false).error_handler(|err: JsonPayloadError, req| {
    error!(uri = %req.uri(), error = %err, "invalid request payload");
    InternalError::from_response(err, HttpResponse::BadRequest().body("invalid request payload")).into()
  })
}

fn peer(req: &HttpRequest) -> String {
  req.peer_addr().map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
}

async fn get_songs(
  state: web::Data<AppState>,
  req: HttpRequest,
  query: web::Query<SongsQuery>,
) -> Result<HttpResponse, ApiError> {
  let q = query.into_inner();
  info!(
    ip = %peer(&req),
    uri = %req.uri(),
    group = ?q.group,
    song = ?q.song,
    page = ?q.page,
    page_size = ?q.page_size,
    "received GET request"
  );

  let songs = state
    .catalog
    .list(q.group.as_deref(), q.song.as_deref(), q.page.as_deref(), q.page_size.as_deref())
    .await
    .inspect_err(|e| error!(error = %e, "get_songs failed"))?;

  Ok(HttpResponse::Ok().json(songs))
}

async fn get_song(state: web::Data<AppState>, req: HttpRequest, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
  let id = SongId::from_i64(path.into_inner());
  info!(ip = %peer(&req), uri = %req.uri(), %id, "received GET request");

  let song = state.catalog.get(id).await.inspect_err(|e| error!(%id, error = %e, "get_song failed"))?;

  Ok(HttpResponse::Ok().json(song))
}

async fn create_song(
  state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Json<CreateSongRequest>,
) -> Result<HttpResponse, ApiError> {
  let body = body.into_inner();
  info!(ip = %peer(&req), uri = %req.uri(), group = %body.group, song = %body.song, "received POST request");

  let created = state
    .catalog
    .create(&body.group, &body.song)
    .await
    .inspect_err(|e| error!(error = %e, "create_song failed"))?;

  info!(id = %created.id, "song created");
  Ok(HttpResponse::Created().finish())
}

async fn update_song(
  state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Json<UpdateSongRequest>,
) -> Result<HttpResponse, ApiError> {
  let UpdateSongRequest { song_id, song_detail } = body.into_inner();
  info!(
    ip = %peer(&req),
    uri = %req.uri(),
    %song_id,
    release_date = %song_detail.release_date,
    link = %song_detail.link,
    text = %song_detail.text,
    "received PUT request"
  );

  let affected = state
    .catalog
    .update(song_id, song_detail)
    .await
    .inspect_err(|e| error!(%song_id, error = %e, "update_song failed"))?;

  if affected == 0 {
    info!(%song_id, "update matched no song");
  }
  Ok(HttpResponse::Ok().finish())
}

async fn delete_song(
  state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Json<DeleteSongRequest>,
) -> Result<HttpResponse, ApiError> {
  let song_id = body.into_inner().song_id;
  info!(ip = %peer(&req), uri = %req.uri(), %song_id, "received DELETE request");

  let affected =
    state.catalog.delete(song_id).await.inspect_err(|e| error!(%song_id, error = %e, "delete_song failed"))?;

  if affected == 0 {
    info!(%song_id, "delete matched no song");
  }
  Ok(HttpResponse::Ok().finish())
}
