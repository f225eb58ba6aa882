use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use songbook_core::CoreError;
use thiserror::Error;

/// HTTP view of a [`CoreError`]: the message goes out as a plain-text body.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] CoreError);

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match &self.0 {
      CoreError::Validation(_) => StatusCode::BAD_REQUEST,
      CoreError::NotFound => StatusCode::NOT_FOUND,
      CoreError::Repository(_) | CoreError::Migration(_) | CoreError::Timeout(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    HttpResponse::build(self.status_code()).insert_header(ContentType::plaintext()).body(self.to_string())
  }
}
