//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is `{"error": "<message>"}`. Server-side failures are
//! logged in full and answered with a generic message.

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use jobgate_core::Error;
use serde_json::json;
use thiserror::Error;

use crate::upload::UploadError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] Error),

  #[error("malformed form data: {0}")]
  Multipart(#[from] MultipartError),

  #[error("upload failed: {0}")]
  Upload(#[from] UploadError),
}

impl ApiError {
  pub fn bad_request(msg: impl Into<String>) -> Self { Self::Domain(Error::ValidationFailed(msg.into())) }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Domain(e) => match e {
        Error::Invalid | Error::Expired => StatusCode::UNAUTHORIZED,
        Error::Forbidden => StatusCode::FORBIDDEN,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        Error::Misconfigured(_) | Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      ApiError::Multipart(e) => e.status(),
      ApiError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Domain(Error::Misconfigured(detail)) => {
        tracing::error!(detail = %detail, "server misconfigured");
        "server misconfigured".to_owned()
      }
      _ if status.is_server_error() => {
        tracing::error!(error = %self, "request failed");
        "internal error".to_owned()
      }
      ApiError::Domain(Error::Invalid) => "unauthorized".to_owned(),
      ApiError::Domain(Error::Expired) => "credential expired".to_owned(),
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
  use super::*;

  async fn body(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[test]
  fn taxonomy_maps_to_status_codes() {
    let cases = [
      (Error::Invalid, StatusCode::UNAUTHORIZED),
      (Error::Expired, StatusCode::UNAUTHORIZED),
      (Error::Forbidden, StatusCode::FORBIDDEN),
      (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
      (Error::Conflict("x".into()), StatusCode::CONFLICT),
      (Error::ValidationFailed("x".into()), StatusCode::BAD_REQUEST),
      (Error::Misconfigured("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).status(), status);
    }
  }

  #[tokio::test]
  async fn server_errors_hide_details() {
    let resp = ApiError::from(Error::Misconfigured("no provider key".into())).into_response();
    assert_eq!(body(resp).await, json!({ "error": "server misconfigured" }));

    let io = std::io::Error::other("disk on fire");
    let resp = ApiError::from(Error::Store(Box::new(io))).into_response();
    assert_eq!(body(resp).await, json!({ "error": "internal error" }));
  }

  #[tokio::test]
  async fn client_errors_carry_message() {
    let resp = ApiError::from(Error::Conflict("already applied to this opening".into())).into_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body(resp).await, json!({ "error": "conflict: already applied to this opening" }));
  }
}
