//! Applying to openings and moving applications through their lifecycle.

use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use jobgate_core::store::MarketStore;
use jobgate_market::ApplyPayload;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::Form;
use crate::{
  AppState,
  auth::{IndividualSession, OrganizationSession},
  error::ApiResult,
};

pub(crate) const RESUME_FOLDER: &str = "resumes";

/// `POST /openings/{id}/apply`: multipart with an optional `resume` file and
/// optional `cover_letter` text. Without a file the résumé on record is used.
/// Answers `201 {"application": …}`.
pub async fn apply<S>(
  State(state): State<AppState<S>>,
  IndividualSession(individual): IndividualSession,
  Path(opening_id): Path<Uuid>,
  multipart: Multipart,
) -> ApiResult<impl IntoResponse>
where
  S: MarketStore + 'static,
{
  let form = Form::read(multipart).await?;

  let resume = match form.file("resume") {
    Some(file) => Some(state.assets.publish_spooled(RESUME_FOLDER, file).await?),
    None => None,
  };
  let payload = ApplyPayload {
    resume:       resume.as_ref().map(|asset| asset.url.clone()),
    cover_letter: form.text("cover_letter").map(str::to_owned),
  };

  let result = state
    .ledger
    .apply(opening_id, &individual.individual_id, payload)
    .await;
  let application = state.assets.settle(resume, result).await?;
  Ok((StatusCode::CREATED, Json(json!({ "application": application }))))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  #[serde(default)]
  pub status: String,
}

/// `PUT /applications/{id}/status`: json `{"status": "accepted"}`.
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  OrganizationSession(organization): OrganizationSession,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> ApiResult<impl IntoResponse>
where
  S: MarketStore + 'static,
{
  let application = state.ledger.set_status(id, &organization, &body.status).await?;
  Ok(Json(json!({ "application": application })))
}
