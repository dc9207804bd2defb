//! Individual self-service endpoints. Bearer auth.

use axum::{
  Json,
  extract::{Multipart, Path, State},
  response::IntoResponse,
};
use jobgate_core::{gate::AuthorizationGate, store::MarketStore};
use serde_json::json;

use super::{Form, applications::RESUME_FOLDER};
use crate::{
  AppState,
  auth::IndividualSession,
  error::{ApiError, ApiResult},
};

/// `GET /individuals/me`
pub async fn me(IndividualSession(individual): IndividualSession) -> impl IntoResponse {
  Json(json!({ "individual": individual }))
}

/// `PUT /individuals/{id}/resume`: multipart `resume` file.
pub async fn update_resume<S>(
  State(state): State<AppState<S>>,
  IndividualSession(individual): IndividualSession,
  Path(target_id): Path<String>,
  multipart: Multipart,
) -> ApiResult<impl IntoResponse>
where
  S: MarketStore + 'static,
{
  // Refuse before anything is written to the asset store.
  AuthorizationGate.authorize_self(&individual, &target_id)?;

  let form = Form::read(multipart).await?;
  let file = form
    .file("resume")
    .ok_or_else(|| ApiError::bad_request("resume file is required"))?;
  let asset = state.assets.publish_spooled(RESUME_FOLDER, file).await?;

  let result = state.resumes.update(&individual, &target_id, asset.url.clone()).await;
  let updated = state.assets.settle(Some(asset), result).await?;
  Ok(Json(json!({ "individual": updated })))
}
