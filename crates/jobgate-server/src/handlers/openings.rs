//! Opening mutations. All require the owning organization's `token` header.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/openings` | json [`NewOpening`] |
//! | `PUT`    | `/openings/{id}/visibility` | json `{"visible": bool}` |
//! | `DELETE` | `/openings/{id}` | also removes its applications |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use jobgate_core::{market::NewOpening, store::MarketStore};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::OrganizationSession, error::ApiResult};

/// `POST /openings`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  OrganizationSession(organization): OrganizationSession,
  Json(body): Json<NewOpening>,
) -> ApiResult<impl IntoResponse>
where
  S: MarketStore + 'static,
{
  let opening = state.openings.create(&organization, body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "opening": opening }))))
}

#[derive(Debug, Deserialize)]
pub struct VisibilityBody {
  pub visible: bool,
}

/// `PUT /openings/{id}/visibility`
pub async fn set_visibility<S>(
  State(state): State<AppState<S>>,
  OrganizationSession(organization): OrganizationSession,
  Path(id): Path<Uuid>,
  Json(body): Json<VisibilityBody>,
) -> ApiResult<impl IntoResponse>
where
  S: MarketStore + 'static,
{
  let opening = state.openings.set_visibility(&organization, id, body.visible).await?;
  Ok(Json(json!({ "opening": opening })))
}

/// `DELETE /openings/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  OrganizationSession(organization): OrganizationSession,
  Path(id): Path<Uuid>,
) -> ApiResult<StatusCode>
where
  S: MarketStore + 'static,
{
  state.openings.delete(&organization, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
