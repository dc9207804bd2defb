//! Organization registration, login, and profile.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register` | multipart: name, email, password, logo file or `image` |
//! | `POST` | `/login` | json: `{"email","password"}` |
//! | `GET`  | `/company` | `token` header |
//! | `PUT`  | `/company` | json: `{"location","website","about"}` |

use axum::{
  Json,
  extract::{Multipart, State},
  http::StatusCode,
  response::IntoResponse,
};
use jobgate_core::{principal::OrganizationProfile, store::MarketStore};
use jobgate_identity::{Registration, Session};
use serde::Deserialize;
use serde_json::json;

use super::Form;
use crate::{AppState, auth::OrganizationSession, error::ApiResult};

const LOGO_FOLDER: &str = "logos";

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  multipart: Multipart,
) -> ApiResult<impl IntoResponse>
where
  S: MarketStore + 'static,
{
  let form = Form::read(multipart).await?;

  let published = match form.file("logo").or_else(|| form.file("image")) {
    Some(file) => Some(state.assets.publish_spooled(LOGO_FOLDER, file).await?),
    None => None,
  };
  let logo = match &published {
    Some(asset) => asset.url.clone(),
    None => form.text_or_empty("image"),
  };

  let result = state
    .accounts
    .register(Registration {
      name: form.text_or_empty("name"),
      email: form.text_or_empty("email"),
      password: form.text_or_empty("password"),
      logo,
      profile: OrganizationProfile {
        location: form.text_or_empty("location"),
        website:  form.text_or_empty("website"),
        about:    form.text_or_empty("about"),
      },
    })
    .await;
  let session = state.assets.settle(published, result).await?;

  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub email:    String,
  #[serde(default)]
  pub password: String,
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> ApiResult<Json<Session>>
where
  S: MarketStore + 'static,
{
  let session = state.accounts.login(&body.email, &body.password).await?;
  Ok(Json(session))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET /company`
pub async fn get_company(OrganizationSession(organization): OrganizationSession) -> impl IntoResponse {
  Json(json!({ "organization": organization }))
}

/// `PUT /company`
pub async fn update_company<S>(
  State(state): State<AppState<S>>,
  OrganizationSession(organization): OrganizationSession,
  Json(profile): Json<OrganizationProfile>,
) -> ApiResult<impl IntoResponse>
where
  S: MarketStore + 'static,
{
  let updated = state
    .accounts
    .update_profile(organization.organization_id, profile)
    .await?;
  Ok(Json(json!({ "organization": updated })))
}
