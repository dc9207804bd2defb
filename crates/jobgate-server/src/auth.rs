//! Request extractors for the two credential schemes.
//!
//! Organizations send the session token issued at login in a `token`
//! header. Individuals send the provider's assertion as
//! `Authorization: Bearer <jwt>`; a verified assertion is reconciled into a
//! local record before the handler runs.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use jobgate_core::{
  Error,
  principal::{IndividualPrincipal, OrganizationPrincipal},
  store::MarketStore,
};

use crate::{AppState, error::ApiError};

pub const ORGANIZATION_TOKEN_HEADER: &str = "token";

/// An authenticated organization, re-resolved from storage on every request.
pub struct OrganizationSession(pub OrganizationPrincipal);

/// An authenticated individual with a durable local record.
pub struct IndividualSession(pub IndividualPrincipal);

fn organization_token(headers: &HeaderMap) -> Result<&str, Error> {
  headers
    .get(ORGANIZATION_TOKEN_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(Error::Invalid)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Invalid)?;
  let (scheme, token) = value.trim().split_once(' ').ok_or(Error::Invalid)?;
  if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
    return Err(Error::Invalid);
  }
  Ok(token.trim())
}

impl<S> FromRequestParts<AppState<S>> for OrganizationSession
where
  S: MarketStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState<S>) -> Result<Self, Self::Rejection> {
    let token = organization_token(&parts.headers)?;
    let organization = state.accounts.authenticate(token).await?;
    Ok(Self(organization))
  }
}

impl<S> FromRequestParts<AppState<S>> for IndividualSession
where
  S: MarketStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState<S>) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    let claims = state.external.verify(token)?;
    let individual = state.reconciler.reconcile(&claims).await?;
    Ok(Self(individual))
  }
}
