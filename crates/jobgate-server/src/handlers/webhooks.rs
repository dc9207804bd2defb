//! `POST /webhooks`: provider push events.
//!
//! Signature failures answer 400 so the provider's delivery log shows them
//! as rejected rather than as an auth problem on our side. Unknown event
//! types are acknowledged.

use axum::{
  Json,
  extract::State,
  http::HeaderMap,
  response::IntoResponse,
};
use bytes::Bytes;
use jobgate_core::{Error, store::MarketStore};
use jobgate_identity::{PrincipalEvent, SyncOutcome};
use serde_json::json;

use crate::{
  AppState,
  error::{ApiError, ApiResult},
};

const ID_HEADER: &str = "svix-id";
const TIMESTAMP_HEADER: &str = "svix-timestamp";
const SIGNATURE_HEADER: &str = "svix-signature";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> ApiResult<&'a str> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::bad_request(format!("missing {name} header")))
}

pub async fn receive<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> ApiResult<impl IntoResponse>
where
  S: MarketStore + 'static,
{
  let verifier = state
    .webhooks
    .as_ref()
    .ok_or_else(|| Error::Misconfigured("no webhook secret configured".into()))?;

  let id = header(&headers, ID_HEADER)?;
  let timestamp = header(&headers, TIMESTAMP_HEADER)?;
  let signature = header(&headers, SIGNATURE_HEADER)?;
  verifier
    .verify(id, timestamp, signature, &body)
    .map_err(|_| ApiError::bad_request("invalid webhook signature"))?;

  let event = PrincipalEvent::parse(&body)?;
  let outcome = match state.sync.apply(event).await? {
    SyncOutcome::Upserted(_) => "upserted",
    SyncOutcome::Deleted { .. } => "deleted",
    SyncOutcome::Ignored(kind) => {
      tracing::debug!(webhook_id = id, event_type = %kind, "webhook ignored");
      "ignored"
    }
  };
  Ok(Json(json!({ "received": true, "outcome": outcome })))
}
