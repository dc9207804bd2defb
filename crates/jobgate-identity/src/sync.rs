//! Applying provider push events to the local store.
//!
//! Events may arrive before, after, or interleaved with lazy reconciliation
//! of the same subject. Both paths write through the individuals primary key,
//! so whichever lands second updates rather than duplicates.

use std::sync::Arc;

use jobgate_core::{
  Error, Result,
  claims::{IdentityDefaults, resolve_new_individual},
  principal::IndividualPrincipal,
  store::MarketStore,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::profile::ProviderUser;

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawEvent {
  #[serde(rename = "type")]
  kind: String,
  #[serde(default)]
  data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DeletedData {
  id: String,
}

/// A parsed provider event.
#[derive(Debug, Clone)]
pub enum PrincipalEvent {
  /// `user.created` or `user.updated`.
  Upsert(ProviderUser),
  /// `user.deleted`.
  Deleted { subject: String },
  /// Any other event type; acknowledged and dropped.
  Ignored(String),
}

impl PrincipalEvent {
  /// Parse an event body. Malformed payloads for recognized types are
  /// [`Error::ValidationFailed`].
  pub fn parse(body: &[u8]) -> Result<Self> {
    let raw: RawEvent = serde_json::from_slice(body)
      .map_err(|e| Error::ValidationFailed(format!("event body: {e}")))?;

    let action = raw
      .kind
      .strip_prefix("user.")
      .or_else(|| raw.kind.strip_prefix("principal."));

    match action {
      Some("created" | "updated") => {
        let mut user: ProviderUser = serde_json::from_value(raw.data)
          .map_err(|e| Error::ValidationFailed(format!("{} payload: {e}", raw.kind)))?;
        user.id = subject(&raw.kind, &user.id)?;
        Ok(Self::Upsert(user))
      }
      Some("deleted") => {
        let data: DeletedData = serde_json::from_value(raw.data)
          .map_err(|e| Error::ValidationFailed(format!("{} payload: {e}", raw.kind)))?;
        Ok(Self::Deleted { subject: subject(&raw.kind, &data.id)? })
      }
      _ => Ok(Self::Ignored(raw.kind)),
    }
  }
}

/// Subject ids are keyed exactly as bearer claims key them: trimmed.
fn subject(kind: &str, id: &str) -> Result<String> {
  let id = id.trim();
  if id.is_empty() {
    return Err(Error::ValidationFailed(format!("{kind} without subject id")));
  }
  Ok(id.to_owned())
}

/// What [`PrincipalSync::apply`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
  Upserted(IndividualPrincipal),
  Deleted { subject: String, existed: bool },
  Ignored(String),
}

// ─── Sync ────────────────────────────────────────────────────────────────────

pub struct PrincipalSync<S> {
  store:    Arc<S>,
  defaults: IdentityDefaults,
}

impl<S: MarketStore> PrincipalSync<S> {
  pub fn new(store: Arc<S>, defaults: IdentityDefaults) -> Self { Self { store, defaults } }

  /// Apply `event` idempotently. Replaying the same event leaves the store in
  /// the same state.
  pub async fn apply(&self, event: PrincipalEvent) -> Result<SyncOutcome> {
    match event {
      PrincipalEvent::Upsert(user) => {
        let candidate = resolve_new_individual(&user.id, &user.to_profile(), &self.defaults);
        let individual = self
          .store
          .upsert_individual(candidate)
          .await
          .map_err(Error::store)?;
        info!(individual_id = %individual.individual_id, "synced individual from provider");
        Ok(SyncOutcome::Upserted(individual))
      }
      PrincipalEvent::Deleted { subject } => {
        let existed = self.store.delete_individual(&subject).await.map_err(Error::store)?;
        info!(individual_id = %subject, existed, "deleted individual on provider request");
        Ok(SyncOutcome::Deleted { subject, existed })
      }
      PrincipalEvent::Ignored(kind) => {
        debug!(event_type = %kind, "ignoring provider event");
        Ok(SyncOutcome::Ignored(kind))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use jobgate_core::{claims::Claims, principal::IndividualEmail};

  use super::*;
  use crate::{profile::NoProfileSource, reconcile::IdentityReconciler, testutil};

  fn created(id: &str, email: Option<&str>) -> Vec<u8> {
    let addresses = email
      .map(|e| serde_json::json!([{ "id": "em_1", "email_address": e }]))
      .unwrap_or_else(|| serde_json::json!([]));
    serde_json::to_vec(&serde_json::json!({
      "type": "user.created",
      "object": "event",
      "data": {
        "id": id,
        "email_addresses": addresses,
        "primary_email_address_id": "em_1",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "image_url": "https://img.test/ada.png",
      },
    }))
    .unwrap()
  }

  #[test]
  fn parses_aliases_and_unknown_types() {
    let upsert = br#"{"type":"principal.updated","data":{"id":"usr_1"}}"#;
    assert!(matches!(PrincipalEvent::parse(upsert).unwrap(), PrincipalEvent::Upsert(u) if u.id == "usr_1"));

    let deleted = br#"{"type":"user.deleted","data":{"id":"usr_1","deleted":true}}"#;
    assert!(matches!(
      PrincipalEvent::parse(deleted).unwrap(),
      PrincipalEvent::Deleted { subject } if subject == "usr_1"
    ));

    let session = br#"{"type":"session.created","data":{}}"#;
    assert!(matches!(PrincipalEvent::parse(session).unwrap(), PrincipalEvent::Ignored(k) if k == "session.created"));
  }

  #[test]
  fn malformed_events_fail_validation() {
    let bodies: [&[u8]; 4] = [
      b"not json",
      br#"{"type":"user.created","data":{}}"#,
      br#"{"type":"user.created","data":{"id":" "}}"#,
      br#"{"type":"user.deleted","data":{"id":""}}"#,
    ];
    for body in bodies {
      assert!(matches!(PrincipalEvent::parse(body), Err(Error::ValidationFailed(_))));
    }
  }

  #[tokio::test]
  async fn replayed_create_is_idempotent() {
    let store = testutil::store().await;
    let sync = PrincipalSync::new(store.clone(), IdentityDefaults::default());
    let body = created("usr_1", Some("ada@example.com"));

    let first = sync.apply(PrincipalEvent::parse(&body).unwrap()).await.unwrap();
    let second = sync.apply(PrincipalEvent::parse(&body).unwrap()).await.unwrap();

    let (SyncOutcome::Upserted(a), SyncOutcome::Upserted(b)) = (first, second) else {
      panic!("expected upserts");
    };
    assert_eq!(a.individual_id, b.individual_id);
    assert_eq!(b.email, IndividualEmail::Resolved("ada@example.com".into()));
    assert_eq!(b.name, "Ada Lovelace");
    assert_eq!(a.created_at, b.created_at);
  }

  #[tokio::test]
  async fn event_heals_lazily_created_placeholder() {
    let store = testutil::store().await;
    let reconciler = IdentityReconciler::new(store.clone(), NoProfileSource, IdentityDefaults::default());
    let lazy = reconciler.reconcile(&Claims::new("usr_2")).await.unwrap();
    assert!(lazy.email.is_placeholder());
    store.set_individual_resume("usr_2", "https://cdn.test/cv.pdf".into()).await.unwrap();

    let sync = PrincipalSync::new(store.clone(), IdentityDefaults::default());
    let event = PrincipalEvent::parse(&created("usr_2", Some("real@example.com"))).unwrap();
    let SyncOutcome::Upserted(synced) = sync.apply(event).await.unwrap() else {
      panic!("expected upsert");
    };

    assert_eq!(synced.email, IndividualEmail::Resolved("real@example.com".into()));
    assert_eq!(synced.resume.as_deref(), Some("https://cdn.test/cv.pdf"));
    assert_eq!(synced.created_at, lazy.created_at);
  }

  #[tokio::test]
  async fn padded_subject_keys_the_same_record_as_bearer_claims() {
    let store = testutil::store().await;
    let reconciler = IdentityReconciler::new(store.clone(), NoProfileSource, IdentityDefaults::default());
    let lazy = reconciler.reconcile(&Claims::new("usr_3")).await.unwrap();

    let sync = PrincipalSync::new(store.clone(), IdentityDefaults::default());
    let event = PrincipalEvent::parse(&created("  usr_3\n", Some("ada@example.com"))).unwrap();
    let SyncOutcome::Upserted(synced) = sync.apply(event).await.unwrap() else {
      panic!("expected upsert");
    };
    assert_eq!(synced.individual_id, "usr_3");
    assert_eq!(synced.created_at, lazy.created_at);

    let deleted = br#"{"type":"user.deleted","data":{"id":" usr_3 "}}"#;
    let outcome = sync.apply(PrincipalEvent::parse(deleted).unwrap()).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Deleted { subject: "usr_3".into(), existed: true });
    assert!(store.get_individual("usr_3").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn emailless_event_keeps_resolved_email() {
    let store = testutil::store().await;
    let sync = PrincipalSync::new(store.clone(), IdentityDefaults::default());
    sync.apply(PrincipalEvent::parse(&created("usr_3", Some("kept@example.com"))).unwrap()).await.unwrap();

    let SyncOutcome::Upserted(after) = sync
      .apply(PrincipalEvent::parse(&created("usr_3", None)).unwrap())
      .await
      .unwrap()
    else {
      panic!("expected upsert");
    };
    assert_eq!(after.email, IndividualEmail::Resolved("kept@example.com".into()));
  }

  #[tokio::test]
  async fn delete_removes_and_is_repeatable() {
    let store = testutil::store().await;
    let sync = PrincipalSync::new(store.clone(), IdentityDefaults::default());
    sync.apply(PrincipalEvent::parse(&created("usr_4", None)).unwrap()).await.unwrap();

    let gone = PrincipalEvent::Deleted { subject: "usr_4".into() };
    assert_eq!(
      sync.apply(gone.clone()).await.unwrap(),
      SyncOutcome::Deleted { subject: "usr_4".into(), existed: true }
    );
    assert_eq!(
      sync.apply(gone).await.unwrap(),
      SyncOutcome::Deleted { subject: "usr_4".into(), existed: false }
    );
    assert!(store.get_individual("usr_4").await.unwrap().is_none());
  }
}
