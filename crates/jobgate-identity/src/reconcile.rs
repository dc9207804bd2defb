//! Lazy creation and healing of individual records from verified claims.

use std::{sync::Arc, time::Duration};

use jobgate_core::{
  Error, Result,
  claims::{Claims, ExternalProfile, IdentityDefaults, resolve_new_individual},
  principal::IndividualPrincipal,
  store::{MarketStore, StoreFault},
};
use tracing::{debug, info, warn};

use crate::profile::ProfileSource;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Guarantees a durable local [`IndividualPrincipal`] for every verified
/// external subject, whether or not the provider's own creation event has
/// arrived yet.
pub struct IdentityReconciler<S, P> {
  store:          Arc<S>,
  profiles:       P,
  defaults:       IdentityDefaults,
  lookup_timeout: Duration,
}

impl<S: MarketStore, P: ProfileSource> IdentityReconciler<S, P> {
  pub fn new(store: Arc<S>, profiles: P, defaults: IdentityDefaults) -> Self {
    Self { store, profiles, defaults, lookup_timeout: DEFAULT_LOOKUP_TIMEOUT }
  }

  pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
    self.lookup_timeout = timeout;
    self
  }

  /// Return the local record for `claims.subject`, creating it if absent and
  /// replacing a placeholder email when a real one is available.
  ///
  /// Provider lookups and heal writes are best effort; only a failure to
  /// read or create the record itself is returned.
  pub async fn reconcile(&self, claims: &Claims) -> Result<IndividualPrincipal> {
    let subject = claims.subject.as_str();
    if subject.is_empty() {
      return Err(Error::Invalid);
    }

    if let Some(existing) = self.store.get_individual(subject).await.map_err(Error::store)? {
      if !existing.email.is_placeholder() {
        return Ok(existing);
      }
      let email = match &claims.email {
        Some(email) => Some(email.clone()),
        None => self.lookup(subject).await.and_then(|p| p.email),
      };
      return Ok(self.heal(existing, email).await);
    }

    let profile = self.resolve_profile(claims).await;
    let candidate = resolve_new_individual(subject, &profile, &self.defaults);

    match self.store.insert_individual(candidate).await {
      Ok(created) => {
        info!(
          individual_id = %created.individual_id,
          placeholder = created.email.is_placeholder(),
          "created individual"
        );
        Ok(created)
      }
      Err(e) if e.is_unique_violation() => {
        // Someone else (a webhook or a parallel request) created it first.
        debug!(individual_id = subject, "individual already exists, re-reading");
        let existing = self
          .store
          .get_individual(subject)
          .await
          .map_err(Error::store)?
          .ok_or_else(|| Error::NotFound(format!("individual {subject}")))?;
        Ok(self.heal(existing, profile.email).await)
      }
      Err(e) => Err(Error::store(e)),
    }
  }

  /// Claims first; a live lookup only fills the gaps when no email was
  /// asserted.
  async fn resolve_profile(&self, claims: &Claims) -> ExternalProfile {
    let asserted = claims.profile();
    if asserted.email.is_some() {
      return asserted;
    }
    match self.lookup(&claims.subject).await {
      Some(looked_up) => asserted.or(looked_up),
      None => asserted,
    }
  }

  async fn lookup(&self, subject: &str) -> Option<ExternalProfile> {
    if !self.profiles.is_configured() {
      return None;
    }
    match tokio::time::timeout(self.lookup_timeout, self.profiles.fetch(subject)).await {
      Ok(Ok(profile)) => profile,
      Ok(Err(e)) => {
        warn!(individual_id = subject, error = %e, "profile lookup failed");
        None
      }
      Err(_) => {
        warn!(
          individual_id = subject,
          timeout_ms = self.lookup_timeout.as_millis() as u64,
          "profile lookup timed out"
        );
        None
      }
    }
  }

  async fn heal(&self, existing: IndividualPrincipal, email: Option<String>) -> IndividualPrincipal {
    let Some(email) = email else { return existing };
    if !existing.email.is_placeholder() {
      return existing;
    }

    match self.store.heal_individual_email(&existing.individual_id, email).await {
      Ok(Some(healed)) => {
        info!(individual_id = %healed.individual_id, "healed placeholder email");
        healed
      }
      Ok(None) => existing,
      Err(e) => {
        warn!(individual_id = %existing.individual_id, error = %e, "failed to heal placeholder email");
        existing
      }
    }
  }
}
