//! Shared state threaded through all axum handlers.
//!
//! Every client handle is constructed once here, at startup, and passed down
//! explicitly.

use std::sync::Arc;

use jobgate_core::{Error, Result, store::MarketStore};
use jobgate_identity::{
  CredentialIssuer, ExternalTokenVerifier, HttpProfileSource, IdentityReconciler,
  OrganizationAccounts, PrincipalSync, WebhookVerifier,
};
use jobgate_market::{ApplicationLedger, OpeningBoard, ResumeBook};

use crate::{config::ServerConfig, upload::LocalAssetStore};

pub type Reconciler<S> = IdentityReconciler<S, Option<HttpProfileSource>>;

pub struct AppState<S> {
  pub store:      Arc<S>,
  pub accounts:   OrganizationAccounts<S>,
  pub external:   Arc<ExternalTokenVerifier>,
  pub reconciler: Arc<Reconciler<S>>,
  pub sync:       Arc<PrincipalSync<S>>,
  /// `None` when no webhook secret is configured.
  pub webhooks:   Option<Arc<WebhookVerifier>>,
  pub ledger:     Arc<ApplicationLedger<S>>,
  pub openings:   Arc<OpeningBoard<S>>,
  pub resumes:    Arc<ResumeBook<S>>,
  pub assets:     Arc<LocalAssetStore>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      accounts:   self.accounts.clone(),
      external:   Arc::clone(&self.external),
      reconciler: Arc::clone(&self.reconciler),
      sync:       Arc::clone(&self.sync),
      webhooks:   self.webhooks.clone(),
      ledger:     Arc::clone(&self.ledger),
      openings:   Arc::clone(&self.openings),
      resumes:    Arc::clone(&self.resumes),
      assets:     Arc::clone(&self.assets),
    }
  }
}

impl<S: MarketStore> AppState<S> {
  /// Wire every component from `config`. Fails only on problems that make
  /// the server unusable as a whole, e.g. an empty token secret.
  pub fn build(store: Arc<S>, config: &ServerConfig) -> Result<Self> {
    let issuer = CredentialIssuer::new(config.token_secret.as_bytes(), config.token_ttl())?;
    let defaults = config.identity_defaults();
    let external = &config.external;

    let external_verifier = ExternalTokenVerifier::from_config(&external.key_config());
    if !external_verifier.is_configured() {
      tracing::warn!("no provider verification key configured; individual requests will fail");
    }

    let profiles = match (&external.api_base_url, &external.api_secret_key) {
      (Some(base), Some(key)) if !base.trim().is_empty() && !key.trim().is_empty() => {
        let source = HttpProfileSource::new(base.trim(), key.trim().to_owned(), external.lookup_timeout())
          .map_err(|e| Error::Misconfigured(format!("provider api: {e}")))?;
        Some(source)
      }
      _ => {
        tracing::info!("provider profile lookups disabled");
        None
      }
    };

    let webhooks = match external.webhook_secret.as_deref().map(str::trim) {
      Some(secret) if !secret.is_empty() => Some(Arc::new(WebhookVerifier::new(secret)?)),
      _ => None,
    };

    let reconciler = IdentityReconciler::new(store.clone(), profiles, defaults.clone())
      .with_lookup_timeout(external.lookup_timeout());

    Ok(Self {
      accounts:   OrganizationAccounts::new(store.clone(), Arc::new(issuer)),
      external:   Arc::new(external_verifier),
      reconciler: Arc::new(reconciler),
      sync:       Arc::new(PrincipalSync::new(store.clone(), defaults)),
      webhooks,
      ledger:     Arc::new(ApplicationLedger::new(store.clone())),
      openings:   Arc::new(OpeningBoard::new(store.clone())),
      resumes:    Arc::new(ResumeBook::new(store.clone())),
      assets:     Arc::new(LocalAssetStore::new(&config.upload_dir, &config.public_base_url)),
      store,
    })
  }
}
