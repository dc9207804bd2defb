//! Live profile lookups against the identity provider's backend API.
//!
//! Lookups are a soft dependency: the reconciler bounds every call with a
//! timeout and falls back to placeholder data on any failure.

use std::{future::Future, sync::Arc, time::Duration};

use jobgate_core::claims::{ExternalProfile, normalize_email};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("provider returned {0}")]
  Status(StatusCode),

  #[error("invalid provider url: {0}")]
  Url(String),
}

/// A source of provider-side profile data for a subject id.
pub trait ProfileSource: Send + Sync {
  /// Fetch the profile for `subject`. `Ok(None)` means the provider has no
  /// such user.
  fn fetch<'a>(
    &'a self,
    subject: &'a str,
  ) -> impl Future<Output = Result<Option<ExternalProfile>, ProfileError>> + Send + 'a;

  /// `false` when lookups are disabled; callers skip them entirely.
  fn is_configured(&self) -> bool { true }
}

/// Lookups disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfileSource;

impl ProfileSource for NoProfileSource {
  async fn fetch(&self, _subject: &str) -> Result<Option<ExternalProfile>, ProfileError> { Ok(None) }

  fn is_configured(&self) -> bool { false }
}

impl<P: ProfileSource> ProfileSource for Option<P> {
  async fn fetch(&self, subject: &str) -> Result<Option<ExternalProfile>, ProfileError> {
    match self {
      Some(source) => source.fetch(subject).await,
      None => Ok(None),
    }
  }

  fn is_configured(&self) -> bool { self.as_ref().is_some_and(P::is_configured) }
}

impl<P: ProfileSource> ProfileSource for Arc<P> {
  async fn fetch(&self, subject: &str) -> Result<Option<ExternalProfile>, ProfileError> {
    P::fetch(self, subject).await
  }

  fn is_configured(&self) -> bool { P::is_configured(self) }
}

// ─── Provider user shape ─────────────────────────────────────────────────────

/// A user object as returned by the provider's backend API and embedded in
/// its webhook events.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
  pub id:                       String,
  #[serde(default)]
  pub email_addresses:          Vec<ProviderEmail>,
  pub primary_email_address_id: Option<String>,
  pub first_name:               Option<String>,
  pub last_name:                Option<String>,
  pub image_url:                Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEmail {
  pub id:            Option<String>,
  pub email_address: String,
}

impl ProviderUser {
  /// The primary address if flagged, otherwise the first listed.
  pub fn primary_email(&self) -> Option<String> {
    let primary = self.primary_email_address_id.as_deref().and_then(|pid| {
      self
        .email_addresses
        .iter()
        .find(|e| e.id.as_deref() == Some(pid))
    });
    primary
      .or_else(|| self.email_addresses.first())
      .and_then(|e| normalize_email(Some(&e.email_address)))
  }

  pub fn to_profile(&self) -> ExternalProfile {
    let name = [self.first_name.as_deref(), self.last_name.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ");

    ExternalProfile {
      email:  self.primary_email(),
      name:   (!name.is_empty()).then_some(name),
      avatar: self.image_url.clone().filter(|u| !u.trim().is_empty()),
    }
  }
}

// ─── HTTP client ─────────────────────────────────────────────────────────────

/// Fetches users from `GET {api_base_url}/users/{id}` with a bearer secret.
///
/// Cloning shares the inner [`reqwest::Client`] connection pool.
#[derive(Clone)]
pub struct HttpProfileSource {
  client:     Client,
  base_url:   Url,
  secret_key: String,
}

impl HttpProfileSource {
  pub fn new(api_base_url: &str, secret_key: String, timeout: Duration) -> Result<Self, ProfileError> {
    let base_url = Url::parse(api_base_url).map_err(|e| ProfileError::Url(e.to_string()))?;
    if base_url.cannot_be_a_base() {
      return Err(ProfileError::Url(api_base_url.to_owned()));
    }
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url, secret_key })
  }

  fn user_url(&self, subject: &str) -> Result<Url, ProfileError> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| ProfileError::Url(self.base_url.to_string()))?
      .pop_if_empty()
      .push("users")
      .push(subject);
    Ok(url)
  }
}

impl ProfileSource for HttpProfileSource {
  async fn fetch(&self, subject: &str) -> Result<Option<ExternalProfile>, ProfileError> {
    let resp = self
      .client
      .get(self.user_url(subject)?)
      .bearer_auth(&self.secret_key)
      .send()
      .await?;

    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      s if s.is_success() => {
        let user: ProviderUser = resp.json().await?;
        Ok(Some(user.to_profile()))
      }
      s => Err(ProfileError::Status(s)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(value: serde_json::Value) -> ProviderUser { serde_json::from_value(value).unwrap() }

  #[test]
  fn primary_email_is_preferred() {
    let u = user(serde_json::json!({
      "id": "usr_1",
      "primary_email_address_id": "em_2",
      "email_addresses": [
        { "id": "em_1", "email_address": "old@example.com" },
        { "id": "em_2", "email_address": "Primary@Example.com" },
      ],
      "first_name": "Ada", "last_name": "Lovelace", "image_url": "https://img/ada",
    }));
    let profile = u.to_profile();
    assert_eq!(profile.email.as_deref(), Some("primary@example.com"));
    assert_eq!(profile.name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(profile.avatar.as_deref(), Some("https://img/ada"));
  }

  #[test]
  fn falls_back_to_first_email_and_tolerates_gaps() {
    let u = user(serde_json::json!({
      "id": "usr_1",
      "email_addresses": [{ "email_address": "first@example.com" }],
      "first_name": null, "last_name": " ", "image_url": "",
    }));
    let profile = u.to_profile();
    assert_eq!(profile.email.as_deref(), Some("first@example.com"));
    assert_eq!(profile.name, None);
    assert_eq!(profile.avatar, None);
  }

  #[test]
  fn user_url_escapes_subject() {
    let source = HttpProfileSource::new(
      "https://api.idp.example/v1/",
      "sk_test".into(),
      Duration::from_secs(1),
    )
    .unwrap();
    let url = source.user_url("usr/../x").unwrap();
    assert_eq!(url.as_str(), "https://api.idp.example/v1/users/usr%2F..%2Fx");
  }

  #[tokio::test]
  async fn disabled_sources_return_nothing() {
    assert!(!NoProfileSource.is_configured());
    assert_eq!(NoProfileSource.fetch("usr_1").await.unwrap(), None);
    let none: Option<NoProfileSource> = None;
    assert!(!none.is_configured());
  }
}
