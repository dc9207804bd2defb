//! Organization registration, login, and session resolution.

use std::sync::Arc;

use jobgate_core::{
  Error, Result,
  claims::normalize_email,
  principal::{NewOrganization, OrganizationPrincipal, OrganizationProfile},
  store::{MarketStore, StoreFault},
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  credential::CredentialIssuer,
  password::{hash_password, verify_against_dummy, verify_password},
};

/// Fields collected by the registration form. `logo` is an already-published
/// asset URL.
#[derive(Debug, Clone, Default)]
pub struct Registration {
  pub name:     String,
  pub email:    String,
  pub password: String,
  pub logo:     String,
  pub profile:  OrganizationProfile,
}

/// What registration and login hand back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
  pub organization: OrganizationPrincipal,
  pub token:        String,
}

pub struct OrganizationAccounts<S> {
  store:  Arc<S>,
  issuer: Arc<CredentialIssuer>,
}

impl<S> Clone for OrganizationAccounts<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), issuer: Arc::clone(&self.issuer) }
  }
}

impl<S: MarketStore> OrganizationAccounts<S> {
  pub fn new(store: Arc<S>, issuer: Arc<CredentialIssuer>) -> Self { Self { store, issuer } }

  pub async fn register(&self, form: Registration) -> Result<Session> {
    let name = required("name", &form.name)?;
    let password = required("password", &form.password)?;
    let logo = required("logo", &form.logo)?;
    let email = normalize_email(Some(&form.email))
      .ok_or_else(|| Error::ValidationFailed("a valid email is required".into()))?;

    let input = NewOrganization {
      name:          name.to_owned(),
      email,
      password_hash: hash_password(password)?,
      logo:          logo.to_owned(),
      profile:       form.profile,
    };

    let organization = match self.store.create_organization(input).await {
      Ok(org) => org,
      Err(e) if e.is_unique_violation() => {
        return Err(Error::Conflict("email is already registered".into()));
      }
      Err(e) => return Err(Error::store(e)),
    };
    info!(organization_id = %organization.organization_id, "registered organization");

    let token = self.issuer.issue(organization.organization_id)?;
    Ok(Session { organization, token })
  }

  /// Exchange email and password for a session. Every failure is
  /// [`Error::Invalid`], whether or not the account exists.
  pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
    let credentials = match normalize_email(Some(email)) {
      Some(email) => self
        .store
        .get_organization_credentials(&email)
        .await
        .map_err(Error::store)?,
      None => None,
    };

    let Some(credentials) = credentials else {
      verify_against_dummy(password);
      debug!("login for unknown email");
      return Err(Error::Invalid);
    };
    if !verify_password(password, &credentials.password_hash) {
      debug!(organization_id = %credentials.organization.organization_id, "login with wrong password");
      return Err(Error::Invalid);
    }

    let token = self.issuer.issue(credentials.organization.organization_id)?;
    Ok(Session { organization: credentials.organization, token })
  }

  /// Resolve the organization a session token belongs to. A valid token
  /// for an organization that no longer exists is [`Error::Invalid`].
  pub async fn authenticate(&self, token: &str) -> Result<OrganizationPrincipal> {
    let id = self.issuer.verify(token)?;
    self
      .store
      .get_organization(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::Invalid)
  }

  pub async fn update_profile(
    &self,
    organization_id: Uuid,
    profile: OrganizationProfile,
  ) -> Result<OrganizationPrincipal> {
    self
      .store
      .update_organization_profile(organization_id, profile)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("organization {organization_id}")))
  }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
  let value = value.trim();
  if value.is_empty() {
    return Err(Error::ValidationFailed(format!("{field} is required")));
  }
  Ok(value)
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use jobgate_store_sqlite::SqliteStore;

  use super::*;
  use crate::testutil;

  async fn accounts() -> OrganizationAccounts<SqliteStore> {
    let issuer = CredentialIssuer::new(b"0123456789abcdef0123456789abcdef", Duration::from_secs(3600)).unwrap();
    OrganizationAccounts::new(testutil::store().await, Arc::new(issuer))
  }

  fn form(email: &str) -> Registration {
    Registration {
      name:     "Acme".into(),
      email:    email.into(),
      password: "hunter22".into(),
      logo:     "https://cdn.test/acme.png".into(),
      profile:  OrganizationProfile { location: "Berlin".into(), ..Default::default() },
    }
  }

  #[tokio::test]
  async fn register_then_login_binds_same_organization() {
    let accounts = accounts().await;
    let registered = accounts.register(form("Hello@Acme.test")).await.unwrap();
    assert_eq!(registered.organization.email, "hello@acme.test");

    let session = accounts.login("hello@ACME.test", "hunter22").await.unwrap();
    assert_eq!(session.organization.organization_id, registered.organization.organization_id);

    let resolved = accounts.authenticate(&session.token).await.unwrap();
    assert_eq!(resolved.organization_id, registered.organization.organization_id);
    assert_eq!(resolved.profile.location, "Berlin");
  }

  #[tokio::test]
  async fn duplicate_email_conflicts() {
    let accounts = accounts().await;
    accounts.register(form("dup@acme.test")).await.unwrap();
    let err = accounts.register(form("DUP@acme.test")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
  }

  #[tokio::test]
  async fn missing_fields_fail_validation() {
    let accounts = accounts().await;
    let cases = [
      Registration { name: " ".into(), ..form("a@acme.test") },
      Registration { password: String::new(), ..form("a@acme.test") },
      Registration { logo: String::new(), ..form("a@acme.test") },
      form("not-an-email"),
    ];
    for case in cases {
      assert!(matches!(accounts.register(case).await, Err(Error::ValidationFailed(_))));
    }
  }

  #[tokio::test]
  async fn login_failures_are_uniform() {
    let accounts = accounts().await;
    accounts.register(form("real@acme.test")).await.unwrap();

    let wrong_password = accounts.login("real@acme.test", "nope").await.unwrap_err();
    let unknown = accounts.login("ghost@acme.test", "hunter22").await.unwrap_err();
    let garbage = accounts.login("", "").await.unwrap_err();

    for err in [wrong_password, unknown, garbage] {
      assert!(matches!(err, Error::Invalid));
    }
  }

  #[tokio::test]
  async fn token_for_missing_organization_is_invalid() {
    let accounts = accounts().await;
    let token = accounts.issuer.issue(Uuid::new_v4()).unwrap();
    assert!(matches!(accounts.authenticate(&token).await, Err(Error::Invalid)));
    assert!(matches!(accounts.authenticate("garbage").await, Err(Error::Invalid)));
  }

  #[tokio::test]
  async fn profile_update_round_trips() {
    let accounts = accounts().await;
    let session = accounts.register(form("p@acme.test")).await.unwrap();
    let profile = OrganizationProfile {
      location: "Lisbon".into(),
      website:  "https://acme.test".into(),
      about:    "Anvils".into(),
    };
    let updated = accounts
      .update_profile(session.organization.organization_id, profile.clone())
      .await
      .unwrap();
    assert_eq!(updated.profile, profile);

    let missing = accounts.update_profile(Uuid::new_v4(), profile).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
  }
}
