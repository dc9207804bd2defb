//! Shared fixtures for this crate's unit tests.

use std::{
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use jobgate_core::{
  claims::ExternalProfile,
  market::{Application, ApplicationStatus, NewApplication, NewOpening, Opening},
  principal::{
    IndividualPrincipal, NewIndividual, NewOrganization, OrganizationCredentials,
    OrganizationPrincipal, OrganizationProfile,
  },
  store::MarketStore,
};
use jobgate_store_sqlite::SqliteStore;
use reqwest::StatusCode;
use uuid::Uuid;

use crate::profile::{ProfileError, ProfileSource};

pub async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

// ─── Profile sources ─────────────────────────────────────────────────────────

/// Always answers with the same profile and counts calls.
#[derive(Default)]
pub struct StaticProfiles {
  pub profile: Option<ExternalProfile>,
  pub calls:   AtomicUsize,
}

impl StaticProfiles {
  pub fn with_email(email: &str) -> Self {
    Self {
      profile: Some(ExternalProfile { email: Some(email.into()), ..Default::default() }),
      calls:   AtomicUsize::new(0),
    }
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl ProfileSource for StaticProfiles {
  async fn fetch(&self, _subject: &str) -> Result<Option<ExternalProfile>, ProfileError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.profile.clone())
  }
}

/// Never answers within any reasonable timeout.
pub struct SlowProfiles(pub Duration);

impl ProfileSource for SlowProfiles {
  async fn fetch(&self, _subject: &str) -> Result<Option<ExternalProfile>, ProfileError> {
    tokio::time::sleep(self.0).await;
    Ok(Some(ExternalProfile { email: Some("late@example.com".into()), ..Default::default() }))
  }
}

/// The provider is up but unhappy.
pub struct FailingProfiles;

impl ProfileSource for FailingProfiles {
  async fn fetch(&self, _subject: &str) -> Result<Option<ExternalProfile>, ProfileError> {
    Err(ProfileError::Status(StatusCode::BAD_GATEWAY))
  }
}

// ─── Store wrapper ───────────────────────────────────────────────────────────

/// Delegates to a real store but fails every email heal.
pub struct BrokenHealStore(pub SqliteStore);

type StoreResult<T> = Result<T, jobgate_store_sqlite::Error>;

impl MarketStore for BrokenHealStore {
  type Error = jobgate_store_sqlite::Error;

  async fn create_organization(&self, input: NewOrganization) -> StoreResult<OrganizationPrincipal> {
    self.0.create_organization(input).await
  }

  async fn get_organization(&self, id: Uuid) -> StoreResult<Option<OrganizationPrincipal>> {
    self.0.get_organization(id).await
  }

  async fn get_organization_credentials(
    &self,
    email: &str,
  ) -> StoreResult<Option<OrganizationCredentials>> {
    self.0.get_organization_credentials(email).await
  }

  async fn update_organization_profile(
    &self,
    id: Uuid,
    profile: OrganizationProfile,
  ) -> StoreResult<Option<OrganizationPrincipal>> {
    self.0.update_organization_profile(id, profile).await
  }

  async fn get_individual(&self, id: &str) -> StoreResult<Option<IndividualPrincipal>> {
    self.0.get_individual(id).await
  }

  async fn insert_individual(&self, input: NewIndividual) -> StoreResult<IndividualPrincipal> {
    self.0.insert_individual(input).await
  }

  async fn upsert_individual(&self, input: NewIndividual) -> StoreResult<IndividualPrincipal> {
    self.0.upsert_individual(input).await
  }

  async fn heal_individual_email(
    &self,
    _id: &str,
    _email: String,
  ) -> StoreResult<Option<IndividualPrincipal>> {
    Err(jobgate_store_sqlite::Error::DateParse("injected heal failure".into()))
  }

  async fn set_individual_resume(
    &self,
    id: &str,
    resume: String,
  ) -> StoreResult<Option<IndividualPrincipal>> {
    self.0.set_individual_resume(id, resume).await
  }

  async fn delete_individual(&self, id: &str) -> StoreResult<bool> {
    self.0.delete_individual(id).await
  }

  async fn create_opening(&self, organization_id: Uuid, input: NewOpening) -> StoreResult<Opening> {
    self.0.create_opening(organization_id, input).await
  }

  async fn get_opening(&self, id: Uuid) -> StoreResult<Option<Opening>> {
    self.0.get_opening(id).await
  }

  async fn set_opening_visibility(&self, id: Uuid, visible: bool) -> StoreResult<Option<Opening>> {
    self.0.set_opening_visibility(id, visible).await
  }

  async fn delete_opening(&self, id: Uuid) -> StoreResult<bool> { self.0.delete_opening(id).await }

  async fn insert_application(&self, input: NewApplication) -> StoreResult<Application> {
    self.0.insert_application(input).await
  }

  async fn get_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
    self.0.get_application(id).await
  }

  async fn find_application(
    &self,
    opening_id: Uuid,
    individual_id: &str,
  ) -> StoreResult<Option<Application>> {
    self.0.find_application(opening_id, individual_id).await
  }

  async fn set_application_status(
    &self,
    id: Uuid,
    status: ApplicationStatus,
  ) -> StoreResult<Option<Application>> {
    self.0.set_application_status(id, status).await
  }
}
