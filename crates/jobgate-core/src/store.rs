//! The `MarketStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `jobgate-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.
//!
//! Uniqueness invariants (organization email, individual id, one application
//! per opening and individual) are the backend's responsibility and must be
//! enforced atomically; a violation is reported through
//! [`StoreFault::is_unique_violation`], never pre-empted by a read.

use std::future::Future;

use uuid::Uuid;

use crate::{
  market::{Application, ApplicationStatus, NewApplication, NewOpening, Opening},
  principal::{
    IndividualPrincipal, NewIndividual, NewOrganization, OrganizationCredentials,
    OrganizationPrincipal, OrganizationProfile,
  },
};

/// Classification a backend error must expose to generic callers.
pub trait StoreFault: std::error::Error + Send + Sync + 'static {
  /// `true` when the write was rejected by a uniqueness constraint.
  fn is_unique_violation(&self) -> bool;
}

/// Abstraction over a jobgate storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MarketStore: Send + Sync {
  type Error: StoreFault;

  // ── Organizations ─────────────────────────────────────────────────────

  /// Persist a new organization. Fails with a unique violation if the email
  /// is already registered (case-insensitively).
  fn create_organization(
    &self,
    input: NewOrganization,
  ) -> impl Future<Output = Result<OrganizationPrincipal, Self::Error>> + Send + '_;

  fn get_organization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<OrganizationPrincipal>, Self::Error>> + Send + '_;

  /// Look up an organization and its password hash by email.
  fn get_organization_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<OrganizationCredentials>, Self::Error>> + Send + 'a;

  /// Replace the free-text profile. Returns `None` if the organization is gone.
  fn update_organization_profile(
    &self,
    id: Uuid,
    profile: OrganizationProfile,
  ) -> impl Future<Output = Result<Option<OrganizationPrincipal>, Self::Error>> + Send + '_;

  // ── Individuals ───────────────────────────────────────────────────────

  fn get_individual<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<IndividualPrincipal>, Self::Error>> + Send + 'a;

  /// Create an individual. Fails with a unique violation if the id exists.
  fn insert_individual(
    &self,
    input: NewIndividual,
  ) -> impl Future<Output = Result<IndividualPrincipal, Self::Error>> + Send + '_;

  /// Create or refresh an individual from provider data.
  ///
  /// On an existing record, a resolved email overwrites whatever is stored but
  /// a placeholder never overwrites a resolved one; the résumé is untouched.
  fn upsert_individual(
    &self,
    input: NewIndividual,
  ) -> impl Future<Output = Result<IndividualPrincipal, Self::Error>> + Send + '_;

  /// Replace a placeholder email with `email`. A record whose email is
  /// already resolved is left as-is. Returns the current record, or `None`
  /// if it does not exist.
  fn heal_individual_email<'a>(
    &'a self,
    id: &'a str,
    email: String,
  ) -> impl Future<Output = Result<Option<IndividualPrincipal>, Self::Error>> + Send + 'a;

  fn set_individual_resume<'a>(
    &'a self,
    id: &'a str,
    resume: String,
  ) -> impl Future<Output = Result<Option<IndividualPrincipal>, Self::Error>> + Send + 'a;

  /// Returns `true` if a record was removed.
  fn delete_individual<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Openings ──────────────────────────────────────────────────────────

  fn create_opening(
    &self,
    organization_id: Uuid,
    input: NewOpening,
  ) -> impl Future<Output = Result<Opening, Self::Error>> + Send + '_;

  fn get_opening(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Opening>, Self::Error>> + Send + '_;

  fn set_opening_visibility(
    &self,
    id: Uuid,
    visible: bool,
  ) -> impl Future<Output = Result<Option<Opening>, Self::Error>> + Send + '_;

  /// Remove an opening and every application against it.
  fn delete_opening(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  /// Insert a `pending` application. Fails with a unique violation if one
  /// already exists for the `(opening_id, individual_id)` pair.
  fn insert_application(
    &self,
    input: NewApplication,
  ) -> impl Future<Output = Result<Application, Self::Error>> + Send + '_;

  fn get_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  fn find_application<'a>(
    &'a self,
    opening_id: Uuid,
    individual_id: &'a str,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + 'a;

  fn set_application_status(
    &self,
    id: Uuid,
    status: ApplicationStatus,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;
}
