//! Application submission and status transitions.
//!
//! Uniqueness of `(opening, individual)` is owned by the store's constraint.
//! The read before insert only produces a cheaper `Conflict` in the common
//! case; two racing submissions are still arbitrated by the insert.

use std::{str::FromStr, sync::Arc};

use jobgate_core::{
  Error, Result,
  gate::AuthorizationGate,
  market::{Application, ApplicationStatus, NewApplication},
  principal::OrganizationPrincipal,
  store::{MarketStore, StoreFault},
};
use tracing::{debug, info};
use uuid::Uuid;

/// Optional inputs to [`ApplicationLedger::apply`].
#[derive(Debug, Clone, Default)]
pub struct ApplyPayload {
  /// Published résumé URL supplied with this submission.
  pub resume:       Option<String>,
  pub cover_letter: Option<String>,
}

pub struct ApplicationLedger<S> {
  store: Arc<S>,
  gate:  AuthorizationGate,
}

impl<S: MarketStore> ApplicationLedger<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, gate: AuthorizationGate } }

  /// Submit a `pending` application for `individual_id` against a visible
  /// opening.
  ///
  /// The résumé is the one supplied in `payload`, else the one on file.
  pub async fn apply(
    &self,
    opening_id: Uuid,
    individual_id: &str,
    payload: ApplyPayload,
  ) -> Result<Application> {
    let opening = self
      .store
      .get_opening(opening_id)
      .await
      .map_err(Error::store)?
      .filter(|o| o.visible)
      .ok_or_else(|| Error::NotFound(format!("opening {opening_id}")))?;

    let individual = self
      .store
      .get_individual(individual_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("individual {individual_id}")))?;

    let resume = non_blank(payload.resume)
      .or_else(|| non_blank(individual.resume.clone()))
      .ok_or_else(|| Error::ValidationFailed("a résumé is required to apply".into()))?;

    if self
      .store
      .find_application(opening_id, individual_id)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(already_applied());
    }

    let input = NewApplication {
      opening_id,
      organization_id: opening.organization_id,
      individual_id: individual.individual_id,
      applicant_name: individual.name,
      applicant_email: individual.email.address().to_owned(),
      resume,
      cover_letter: payload.cover_letter.unwrap_or_default(),
    };

    match self.store.insert_application(input).await {
      Ok(application) => {
        info!(
          application_id = %application.application_id,
          opening_id = %opening_id,
          individual_id,
          "application submitted"
        );
        Ok(application)
      }
      Err(e) if e.is_unique_violation() => {
        debug!(opening_id = %opening_id, individual_id, "concurrent duplicate application");
        Err(already_applied())
      }
      Err(e) => Err(Error::store(e)),
    }
  }

  /// Move an application to `new_status` on behalf of the organization that
  /// owns it. Setting the current status again returns the record unchanged.
  pub async fn set_status(
    &self,
    application_id: Uuid,
    organization: &OrganizationPrincipal,
    new_status: &str,
  ) -> Result<Application> {
    let status = ApplicationStatus::from_str(new_status.trim())
      .map_err(|_| Error::ValidationFailed(format!("unknown status {new_status:?}")))?;

    let application = self
      .store
      .get_application(application_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("application {application_id}")))?;

    self
      .gate
      .authorize_organization_resource(organization, application.organization_id)?;

    if application.status == status {
      return Ok(application);
    }

    let updated = self
      .store
      .set_application_status(application_id, status)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("application {application_id}")))?;
    info!(application_id = %application_id, status = %status, "application status changed");
    Ok(updated)
  }
}

fn already_applied() -> Error { Error::Conflict("already applied to this opening".into()) }

fn non_blank(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}
