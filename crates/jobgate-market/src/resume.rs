//! Individuals replacing the résumé on file.

use std::sync::Arc;

use jobgate_core::{
  Error, Result, gate::AuthorizationGate, principal::IndividualPrincipal, store::MarketStore,
};
use tracing::info;

pub struct ResumeBook<S> {
  store: Arc<S>,
  gate:  AuthorizationGate,
}

impl<S: MarketStore> ResumeBook<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, gate: AuthorizationGate } }

  /// Store `resume_url` on `target_id`'s record. Only the individual
  /// themselves may do this.
  pub async fn update(
    &self,
    principal: &IndividualPrincipal,
    target_id: &str,
    resume_url: String,
  ) -> Result<IndividualPrincipal> {
    self.gate.authorize_self(principal, target_id)?;

    let resume_url = resume_url.trim().to_owned();
    if resume_url.is_empty() {
      return Err(Error::ValidationFailed("résumé is required".into()));
    }

    let updated = self
      .store
      .set_individual_resume(target_id, resume_url)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("individual {target_id}")))?;
    info!(individual_id = target_id, "résumé updated");
    Ok(updated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::Fixture;

  #[tokio::test]
  async fn self_update_only() {
    let fx = Fixture::new().await;
    let book = ResumeBook::new(fx.store.clone());

    let updated = book
      .update(&fx.applicant, "usr_1", "https://cdn.test/new.pdf".into())
      .await
      .unwrap();
    assert_eq!(updated.resume.as_deref(), Some("https://cdn.test/new.pdf"));

    let denied = book
      .update(&fx.applicant, "usr_2", "https://cdn.test/x.pdf".into())
      .await;
    assert!(matches!(denied, Err(Error::Forbidden)));

    let blank = book.update(&fx.applicant, "usr_1", " ".into()).await;
    assert!(matches!(blank, Err(Error::ValidationFailed(_))));
  }
}
