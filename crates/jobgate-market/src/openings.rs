//! Creating, hiding, and removing openings.

use std::sync::Arc;

use jobgate_core::{
  Error, Result,
  gate::AuthorizationGate,
  market::{NewOpening, Opening},
  principal::OrganizationPrincipal,
  store::MarketStore,
};
use tracing::info;
use uuid::Uuid;

pub struct OpeningBoard<S> {
  store: Arc<S>,
  gate:  AuthorizationGate,
}

impl<S: MarketStore> OpeningBoard<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, gate: AuthorizationGate } }

  /// Post a new opening owned by `organization`.
  pub async fn create(&self, organization: &OrganizationPrincipal, input: NewOpening) -> Result<Opening> {
    let input = validate(input)?;
    let opening = self
      .store
      .create_opening(organization.organization_id, input)
      .await
      .map_err(Error::store)?;
    info!(
      opening_id = %opening.opening_id,
      organization_id = %organization.organization_id,
      "opening created"
    );
    Ok(opening)
  }

  pub async fn set_visibility(
    &self,
    organization: &OrganizationPrincipal,
    opening_id: Uuid,
    visible: bool,
  ) -> Result<Opening> {
    let opening = self.owned(organization, opening_id).await?;
    if opening.visible == visible {
      return Ok(opening);
    }
    let updated = self
      .store
      .set_opening_visibility(opening_id, visible)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| not_found(opening_id))?;
    info!(opening_id = %opening_id, visible, "opening visibility changed");
    Ok(updated)
  }

  /// Remove the opening together with every application against it.
  pub async fn delete(&self, organization: &OrganizationPrincipal, opening_id: Uuid) -> Result<()> {
    self.owned(organization, opening_id).await?;
    if !self.store.delete_opening(opening_id).await.map_err(Error::store)? {
      return Err(not_found(opening_id));
    }
    info!(opening_id = %opening_id, "opening deleted");
    Ok(())
  }

  /// Fetch the opening and check `organization` owns it. Hidden openings are
  /// still visible to their owner.
  async fn owned(&self, organization: &OrganizationPrincipal, opening_id: Uuid) -> Result<Opening> {
    let opening = self
      .store
      .get_opening(opening_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| not_found(opening_id))?;
    self
      .gate
      .authorize_organization_resource(organization, opening.organization_id)?;
    Ok(opening)
  }
}

fn not_found(id: Uuid) -> Error { Error::NotFound(format!("opening {id}")) }

fn validate(mut input: NewOpening) -> Result<NewOpening> {
  for (field, value) in [
    ("title", &mut input.title),
    ("description", &mut input.description),
    ("location", &mut input.location),
    ("category", &mut input.category),
    ("level", &mut input.level),
  ] {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(Error::ValidationFailed(format!("{field} is required")));
    }
    *value = trimmed.to_owned();
  }
  if i64::try_from(input.salary).is_err() {
    return Err(Error::ValidationFailed("salary is out of range".into()));
  }
  Ok(input)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{self, Fixture};

  #[tokio::test]
  async fn only_owner_may_toggle_visibility() {
    let fx = Fixture::new().await;
    let board = OpeningBoard::new(fx.store.clone());
    let intruder = testutil::organization(&fx.store, "b@corp.test").await;

    let denied = board.set_visibility(&intruder, fx.opening.opening_id, false).await;
    assert!(matches!(denied, Err(Error::Forbidden)));

    let hidden = board
      .set_visibility(&fx.owner, fx.opening.opening_id, false)
      .await
      .unwrap();
    assert!(!hidden.visible);
  }

  #[tokio::test]
  async fn create_trims_and_validates() {
    let fx = Fixture::new().await;
    let board = OpeningBoard::new(fx.store.clone());

    let mut input = testutil::new_opening();
    input.title = "  Platform Engineer ".into();
    let opening = board.create(&fx.owner, input).await.unwrap();
    assert_eq!(opening.title, "Platform Engineer");
    assert_eq!(opening.organization_id, fx.owner.organization_id);

    let mut blank = testutil::new_opening();
    blank.level = String::new();
    assert!(matches!(board.create(&fx.owner, blank).await, Err(Error::ValidationFailed(_))));

    let mut huge = testutil::new_opening();
    huge.salary = u64::MAX;
    assert!(matches!(board.create(&fx.owner, huge).await, Err(Error::ValidationFailed(_))));
  }

  #[tokio::test]
  async fn delete_is_owner_only_and_cascades() {
    let fx = Fixture::new().await;
    let board = OpeningBoard::new(fx.store.clone());
    let intruder = testutil::organization(&fx.store, "b@corp.test").await;

    let denied = board.delete(&intruder, fx.opening.opening_id).await;
    assert!(matches!(denied, Err(Error::Forbidden)));

    board.delete(&fx.owner, fx.opening.opening_id).await.unwrap();
    assert!(fx.store.get_opening(fx.opening.opening_id).await.unwrap().is_none());

    let again = board.delete(&fx.owner, fx.opening.opening_id).await;
    assert!(matches!(again, Err(Error::NotFound(_))));
  }
}
