//! Ownership checks that every mutating path runs before touching storage.
//!
//! There is no superuser bypass: an organization may act only on resources
//! whose owner id is its own, and an individual only on itself.

use uuid::Uuid;

use crate::{
  Error, Result,
  principal::{IndividualPrincipal, OrganizationPrincipal},
};

/// Binds an authenticated principal to the resource being acted upon.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
  /// Succeeds only when `principal` owns the resource. Callers pass the
  /// opening's or application's denormalised `organization_id`.
  pub fn authorize_organization_resource(
    &self,
    principal: &OrganizationPrincipal,
    resource_owner_id: Uuid,
  ) -> Result<()> {
    if principal.organization_id == resource_owner_id {
      Ok(())
    } else {
      Err(Error::Forbidden)
    }
  }

  /// Succeeds only when the authenticated individual is the target.
  pub fn authorize_self(&self, principal: &IndividualPrincipal, target_id: &str) -> Result<()> {
    if principal.individual_id == target_id {
      Ok(())
    } else {
      Err(Error::Forbidden)
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::principal::{IndividualEmail, OrganizationProfile};

  fn org(id: Uuid) -> OrganizationPrincipal {
    OrganizationPrincipal {
      organization_id: id,
      name:            "Acme".into(),
      email:           "hr@acme.test".into(),
      logo:            "https://cdn/acme.png".into(),
      profile:         OrganizationProfile::default(),
      created_at:      Utc::now(),
    }
  }

  fn individual(id: &str) -> IndividualPrincipal {
    IndividualPrincipal {
      individual_id: id.into(),
      email:         IndividualEmail::Resolved("a@b.com".into()),
      name:          "A".into(),
      avatar:        "https://img/a".into(),
      resume:        None,
      created_at:    Utc::now(),
      updated_at:    Utc::now(),
    }
  }

  #[test]
  fn owner_is_allowed() {
    let a = Uuid::new_v4();
    assert!(AuthorizationGate.authorize_organization_resource(&org(a), a).is_ok());
  }

  #[test]
  fn other_organization_is_forbidden() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let result = AuthorizationGate.authorize_organization_resource(&org(b), a);
    assert!(matches!(result, Err(Error::Forbidden)));
  }

  #[test]
  fn individuals_may_only_act_on_themselves() {
    let me = individual("usr_1");
    assert!(AuthorizationGate.authorize_self(&me, "usr_1").is_ok());
    assert!(matches!(AuthorizationGate.authorize_self(&me, "usr_2"), Err(Error::Forbidden)));
  }
}
