//! Seeded in-memory stores for this crate's unit tests.

use std::sync::Arc;

use jobgate_core::{
  market::{NewOpening, Opening},
  principal::{
    IndividualEmail, IndividualPrincipal, NewIndividual, NewOrganization, OrganizationPrincipal,
    OrganizationProfile,
  },
  store::MarketStore,
};
use jobgate_store_sqlite::SqliteStore;

pub fn new_opening() -> NewOpening {
  NewOpening {
    title:       "Backend Engineer".into(),
    description: "Rust services".into(),
    location:    "Remote".into(),
    category:    "Programming".into(),
    level:       "Senior".into(),
    salary:      120_000,
    visible:     true,
  }
}

pub async fn organization(store: &SqliteStore, email: &str) -> OrganizationPrincipal {
  store
    .create_organization(NewOrganization {
      name:          "Corp".into(),
      email:         email.into(),
      password_hash: "$argon2id$v=19$stub".into(),
      logo:          "https://cdn.test/logo.png".into(),
      profile:       OrganizationProfile::default(),
    })
    .await
    .expect("organization")
}

/// One organization owning one visible opening, and one applicant
/// (`usr_1`) with no résumé on file.
pub struct Fixture {
  pub store:     Arc<SqliteStore>,
  pub owner:     OrganizationPrincipal,
  pub opening:   Opening,
  pub applicant: IndividualPrincipal,
}

impl Fixture {
  pub async fn new() -> Self {
    let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
    let owner = organization(&store, "a@corp.test").await;
    let opening = store
      .create_opening(owner.organization_id, new_opening())
      .await
      .expect("opening");
    let applicant = store
      .insert_individual(NewIndividual {
        individual_id: "usr_1".into(),
        email:         IndividualEmail::Resolved("ada@example.com".into()),
        name:          "Ada".into(),
        avatar:        "https://img.test/ada.png".into(),
      })
      .await
      .expect("individual");
    Self { store, owner, opening, applicant }
  }
}
