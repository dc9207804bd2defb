//! Principals: the two kinds of authenticated actor.
//!
//! Organizations are created locally at registration and authenticate with
//! password-derived credentials. Individuals are keyed by the external identity
//! provider's subject id and may be created either by a provider webhook or
//! lazily on their first authenticated request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Organizations ───────────────────────────────────────────────────────────

/// An organization account. The password hash is never part of this type;
/// see [`OrganizationCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationPrincipal {
  pub organization_id: Uuid,
  pub name:            String,
  /// Always stored lowercased; unique case-insensitively.
  pub email:           String,
  pub logo:            String,
  #[serde(flatten)]
  pub profile:         OrganizationProfile,
  pub created_at:      DateTime<Utc>,
}

/// Free-text profile fields an organization can edit after registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationProfile {
  #[serde(default)]
  pub location: String,
  #[serde(default)]
  pub website:  String,
  #[serde(default)]
  pub about:    String,
}

/// Input to [`crate::store::MarketStore::create_organization`].
#[derive(Debug, Clone)]
pub struct NewOrganization {
  pub name:          String,
  pub email:         String,
  /// PHC string produced by argon2.
  pub password_hash: String,
  pub logo:          String,
  pub profile:       OrganizationProfile,
}

/// An organization together with its stored password hash. Only the login
/// path ever reads this.
#[derive(Debug, Clone)]
pub struct OrganizationCredentials {
  pub organization:  OrganizationPrincipal,
  pub password_hash: String,
}

// ─── Individuals ─────────────────────────────────────────────────────────────

/// The email on an individual record, tagged with whether it is a real
/// address or a generated stand-in awaiting reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "address", rename_all = "snake_case")]
pub enum IndividualEmail {
  Resolved(String),
  Placeholder(String),
}

impl IndividualEmail {
  /// Build the deterministic stand-in for `subject`:
  /// `user_<subject>@<domain>`.
  pub fn placeholder(subject: &str, domain: &str) -> Self {
    Self::Placeholder(format!("user_{subject}@{domain}"))
  }

  pub fn address(&self) -> &str {
    match self {
      Self::Resolved(a) | Self::Placeholder(a) => a,
    }
  }

  pub fn is_placeholder(&self) -> bool { matches!(self, Self::Placeholder(_)) }

  /// The address if it is a real one.
  pub fn resolved(&self) -> Option<&str> {
    match self {
      Self::Resolved(a) => Some(a),
      Self::Placeholder(_) => None,
    }
  }
}

/// A job seeker, identified by the external provider's subject id.
///
/// `individual_id` is provider-controlled and never changes once the record
/// exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualPrincipal {
  pub individual_id: String,
  pub email:         IndividualEmail,
  pub name:          String,
  pub avatar:        String,
  pub resume:        Option<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Input to [`crate::store::MarketStore::insert_individual`] and
/// [`crate::store::MarketStore::upsert_individual`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIndividual {
  pub individual_id: String,
  pub email:         IndividualEmail,
  pub name:          String,
  pub avatar:        String,
}
