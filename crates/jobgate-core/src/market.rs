//! Openings and the applications submitted against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

// ─── Openings ────────────────────────────────────────────────────────────────

/// A job posting, owned exclusively by one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
  pub opening_id:      Uuid,
  pub organization_id: Uuid,
  pub title:           String,
  pub description:     String,
  pub location:        String,
  pub category:        String,
  pub level:           String,
  pub salary:          u64,
  /// Hidden openings reject new applications.
  pub visible:         bool,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::MarketStore::create_opening`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOpening {
  pub title:       String,
  pub description: String,
  pub location:    String,
  pub category:    String,
  pub level:       String,
  pub salary:      u64,
  #[serde(default = "default_visible")]
  pub visible:     bool,
}

fn default_visible() -> bool { true }

// ─── Applications ────────────────────────────────────────────────────────────

/// Lifecycle state of an application. Only the owning organization moves it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  Pending,
  Accepted,
  Rejected,
}

/// An individual's submission against an opening.
///
/// At most one exists per `(opening_id, individual_id)`; the storage layer
/// enforces this with a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
  pub application_id:  Uuid,
  pub opening_id:      Uuid,
  /// Copied from the opening at creation so ownership checks need no join.
  pub organization_id: Uuid,
  pub individual_id:   String,
  pub applicant_name:  String,
  pub applicant_email: String,
  pub resume:          String,
  pub cover_letter:    String,
  pub status:          ApplicationStatus,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::MarketStore::insert_application`].
/// The store assigns the id and timestamp; status always starts `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
  pub opening_id:      Uuid,
  pub organization_id: Uuid,
  pub individual_id:   String,
  pub applicant_name:  String,
  pub applicant_email: String,
  pub resume:          String,
  pub cover_letter:    String,
}
