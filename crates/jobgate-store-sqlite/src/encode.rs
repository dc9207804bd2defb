//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, and
//! enums their lowercase names.

use chrono::{DateTime, Utc};
use jobgate_core::{
  market::{Application, ApplicationStatus, Opening},
  principal::{
    IndividualEmail, IndividualPrincipal, OrganizationCredentials, OrganizationPrincipal,
    OrganizationProfile,
  },
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── IndividualEmail ──────────────────────────────────────────────────────────

/// Split into the `(email, email_state)` column pair.
pub fn encode_email(e: &IndividualEmail) -> (String, &'static str) {
  match e {
    IndividualEmail::Resolved(a) => (a.clone(), "resolved"),
    IndividualEmail::Placeholder(a) => (a.clone(), "placeholder"),
  }
}

pub fn decode_email(address: String, state: &str) -> Result<IndividualEmail> {
  match state {
    "resolved" => Ok(IndividualEmail::Resolved(address)),
    "placeholder" => Ok(IndividualEmail::Placeholder(address)),
    other => Err(Error::Decode { column: "email_state", value: other.to_owned() }),
  }
}

// ─── ApplicationStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: ApplicationStatus) -> String { s.to_string() }

pub fn decode_status(s: &str) -> Result<ApplicationStatus> {
  s.parse()
    .map_err(|_| Error::Decode { column: "status", value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ORGANIZATION_COLUMNS: &str = "organization_id, name, email, logo, location, \
                                        website, about, created_at, password_hash";

/// Raw strings read directly from an `organizations` row.
pub struct RawOrganization {
  pub organization_id: String,
  pub name:            String,
  pub email:           String,
  pub logo:            String,
  pub location:        String,
  pub website:         String,
  pub about:           String,
  pub created_at:      String,
  pub password_hash:   String,
}

impl RawOrganization {
  /// Read a row selected with [`ORGANIZATION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      organization_id: row.get(0)?,
      name:            row.get(1)?,
      email:           row.get(2)?,
      logo:            row.get(3)?,
      location:        row.get(4)?,
      website:         row.get(5)?,
      about:           row.get(6)?,
      created_at:      row.get(7)?,
      password_hash:   row.get(8)?,
    })
  }

  pub fn into_credentials(self) -> Result<OrganizationCredentials> {
    let organization = OrganizationPrincipal {
      organization_id: decode_uuid(&self.organization_id)?,
      name:            self.name,
      email:           self.email,
      logo:            self.logo,
      profile:         OrganizationProfile {
        location: self.location,
        website:  self.website,
        about:    self.about,
      },
      created_at:      decode_dt(&self.created_at)?,
    };
    Ok(OrganizationCredentials { organization, password_hash: self.password_hash })
  }

  pub fn into_organization(self) -> Result<OrganizationPrincipal> {
    Ok(self.into_credentials()?.organization)
  }
}

pub const INDIVIDUAL_COLUMNS: &str =
  "individual_id, email, email_state, name, avatar, resume, created_at, updated_at";

/// Raw strings read directly from an `individuals` row.
pub struct RawIndividual {
  pub individual_id: String,
  pub email:         String,
  pub email_state:   String,
  pub name:          String,
  pub avatar:        String,
  pub resume:        Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawIndividual {
  /// Read a row selected with [`INDIVIDUAL_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      individual_id: row.get(0)?,
      email:         row.get(1)?,
      email_state:   row.get(2)?,
      name:          row.get(3)?,
      avatar:        row.get(4)?,
      resume:        row.get(5)?,
      created_at:    row.get(6)?,
      updated_at:    row.get(7)?,
    })
  }

  pub fn into_individual(self) -> Result<IndividualPrincipal> {
    Ok(IndividualPrincipal {
      email:         decode_email(self.email, &self.email_state)?,
      individual_id: self.individual_id,
      name:          self.name,
      avatar:        self.avatar,
      resume:        self.resume.filter(|r| !r.is_empty()),
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub const OPENING_COLUMNS: &str = "opening_id, organization_id, title, description, location, \
                                   category, level, salary, visible, created_at";

/// Raw values read directly from an `openings` row.
pub struct RawOpening {
  pub opening_id:      String,
  pub organization_id: String,
  pub title:           String,
  pub description:     String,
  pub location:        String,
  pub category:        String,
  pub level:           String,
  pub salary:          i64,
  pub visible:         bool,
  pub created_at:      String,
}

impl RawOpening {
  /// Read a row selected with [`OPENING_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      opening_id:      row.get(0)?,
      organization_id: row.get(1)?,
      title:           row.get(2)?,
      description:     row.get(3)?,
      location:        row.get(4)?,
      category:        row.get(5)?,
      level:           row.get(6)?,
      salary:          row.get(7)?,
      visible:         row.get(8)?,
      created_at:      row.get(9)?,
    })
  }

  pub fn into_opening(self) -> Result<Opening> {
    let salary = u64::try_from(self.salary)
      .map_err(|_| Error::Decode { column: "salary", value: self.salary.to_string() })?;
    Ok(Opening {
      opening_id: decode_uuid(&self.opening_id)?,
      organization_id: decode_uuid(&self.organization_id)?,
      title: self.title,
      description: self.description,
      location: self.location,
      category: self.category,
      level: self.level,
      salary,
      visible: self.visible,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const APPLICATION_COLUMNS: &str = "application_id, opening_id, organization_id, \
                                       individual_id, applicant_name, applicant_email, resume, \
                                       cover_letter, status, created_at";

/// Raw strings read directly from an `applications` row.
pub struct RawApplication {
  pub application_id:  String,
  pub opening_id:      String,
  pub organization_id: String,
  pub individual_id:   String,
  pub applicant_name:  String,
  pub applicant_email: String,
  pub resume:          String,
  pub cover_letter:    String,
  pub status:          String,
  pub created_at:      String,
}

impl RawApplication {
  /// Read a row selected with [`APPLICATION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      application_id:  row.get(0)?,
      opening_id:      row.get(1)?,
      organization_id: row.get(2)?,
      individual_id:   row.get(3)?,
      applicant_name:  row.get(4)?,
      applicant_email: row.get(5)?,
      resume:          row.get(6)?,
      cover_letter:    row.get(7)?,
      status:          row.get(8)?,
      created_at:      row.get(9)?,
    })
  }

  pub fn into_application(self) -> Result<Application> {
    Ok(Application {
      application_id:  decode_uuid(&self.application_id)?,
      opening_id:      decode_uuid(&self.opening_id)?,
      organization_id: decode_uuid(&self.organization_id)?,
      individual_id:   self.individual_id,
      applicant_name:  self.applicant_name,
      applicant_email: self.applicant_email,
      resume:          self.resume,
      cover_letter:    self.cover_letter,
      status:          decode_status(&self.status)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
