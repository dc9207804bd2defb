//! [`SqliteStore`], the SQLite implementation of [`MarketStore`].

use std::path::Path;

use chrono::Utc;
use jobgate_core::{
  market::{Application, ApplicationStatus, NewApplication, NewOpening, Opening},
  principal::{
    IndividualPrincipal, NewIndividual, NewOrganization, OrganizationCredentials,
    OrganizationPrincipal, OrganizationProfile,
  },
  store::MarketStore,
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    APPLICATION_COLUMNS, INDIVIDUAL_COLUMNS, OPENING_COLUMNS, ORGANIZATION_COLUMNS,
    RawApplication, RawIndividual, RawOpening, RawOrganization, encode_dt, encode_email,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A jobgate store backed by a single SQLite file.
///
/// Cloning shares the inner connection handle. All calls
/// are serialised onto the connection's thread; atomicity of each write comes
/// from SQLite itself.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  async fn individual_by_id(&self, id: String) -> Result<Option<IndividualPrincipal>> {
    let raw: Option<RawIndividual> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {INDIVIDUAL_COLUMNS} FROM individuals WHERE individual_id = ?1"),
            rusqlite::params![id],
            RawIndividual::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawIndividual::into_individual).transpose()
  }
}

// ─── MarketStore impl ────────────────────────────────────────────────────────

impl MarketStore for SqliteStore {
  type Error = crate::Error;

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn create_organization(&self, input: NewOrganization) -> Result<OrganizationPrincipal> {
    let organization = OrganizationPrincipal {
      organization_id: Uuid::new_v4(),
      name:            input.name,
      email:           input.email.to_lowercase(),
      logo:            input.logo,
      profile:         input.profile,
      created_at:      Utc::now(),
    };

    let id_str   = encode_uuid(organization.organization_id);
    let at_str   = encode_dt(organization.created_at);
    let name     = organization.name.clone();
    let email    = organization.email.clone();
    let logo     = organization.logo.clone();
    let profile  = organization.profile.clone();
    let hash     = input.password_hash;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO organizations (
             organization_id, name, email, password_hash, logo,
             location, website, about, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            name,
            email,
            hash,
            logo,
            profile.location,
            profile.website,
            profile.about,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(organization)
  }

  async fn get_organization(&self, id: Uuid) -> Result<Option<OrganizationPrincipal>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE organization_id = ?1"),
            rusqlite::params![id_str],
            RawOrganization::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  async fn get_organization_credentials(
    &self,
    email: &str,
  ) -> Result<Option<OrganizationCredentials>> {
    let email = email.trim().to_lowercase();

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE email = ?1"),
            rusqlite::params![email],
            RawOrganization::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOrganization::into_credentials).transpose()
  }

  async fn update_organization_profile(
    &self,
    id: Uuid,
    profile: OrganizationProfile,
  ) -> Result<Option<OrganizationPrincipal>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE organizations SET location = ?2, website = ?3, about = ?4
               WHERE organization_id = ?1
               RETURNING {ORGANIZATION_COLUMNS}"
            ),
            rusqlite::params![id_str, profile.location, profile.website, profile.about],
            RawOrganization::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  // ── Individuals ───────────────────────────────────────────────────────────

  async fn get_individual(&self, id: &str) -> Result<Option<IndividualPrincipal>> {
    self.individual_by_id(id.to_owned()).await
  }

  async fn insert_individual(&self, input: NewIndividual) -> Result<IndividualPrincipal> {
    let now = Utc::now();
    let individual = IndividualPrincipal {
      individual_id: input.individual_id,
      email:         input.email,
      name:          input.name,
      avatar:        input.avatar,
      resume:        None,
      created_at:    now,
      updated_at:    now,
    };

    let id            = individual.individual_id.clone();
    let (email, state) = encode_email(&individual.email);
    let name          = individual.name.clone();
    let avatar        = individual.avatar.clone();
    let at_str        = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO individuals (
             individual_id, email, email_state, name, avatar, resume, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)",
          rusqlite::params![id, email, state, name, avatar, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(individual)
  }

  async fn upsert_individual(&self, input: NewIndividual) -> Result<IndividualPrincipal> {
    let (email, state) = encode_email(&input.email);
    let at_str = encode_dt(Utc::now());

    let raw: RawIndividual = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO individuals (
               individual_id, email, email_state, name, avatar, resume, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)
             ON CONFLICT (individual_id) DO UPDATE SET
               email       = CASE WHEN excluded.email_state = 'resolved'
                                  THEN excluded.email ELSE individuals.email END,
               email_state = CASE WHEN excluded.email_state = 'resolved'
                                  THEN 'resolved' ELSE individuals.email_state END,
               name        = excluded.name,
               avatar      = excluded.avatar,
               updated_at  = excluded.updated_at
             RETURNING {INDIVIDUAL_COLUMNS}"
          ),
          rusqlite::params![input.individual_id, email, state, input.name, input.avatar, at_str],
          RawIndividual::from_row,
        )?)
      })
      .await?;

    raw.into_individual()
  }

  async fn heal_individual_email(
    &self,
    id: &str,
    email: String,
  ) -> Result<Option<IndividualPrincipal>> {
    let id_str = id.to_owned();
    let at_str = encode_dt(Utc::now());

    let healed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE individuals SET email = ?2, email_state = 'resolved', updated_at = ?3
           WHERE individual_id = ?1 AND email_state = 'placeholder'",
          rusqlite::params![id_str, email, at_str],
        )?)
      })
      .await?;

    if healed > 0 {
      tracing::debug!(individual_id = %id, "placeholder email replaced");
    }
    self.individual_by_id(id.to_owned()).await
  }

  async fn set_individual_resume(
    &self,
    id: &str,
    resume: String,
  ) -> Result<Option<IndividualPrincipal>> {
    let id_str = id.to_owned();
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawIndividual> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE individuals SET resume = ?2, updated_at = ?3
               WHERE individual_id = ?1
               RETURNING {INDIVIDUAL_COLUMNS}"
            ),
            rusqlite::params![id_str, resume, at_str],
            RawIndividual::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawIndividual::into_individual).transpose()
  }

  async fn delete_individual(&self, id: &str) -> Result<bool> {
    let id_str = id.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM individuals WHERE individual_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Openings ──────────────────────────────────────────────────────────────

  async fn create_opening(&self, organization_id: Uuid, input: NewOpening) -> Result<Opening> {
    let opening = Opening {
      opening_id: Uuid::new_v4(),
      organization_id,
      title: input.title,
      description: input.description,
      location: input.location,
      category: input.category,
      level: input.level,
      salary: input.salary,
      visible: input.visible,
      created_at: Utc::now(),
    };

    let row = (
      encode_uuid(opening.opening_id),
      encode_uuid(opening.organization_id),
      opening.title.clone(),
      opening.description.clone(),
      opening.location.clone(),
      opening.category.clone(),
      opening.level.clone(),
      i64::try_from(opening.salary).unwrap_or(i64::MAX),
      opening.visible,
      encode_dt(opening.created_at),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO openings (
             opening_id, organization_id, title, description, location,
             category, level, salary, visible, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7, row.8, row.9,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(opening)
  }

  async fn get_opening(&self, id: Uuid) -> Result<Option<Opening>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOpening> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {OPENING_COLUMNS} FROM openings WHERE opening_id = ?1"),
            rusqlite::params![id_str],
            RawOpening::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOpening::into_opening).transpose()
  }

  async fn set_opening_visibility(&self, id: Uuid, visible: bool) -> Result<Option<Opening>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOpening> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE openings SET visible = ?2 WHERE opening_id = ?1
               RETURNING {OPENING_COLUMNS}"
            ),
            rusqlite::params![id_str, visible],
            RawOpening::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOpening::into_opening).transpose()
  }

  async fn delete_opening(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM openings WHERE opening_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn insert_application(&self, input: NewApplication) -> Result<Application> {
    let application = Application {
      application_id:  Uuid::new_v4(),
      opening_id:      input.opening_id,
      organization_id: input.organization_id,
      individual_id:   input.individual_id,
      applicant_name:  input.applicant_name,
      applicant_email: input.applicant_email,
      resume:          input.resume,
      cover_letter:    input.cover_letter,
      status:          ApplicationStatus::Pending,
      created_at:      Utc::now(),
    };

    let row = (
      encode_uuid(application.application_id),
      encode_uuid(application.opening_id),
      encode_uuid(application.organization_id),
      application.individual_id.clone(),
      application.applicant_name.clone(),
      application.applicant_email.clone(),
      application.resume.clone(),
      application.cover_letter.clone(),
      encode_status(application.status),
      encode_dt(application.created_at),
    );

    // The UNIQUE (opening_id, individual_id) constraint decides concurrent
    // submissions; the loser surfaces as a unique violation.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO applications (
             application_id, opening_id, organization_id, individual_id,
             applicant_name, applicant_email, resume, cover_letter, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7, row.8, row.9,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(application)
  }

  async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE application_id = ?1"),
            rusqlite::params![id_str],
            RawApplication::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawApplication::into_application).transpose()
  }

  async fn find_application(
    &self,
    opening_id: Uuid,
    individual_id: &str,
  ) -> Result<Option<Application>> {
    let opening_str    = encode_uuid(opening_id);
    let individual_str = individual_id.to_owned();

    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {APPLICATION_COLUMNS} FROM applications
               WHERE opening_id = ?1 AND individual_id = ?2"
            ),
            rusqlite::params![opening_str, individual_str],
            RawApplication::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawApplication::into_application).transpose()
  }

  async fn set_application_status(
    &self,
    id: Uuid,
    status: ApplicationStatus,
  ) -> Result<Option<Application>> {
    let id_str     = encode_uuid(id);
    let status_str = encode_status(status);

    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE applications SET status = ?2 WHERE application_id = ?1
               RETURNING {APPLICATION_COLUMNS}"
            ),
            rusqlite::params![id_str, status_str],
            RawApplication::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawApplication::into_application).transpose()
  }
}
