//! Claims extracted from external identity assertions, and the pure rules
//! that turn them into a local individual record.
//!
//! Providers vary in which profile claims they embed and under which names.
//! [`RawClaims`] accepts the common spellings; [`RawClaims::normalize`]
//! collapses them into the tagged [`Claims`] shape so no call site has to
//! inspect alternate fields itself.

use serde::Deserialize;

use crate::principal::{IndividualEmail, NewIndividual};

// ─── Raw wire shape ──────────────────────────────────────────────────────────

/// Claims as they appear in a provider token payload. Every profile field is
/// optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClaims {
  pub sub:                   String,
  pub email:                 Option<String>,
  pub email_address:         Option<String>,
  pub primary_email_address: Option<String>,
  pub name:                  Option<String>,
  pub full_name:             Option<String>,
  pub first_name:            Option<String>,
  pub last_name:             Option<String>,
  pub given_name:            Option<String>,
  pub family_name:           Option<String>,
  pub image_url:             Option<String>,
  pub picture:               Option<String>,
  pub avatar:                Option<String>,
}

impl RawClaims {
  pub fn normalize(self) -> Claims {
    let email = [self.email, self.email_address, self.primary_email_address]
      .into_iter()
      .find_map(|e| normalize_email(e.as_deref()));

    let name = clean(self.name.as_deref())
      .or_else(|| clean(self.full_name.as_deref()))
      .or_else(|| join_name(self.first_name.as_deref(), self.last_name.as_deref()))
      .or_else(|| join_name(self.given_name.as_deref(), self.family_name.as_deref()));

    let avatar = [self.image_url, self.picture, self.avatar]
      .into_iter()
      .find_map(|a| clean(a.as_deref()));

    Claims { subject: self.sub.trim().to_owned(), email, name, avatar }
  }
}

// ─── Normalised shapes ───────────────────────────────────────────────────────

/// Verified claims about an individual. Absent fields were not supplied by
/// the provider (or were blank).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
  pub subject: String,
  pub email:   Option<String>,
  pub name:    Option<String>,
  pub avatar:  Option<String>,
}

impl Claims {
  pub fn new(subject: impl Into<String>) -> Self {
    Self { subject: subject.into(), ..Self::default() }
  }

  pub fn with_email(mut self, email: impl AsRef<str>) -> Self {
    self.email = normalize_email(Some(email.as_ref()));
    self
  }

  pub fn with_name(mut self, name: impl AsRef<str>) -> Self {
    self.name = clean(Some(name.as_ref()));
    self
  }

  pub fn profile(&self) -> ExternalProfile {
    ExternalProfile {
      email:  self.email.clone(),
      name:   self.name.clone(),
      avatar: self.avatar.clone(),
    }
  }
}

/// Profile data from a live lookup against the provider (or from a webhook
/// event). Same optionality rules as [`Claims`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalProfile {
  pub email:  Option<String>,
  pub name:   Option<String>,
  pub avatar: Option<String>,
}

impl ExternalProfile {
  /// Fill any field missing from `self` with the one from `other`.
  pub fn or(self, other: ExternalProfile) -> Self {
    Self {
      email:  self.email.or(other.email),
      name:   self.name.or(other.name),
      avatar: self.avatar.or(other.avatar),
    }
  }
}

// ─── Resolution rules ────────────────────────────────────────────────────────

/// Fallback values used when neither claims nor a live lookup supply a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDefaults {
  /// Domain for generated placeholder emails.
  pub placeholder_domain:  String,
  pub default_name:        String,
  /// Base URL of an avatar generator; the subject id is appended as `seed`.
  pub default_avatar_base: String,
}

impl Default for IdentityDefaults {
  fn default() -> Self {
    Self {
      placeholder_domain:  "placeholder.jobgate.invalid".to_owned(),
      default_name:        "New User".to_owned(),
      default_avatar_base: "https://api.dicebear.com/9.x/initials/svg".to_owned(),
    }
  }
}

impl IdentityDefaults {
  pub fn placeholder_email(&self, subject: &str) -> IndividualEmail {
    IndividualEmail::placeholder(subject, &self.placeholder_domain)
  }

  pub fn default_avatar(&self, subject: &str) -> String {
    let seed: String = subject
      .chars()
      .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
      .collect();
    format!("{}?seed={seed}", self.default_avatar_base.trim_end_matches('/'))
  }
}

/// Decide every field of a brand-new individual record for `subject` from
/// the best available profile data.
///
/// Email falls back to a tagged placeholder; name falls back to the resolved
/// email's local part and then to the configured default; avatar falls back
/// to a generated one.
pub fn resolve_new_individual(
  subject: &str,
  profile: &ExternalProfile,
  defaults: &IdentityDefaults,
) -> NewIndividual {
  let email = match &profile.email {
    Some(address) => IndividualEmail::Resolved(address.clone()),
    None => defaults.placeholder_email(subject),
  };

  let name = profile
    .name
    .clone()
    .or_else(|| email.resolved().and_then(local_part))
    .unwrap_or_else(|| defaults.default_name.clone());

  let avatar = profile
    .avatar
    .clone()
    .unwrap_or_else(|| defaults.default_avatar(subject));

  NewIndividual { individual_id: subject.to_owned(), email, name, avatar }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn clean(s: Option<&str>) -> Option<String> {
  s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

/// Trim, lowercase, and reject anything that is not plausibly an address.
pub fn normalize_email(s: Option<&str>) -> Option<String> {
  let s = clean(s)?.to_lowercase();
  match s.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Some(s),
    _ => None,
  }
}

fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
  let joined = [clean(first), clean(last)]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");
  (!joined.is_empty()).then_some(joined)
}

fn local_part(email: &str) -> Option<String> {
  email
    .split_once('@')
    .map(|(local, _)| local.to_owned())
    .filter(|l| !l.is_empty())
}
