//! Argon2 password hashing for organization accounts.
//!
//! Production builds use `Argon2::default()` (Argon2id, 19 MiB, 2 passes).
//! Unit tests in this crate use minimal parameters so they run quickly;
//! verification always reads the parameters from the stored PHC string.

use std::sync::OnceLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
#[cfg(test)]
use argon2::{Algorithm, Params, Version};
use jobgate_core::{Error, Result};
use rand_core::OsRng;

#[inline]
fn argon2_instance() -> Argon2<'static> {
  #[cfg(test)]
  {
    let params = Params::new(1024, 1, 1, None).expect("valid Argon2 params for tests");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
  }

  #[cfg(not(test))]
  {
    Argon2::default()
  }
}

/// Hash `password` with a fresh random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  argon2_instance()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Misconfigured(format!("argon2 error: {e}")))
}

/// `true` iff `password` matches `phc`. A malformed stored hash never matches.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    tracing::warn!("stored password hash is not a valid PHC string");
    return false;
  };
  argon2_instance()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Spend the same work as a real verification against a throwaway hash.
///
/// Used when no account matches a login email so the response costs the
/// same as a wrong password.
pub fn verify_against_dummy(password: &str) {
  static DUMMY: OnceLock<Option<String>> = OnceLock::new();
  let dummy = DUMMY.get_or_init(|| hash_password("jobgate-dummy-password").ok());
  if let Some(phc) = dummy {
    let _ = verify_password(password, phc);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("hunter2").unwrap();
    assert!(phc.starts_with("$argon2id$"));
    assert!(verify_password("hunter2", &phc));
    assert!(!verify_password("hunter3", &phc));
  }

  #[test]
  fn same_password_gets_distinct_salts() {
    assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
  }

  #[test]
  fn malformed_hash_never_matches() {
    assert!(!verify_password("anything", "not-a-phc-string"));
  }
}
