//! Self-signed session tokens for organization principals.
//!
//! Tokens are HS256 JWTs carrying the organization id as `sub`. They are
//! stateless: [`CredentialIssuer::verify`] proves only that this server issued
//! the token and that it has not expired. Callers must re-resolve the
//! organization from storage, since it may have changed since issuance.

use std::time::Duration;

use chrono::Utc;
use jobgate_core::{Error, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience stamped into every organization token.
const AUDIENCE: &str = "jobgate:organization";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
  sub: String,
  aud: String,
  iat: i64,
  exp: i64,
}

/// Issues and verifies organization session tokens.
pub struct CredentialIssuer {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
}

impl CredentialIssuer {
  /// Build an issuer around a shared secret. An empty secret is a deployment
  /// error.
  pub fn new(secret: &[u8], ttl: Duration) -> Result<Self> {
    if secret.is_empty() {
      return Err(Error::Misconfigured("organization token secret is empty".into()));
    }
    if secret.len() < 32 {
      tracing::warn!("organization token secret is shorter than 32 bytes");
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_audience(&[AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "sub", "aud"]);

    Ok(Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
      ttl,
    })
  }

  /// Sign a token for `organization_id`, valid for the configured TTL.
  pub fn issue(&self, organization_id: Uuid) -> Result<String> {
    self.issue_at(organization_id, Utc::now().timestamp())
  }

  fn issue_at(&self, organization_id: Uuid, now: i64) -> Result<String> {
    let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
    let claims = SessionClaims {
      sub: organization_id.to_string(),
      aud: AUDIENCE.to_owned(),
      iat: now,
      exp: now.saturating_add(ttl),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| Error::Misconfigured(format!("failed to sign token: {e}")))
  }

  /// Verify `token` and return the organization id it binds.
  ///
  /// Malformed, tampered, and expired tokens all fail with
  /// [`Error::Invalid`].
  pub fn verify(&self, token: &str) -> Result<Uuid> {
    let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(|e| {
      tracing::debug!(error = %e, "organization token rejected");
      Error::Invalid
    })?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| Error::Invalid)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn issuer() -> CredentialIssuer {
    CredentialIssuer::new(b"0123456789abcdef0123456789abcdef", Duration::from_secs(3600)).unwrap()
  }

  #[test]
  fn issue_then_verify_returns_same_id() {
    let issuer = issuer();
    let id = Uuid::new_v4();
    let token = issuer.issue(id).unwrap();
    assert_eq!(issuer.verify(&token).unwrap(), id);
  }

  #[test]
  fn tampering_any_byte_invalidates() {
    let issuer = issuer();
    let token = issuer.issue(Uuid::new_v4()).unwrap();

    for i in 0..token.len() {
      let mut bytes = token.clone().into_bytes();
      bytes[i] = if bytes[i] == b'A' { b'Q' } else { b'A' };
      let tampered = String::from_utf8(bytes).unwrap();
      assert!(
        matches!(issuer.verify(&tampered), Err(Error::Invalid)),
        "tampered byte {i} still verified"
      );
    }
  }

  #[test]
  fn expired_token_is_invalid() {
    let issuer = issuer();
    let long_ago = Utc::now().timestamp() - 7200;
    let token = issuer.issue_at(Uuid::new_v4(), long_ago).unwrap();
    assert!(matches!(issuer.verify(&token), Err(Error::Invalid)));
  }

  #[test]
  fn token_from_other_secret_is_invalid() {
    let other = CredentialIssuer::new(b"another-secret-another-secret-xx", Duration::from_secs(60))
      .unwrap();
    let token = other.issue(Uuid::new_v4()).unwrap();
    assert!(matches!(issuer().verify(&token), Err(Error::Invalid)));
  }

  #[test]
  fn garbage_is_invalid() {
    assert!(matches!(issuer().verify("not.a.jwt"), Err(Error::Invalid)));
    assert!(matches!(issuer().verify(""), Err(Error::Invalid)));
  }

  #[test]
  fn empty_secret_is_misconfigured() {
    let result = CredentialIssuer::new(b"", Duration::from_secs(60));
    assert!(matches!(result, Err(Error::Misconfigured(_))));
  }
}
