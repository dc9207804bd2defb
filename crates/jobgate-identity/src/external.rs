//! Verification of bearer assertions issued by the external identity
//! provider.
//!
//! The provider signs session tokens with RS256 and publishes the PEM public
//! key; deployments may instead configure a shared HS256 secret. When neither
//! is configured every verification fails with [`Error::Misconfigured`] so
//! operators can tell a deployment problem from a bad client token.

use jobgate_core::{
  Error, Result,
  claims::{Claims, RawClaims},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::Deserialize;

/// Signing material and checks for provider assertions.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalKeyConfig {
  /// PEM-encoded RSA public key (RS256).
  pub jwt_public_key_pem: Option<String>,
  /// Shared secret (HS256); used only when no PEM key is configured.
  pub jwt_secret:         Option<String>,
  /// Expected `iss` claim, if the provider's issuer should be pinned.
  pub issuer:             Option<String>,
  /// Clock-skew allowance in seconds for `exp`/`nbf`.
  #[serde(default = "default_leeway")]
  pub leeway_secs:        u64,
}

fn default_leeway() -> u64 { 5 }

impl Default for ExternalKeyConfig {
  fn default() -> Self {
    Self {
      jwt_public_key_pem: None,
      jwt_secret:         None,
      issuer:             None,
      leeway_secs:        default_leeway(),
    }
  }
}

enum KeyMaterial {
  Ready { key: DecodingKey, algorithm: Algorithm },
  Missing(String),
}

/// Verifies provider assertions and extracts normalised [`Claims`].
pub struct ExternalTokenVerifier {
  material:   KeyMaterial,
  validation: Validation,
}

impl ExternalTokenVerifier {
  /// Build a verifier. Bad or missing key material does not fail here; it
  /// is reported as [`Error::Misconfigured`] by every [`Self::verify`] call.
  pub fn from_config(config: &ExternalKeyConfig) -> Self {
    let material = match (&config.jwt_public_key_pem, &config.jwt_secret) {
      (Some(pem), _) if !pem.trim().is_empty() => match DecodingKey::from_rsa_pem(pem.as_bytes()) {
        Ok(key) => KeyMaterial::Ready { key, algorithm: Algorithm::RS256 },
        Err(e) => {
          tracing::error!(error = %e, "provider public key is not a valid RSA PEM");
          KeyMaterial::Missing(format!("provider public key is unusable: {e}"))
        }
      },
      (_, Some(secret)) if !secret.is_empty() => KeyMaterial::Ready {
        key:       DecodingKey::from_secret(secret.as_bytes()),
        algorithm: Algorithm::HS256,
      },
      _ => KeyMaterial::Missing("no provider verification key configured".into()),
    };

    let algorithm = match &material {
      KeyMaterial::Ready { algorithm, .. } => *algorithm,
      KeyMaterial::Missing(_) => Algorithm::RS256,
    };
    let mut validation = Validation::new(algorithm);
    validation.leeway = config.leeway_secs;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);
    if let Some(iss) = &config.issuer {
      validation.set_issuer(&[iss]);
    }

    Self { material, validation }
  }

  pub fn is_configured(&self) -> bool { matches!(self.material, KeyMaterial::Ready { .. }) }

  /// Verify signature and expiry, then normalise the embedded claims.
  pub fn verify(&self, token: &str) -> Result<Claims> {
    let key = match &self.material {
      KeyMaterial::Ready { key, .. } => key,
      KeyMaterial::Missing(reason) => return Err(Error::Misconfigured(reason.clone())),
    };

    let data = decode::<RawClaims>(token, key, &self.validation).map_err(|e| match e.kind() {
      ErrorKind::ExpiredSignature => Error::Expired,
      ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) => {
        Error::Misconfigured(format!("provider key rejected: {e}"))
      }
      _ => {
        tracing::debug!(error = %e, "provider assertion rejected");
        Error::Invalid
      }
    })?;

    let claims = data.claims.normalize();
    if claims.subject.is_empty() {
      return Err(Error::Invalid);
    }
    Ok(claims)
  }
}
