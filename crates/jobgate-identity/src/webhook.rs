//! Signature verification for provider push events.
//!
//! The provider signs `"{msg_id}.{timestamp}.{body}"` with HMAC-SHA256 under
//! a shared secret distributed as `whsec_<base64>`. The signature header is a
//! space-separated list of `v1,<base64>` entries; any one matching admits the
//! event, which lets the provider rotate secrets without downtime.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use jobgate_core::{Error, Result};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// Maximum distance, in seconds, between the signed timestamp and the local
/// clock.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct WebhookVerifier {
  mac: HmacSha256,
}

impl WebhookVerifier {
  pub fn new(secret: &str) -> Result<Self> {
    let encoded = secret.trim();
    let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
    let key = STANDARD
      .decode(encoded)
      .map_err(|e| Error::Misconfigured(format!("webhook secret is not base64: {e}")))?;
    if key.is_empty() {
      return Err(Error::Misconfigured("webhook secret is empty".into()));
    }
    let mac = HmacSha256::new_from_slice(&key)
      .map_err(|e| Error::Misconfigured(format!("webhook secret: {e}")))?;
    Ok(Self { mac })
  }

  /// Check `signatures` against `body` as delivered under `msg_id` at
  /// `timestamp` (unix seconds). Every failure is [`Error::Invalid`].
  pub fn verify(&self, msg_id: &str, timestamp: &str, signatures: &str, body: &[u8]) -> Result<()> {
    self.verify_at(msg_id, timestamp, signatures, body, Utc::now())
  }

  fn verify_at(
    &self,
    msg_id: &str,
    timestamp: &str,
    signatures: &str,
    body: &[u8],
    now: DateTime<Utc>,
  ) -> Result<()> {
    let secs: i64 = timestamp.trim().parse().map_err(|_| Error::Invalid)?;
    let sent = DateTime::from_timestamp(secs, 0).ok_or(Error::Invalid)?;
    if (now - sent).num_seconds().abs() > TIMESTAMP_TOLERANCE_SECS {
      return Err(Error::Invalid);
    }

    let signed = self.signed(msg_id, timestamp.trim(), body);
    let matched = signatures
      .split_whitespace()
      .filter_map(|entry| entry.split_once(','))
      .filter(|(version, _)| *version == SIGNATURE_VERSION)
      .filter_map(|(_, sig)| STANDARD.decode(sig).ok())
      .any(|sig| signed.clone().verify_slice(&sig).is_ok());

    if matched { Ok(()) } else { Err(Error::Invalid) }
  }

  /// Produce a `v1,<base64>` signature entry, as the provider would.
  pub fn sign(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> String {
    let tag = self
      .signed(msg_id, &timestamp.to_string(), body)
      .finalize()
      .into_bytes();
    format!("{SIGNATURE_VERSION},{}", STANDARD.encode(tag))
  }

  fn signed(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
    let mut mac = self.mac.clone();
    mac.update(msg_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    mac
  }
}

impl std::fmt::Debug for WebhookVerifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WebhookVerifier").finish_non_exhaustive()
  }
}
