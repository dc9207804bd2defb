//! Error taxonomy shared by every jobgate layer.
//!
//! Verification failures collapse to [`Error::Invalid`] (or
//! [`Error::Expired`]) regardless of cause so that callers cannot test for
//! the existence of accounts.

use thiserror::Error;

use crate::store::StoreFault;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad, tampered, or otherwise unusable credential.
  #[error("invalid credential")]
  Invalid,

  /// Well-formed credential whose validity window has passed.
  #[error("credential expired")]
  Expired,

  /// Deployment-level problem, e.g. missing signing material.
  #[error("misconfigured: {0}")]
  Misconfigured(String),

  /// Authenticated, but not the owner of the target resource.
  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  /// A uniqueness invariant was violated at the storage layer.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("validation failed: {0}")]
  ValidationFailed(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend failure.
  pub fn store<E: StoreFault>(e: E) -> Self { Self::Store(Box::new(e)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
