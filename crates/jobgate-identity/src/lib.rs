//! Identity verification and reconciliation for jobgate.
//!
//! Two credential schemes are admitted:
//!
//! ```text
//! organization  → `token` header     → CredentialIssuer::verify  → re-resolve from store
//! individual    → Authorization: Bearer → ExternalTokenVerifier::verify
//!                                     → IdentityReconciler::reconcile → durable local record
//! ```
//!
//! Provider push events (webhooks) are verified by [`webhook::WebhookVerifier`]
//! and applied by [`sync::PrincipalSync`]; both that path and lazy
//! reconciliation converge on the store's primary key for individuals.

#![allow(async_fn_in_trait)]

pub mod accounts;
pub mod credential;
pub mod external;
pub mod password;
pub mod profile;
pub mod reconcile;
pub mod sync;
pub mod webhook;

pub use accounts::{OrganizationAccounts, Registration, Session};
pub use credential::CredentialIssuer;
pub use external::{ExternalKeyConfig, ExternalTokenVerifier};
pub use profile::{HttpProfileSource, NoProfileSource, ProfileError, ProfileSource};
pub use reconcile::IdentityReconciler;
pub use sync::{PrincipalEvent, PrincipalSync, SyncOutcome};
pub use webhook::WebhookVerifier;

#[cfg(test)]
pub(crate) mod testutil;
