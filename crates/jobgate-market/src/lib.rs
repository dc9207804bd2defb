//! Ownership-checked mutations on openings, applications, and résumés.
//!
//! Every operation here takes an already-authenticated principal and runs
//! the [`AuthorizationGate`](jobgate_core::gate::AuthorizationGate) before
//! writing.

pub mod ledger;
pub mod openings;
pub mod resume;

pub use ledger::{ApplicationLedger, ApplyPayload};
pub use openings::OpeningBoard;
pub use resume::ResumeBook;

#[cfg(test)]
pub(crate) mod testutil;
