//! Domain model for jobgate: principals, openings, applications, claim
//! normalisation, the ownership gate, and the storage trait every backend
//! implements.
//!
//! Nothing here performs I/O. Identity verification lives in
//! `jobgate-identity`, persistence in `jobgate-store-sqlite`.

// Store futures carry explicit `Send` bounds in the trait; implementations
// use plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod claims;
pub mod error;
pub mod gate;
pub mod market;
pub mod principal;
pub mod store;

pub use error::{Error, Result};
