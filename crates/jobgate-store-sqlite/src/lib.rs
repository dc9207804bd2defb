//! SQLite backend for the jobgate store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every uniqueness invariant is a
//! constraint in [`schema`], so concurrent writers are arbitrated by SQLite
//! rather than by read-then-write checks.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
