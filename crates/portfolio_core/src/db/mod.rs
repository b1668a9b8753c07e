//! SQLite bootstrap for the relational record store.
//!
//! Connections handed out here are configured and fully migrated; failures
//! surface as [`crate::repo::StoreError`] so callers see one error type
//! whichever store they opened.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - `projects`/`items` are never read before migrations succeed.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
