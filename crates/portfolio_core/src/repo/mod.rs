//! Record store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the `RecordStore` collaborator consumed by the service layer.
//! - Keep SQL and file-format details behind that boundary.
//!
//! # Invariants
//! - Project writes run `Project::validate()` before persistence.
//! - Item reads always return recomputed `months`.
//! - `replace_items` is all-or-nothing per call.

pub mod file_store;
pub mod sqlite_store;
pub mod store;

pub use file_store::FileRecordStore;
pub use sqlite_store::SqliteRecordStore;
pub use store::{RecordStore, StoreError, StoreResult};
