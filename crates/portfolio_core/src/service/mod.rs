//! Use-case services over the record store.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep callers decoupled from persistence details.

pub mod backup;
pub mod export;
pub mod migrate;
pub mod portfolio_service;
