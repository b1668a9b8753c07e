//! Domain model for projects, team-owned items and their presentation keys.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep loosely-typed input (`RawItem`) separate from resolved records
//!   (`Item`), so defaults are applied once at the boundary.
//!
//! # Invariants
//! - `Item::months` is always derived from its dates, never trusted as input.
//! - `Team` declaration order is the display order.

pub mod item;
pub mod project;
pub mod team;
