//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (tally-infra) implements. The core crate never depends on any specific
//! storage technology.

pub mod expense;
pub mod user;
