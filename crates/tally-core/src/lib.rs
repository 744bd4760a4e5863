//! Business logic and repository trait definitions for Tally.
//!
//! This crate defines the "ports" (repository and store traits) that the
//! infrastructure layer implements, the chat memory policy, and the expense
//! and account services. It depends only on `tally-types` -- never on
//! `tally-infra` or any database/IO crate.

pub mod chat;
pub mod expense;
pub mod llm;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
