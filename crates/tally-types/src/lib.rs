//! Shared domain types for Tally.
//!
//! This crate contains the core domain types used across the Tally workspace:
//! users, expenses, chat turns and memory summaries, LLM request shapes, the
//! global configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, rust_decimal, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod expense;
pub mod llm;
pub mod user;
