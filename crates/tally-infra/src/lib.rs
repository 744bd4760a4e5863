//! Infrastructure layer for Tally.
//!
//! Contains implementations of the traits defined in `tally-core`: SQLite
//! storage, credential hashing (Argon2id, SHA-256), completion providers,
//! and the `config.toml` loader.

pub mod config;
pub mod crypto;
pub mod llm;
pub mod sqlite;
