//! Cryptographic operations for Tally.
//!
//! - `credentials`: Argon2id password hashing, API key generation and
//!   SHA-256 key digests

pub mod credentials;
