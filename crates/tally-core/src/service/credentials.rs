//! CredentialHasher trait for passwords and API keys.
//!
//! Defined in tally-core so the account service can hash secrets without
//! coupling to specific algorithms. The `Argon2Credentials` adapter lives in
//! tally-infra.

use tally_types::error::AuthError;

/// Abstraction over password hashing and API key material.
pub trait CredentialHasher: Send + Sync {
    /// Hash a password into a self-describing (PHC) string.
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Check a password against a stored hash. Malformed hashes never verify.
    fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Generate a fresh random API key (plaintext).
    fn generate_api_key(&self) -> String;

    /// Deterministic hex digest used to store and look up API keys.
    fn hash_api_key(&self, key: &str) -> String;
}
