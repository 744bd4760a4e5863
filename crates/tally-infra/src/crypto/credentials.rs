//! Argon2id password hashing and API key material.
//!
//! Implements the `CredentialHasher` trait from `tally-core` using the
//! RustCrypto `argon2` and `sha2` crates. Randomness comes from the OS
//! generator re-exported by `aes-gcm`.

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use sha2::{Digest, Sha256};

use tally_core::service::credentials::CredentialHasher;
use tally_types::error::AuthError;

/// Prefix that makes Tally keys recognizable in logs and secret scanners.
pub const API_KEY_PREFIX: &str = "tally_";

/// Argon2id + SHA-256 implementation of `CredentialHasher`.
///
/// Passwords are stored as PHC strings (algorithm, parameters and salt are
/// embedded), so the default parameters can change without breaking
/// existing accounts.
#[derive(Default)]
pub struct Argon2Credentials {
    argon2: Argon2<'static>,
}

impl Argon2Credentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Credentials {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::warn!(error = %e, "password hashing failed");
                AuthError::HashingFailed
            })
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    fn generate_api_key(&self) -> String {
        let mut key_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut key_bytes);
        format!(
            "{API_KEY_PREFIX}{}",
            key_bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
        )
    }

    fn hash_api_key(&self, key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        format!("{:x}", digest)
    }
}
