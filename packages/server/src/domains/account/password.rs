//! Argon2id password hashing behind the `BasePasswordHasher` trait.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool rather
//! than the async executor.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;

use crate::kernel::BasePasswordHasher;

pub struct Argon2PasswordHasher;

#[async_trait]
impl BasePasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, raw_password: &str) -> Result<String> {
        let raw = raw_password.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(raw.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow!("password hashing failed: {}", e))
        })
        .await?
    }

    async fn verify(&self, raw_password: &str, hash: &str) -> Result<bool> {
        let raw = raw_password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || {
            let parsed =
                PasswordHash::new(&hash).map_err(|e| anyhow!("stored hash is malformed: {}", e))?;
            match Argon2::default().verify_password(raw.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(anyhow!("password verification failed: {}", e)),
            }
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_never_equals_raw_password() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("secret1").await.unwrap();
        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_verify_roundtrip() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("secret1").await.unwrap();
        assert!(hasher.verify("secret1", &hash).await.unwrap());
        assert!(!hasher.verify("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_hashes_differently() {
        // fresh salt per hash
        let hasher = Argon2PasswordHasher;
        let a = hasher.hash("secret1").await.unwrap();
        let b = hasher.hash("secret1").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        let hasher = Argon2PasswordHasher;
        assert!(hasher.verify("secret1", "not-a-hash").await.is_err());
    }
}
