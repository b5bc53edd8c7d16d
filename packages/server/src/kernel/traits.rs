// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like "verify a registration code") lives in domain services
// that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseUserDirectory)

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::domains::account::models::{Account, NewAccountProfile};
use crate::domains::auth::models::PendingRegistration;

// =============================================================================
// User Directory Trait (Infrastructure - account system of record)
// =============================================================================

/// Errors surfaced by the user directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The unique-address constraint of the backing store rejected a create.
    #[error("email address already registered")]
    Conflict,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// System of record for customer accounts.
///
/// The directory owns credential storage and the lockout policy; callers only
/// branch on `is_locked` and delegate counter updates.
#[async_trait]
pub trait BaseUserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;

    /// Create an account. Accounts created through this path have already
    /// proven control of their address, so they are stored verified.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: NewAccountProfile,
    ) -> Result<Account, DirectoryError>;

    /// Check a raw password against the account's stored hash.
    async fn verify_password(
        &self,
        account: &Account,
        raw_password: &str,
    ) -> Result<bool, DirectoryError>;

    async fn increment_failed_attempts(&self, account: &Account) -> Result<(), DirectoryError>;

    async fn reset_failed_attempts(&self, account: &Account) -> Result<(), DirectoryError>;

    /// Record a successful login timestamp.
    async fn record_login(&self, account: &Account) -> Result<(), DirectoryError>;

    fn is_locked(&self, account: &Account) -> bool;
}

// =============================================================================
// Notification Sender Trait (Infrastructure - templated delivery)
// =============================================================================

/// Notification dispatch failed at the delivery provider.
#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Template selector for outbound notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Otp,
    Welcome,
    SecurityAlert,
    PasswordReset,
    OrderConfirmation,
}

#[async_trait]
pub trait BaseNotificationSender: Send + Sync {
    /// Deliver a templated message to an address.
    async fn send(
        &self,
        address: &str,
        kind: NotificationKind,
        data: serde_json::Value,
    ) -> Result<(), DeliveryError>;
}

// =============================================================================
// Pending Registration Store Trait (Infrastructure - KV with TTL)
// =============================================================================

/// Key-value store for in-flight registrations, keyed by address.
///
/// Implementations must upsert atomically per key and expire entries lazily:
/// `get` never returns an entry past its `expires_at`, and may discard it on
/// access. There is no background sweep anywhere.
#[async_trait]
pub trait BasePendingStore: Send + Sync {
    async fn get(&self, email: &str) -> Option<PendingRegistration>;

    /// Insert or overwrite the entry for its address (last write wins).
    async fn put(&self, entry: PendingRegistration);

    async fn remove(&self, email: &str);
}

// =============================================================================
// Code Generator Trait (Infrastructure - pluggable randomness)
// =============================================================================

/// Source of verification codes. Injected so tests can use a deterministic
/// sequence instead of a global RNG.
pub trait BaseCodeGenerator: Send + Sync {
    /// Produce a 6-digit, zero-padded numeric code.
    fn generate(&self) -> String;
}

// =============================================================================
// Password Hasher Trait (Infrastructure - CPU-bound, may offload)
// =============================================================================

#[async_trait]
pub trait BasePasswordHasher: Send + Sync {
    /// One-way hash a raw password for storage.
    async fn hash(&self, raw_password: &str) -> Result<String>;

    /// Check a raw password against a stored hash.
    async fn verify(&self, raw_password: &str, hash: &str) -> Result<bool>;
}
