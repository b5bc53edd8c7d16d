//! Postgres-backed user directory.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::models::{Account, NewAccountProfile};
use crate::kernel::{BasePasswordHasher, BaseUserDirectory, DirectoryError};

/// Consecutive-failure lockout policy, owned by the directory.
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    pub max_attempts: i32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_duration: Duration::minutes(30),
        }
    }
}

impl LockoutPolicy {
    /// The lock expiry to apply once `attempts` failures have accumulated,
    /// or `None` while under the threshold.
    pub fn lock_after(&self, attempts: i32) -> Option<DateTime<Utc>> {
        (attempts >= self.max_attempts).then(|| Utc::now() + self.lock_duration)
    }
}

pub struct PgUserDirectory {
    pool: PgPool,
    hasher: Arc<dyn BasePasswordHasher>,
    lockout: LockoutPolicy,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool, hasher: Arc<dyn BasePasswordHasher>, lockout: LockoutPolicy) -> Self {
        Self {
            pool,
            hasher,
            lockout,
        }
    }
}

#[async_trait]
impl BaseUserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        Account::find_by_email(email, &self.pool)
            .await
            .map_err(|e| DirectoryError::Storage(anyhow!(e)))
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: NewAccountProfile,
    ) -> Result<Account, DirectoryError> {
        match Account::insert(email, password_hash, &profile, &self.pool).await {
            Ok(account) => {
                info!("Created account {} for {}", account.id, email);
                Ok(account)
            }
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(DirectoryError::Conflict)
            }
            Err(e) => Err(DirectoryError::Storage(anyhow!(e))),
        }
    }

    async fn verify_password(
        &self,
        account: &Account,
        raw_password: &str,
    ) -> Result<bool, DirectoryError> {
        self.hasher
            .verify(raw_password, &account.password_hash)
            .await
            .map_err(DirectoryError::Storage)
    }

    async fn increment_failed_attempts(&self, account: &Account) -> Result<(), DirectoryError> {
        let attempts = account.failed_login_attempts + 1;
        let new_lock = self.lockout.lock_after(attempts);
        if new_lock.is_some() {
            info!("Locking account {} after {} failed attempts", account.id, attempts);
        }
        let locked_until = new_lock.or(account.locked_until);
        Account::set_failed_attempts(account.id, attempts, locked_until, &self.pool)
            .await
            .map_err(|e| DirectoryError::Storage(anyhow!(e)))
    }

    async fn reset_failed_attempts(&self, account: &Account) -> Result<(), DirectoryError> {
        Account::set_failed_attempts(account.id, 0, None, &self.pool)
            .await
            .map_err(|e| DirectoryError::Storage(anyhow!(e)))
    }

    async fn record_login(&self, account: &Account) -> Result<(), DirectoryError> {
        Account::record_login(account.id, &self.pool)
            .await
            .map_err(|e| DirectoryError::Storage(anyhow!(e)))
    }

    fn is_locked(&self, account: &Account) -> bool {
        account.is_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_lock_below_threshold() {
        let policy = LockoutPolicy::default();
        for attempts in 0..policy.max_attempts {
            assert!(policy.lock_after(attempts).is_none());
        }
    }

    #[test]
    fn test_lock_at_threshold() {
        let policy = LockoutPolicy::default();
        let until = policy.lock_after(policy.max_attempts).unwrap();
        assert!(until > Utc::now());
        assert!(until <= Utc::now() + policy.lock_duration);
    }
}
