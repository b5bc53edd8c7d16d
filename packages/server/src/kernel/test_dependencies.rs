// Test dependencies - mock implementations for testing
//
// Provides mock collaborators that can be injected into ServerDeps for tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domains::account::directory::LockoutPolicy;
use crate::domains::account::models::{Account, NewAccountProfile};
use crate::domains::account::password::Argon2PasswordHasher;
use crate::kernel::{
    BaseCodeGenerator, BaseNotificationSender, BasePasswordHasher, BaseUserDirectory,
    DeliveryError, DirectoryError, NotificationKind,
};

// =============================================================================
// Mock Notification Sender
// =============================================================================

/// A notification captured by the mock sender
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub address: String,
    pub kind: NotificationKind,
    pub data: serde_json::Value,
}

/// Records every send; can be switched into a failing mode to exercise
/// delivery-error paths.
#[derive(Default)]
pub struct MockNotificationSender {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    failing: AtomicBool,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All notifications sent so far
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of sends of a given kind to an address
    pub fn count_to(&self, address: &str, kind: NotificationKind) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.address == address && n.kind == kind)
            .count()
    }

    /// The code carried by the most recent OTP notification, if any
    pub fn last_code(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|n| n.kind == NotificationKind::Otp)
            .and_then(|n| n.data["code"].as_str().map(|s| s.to_string()))
    }
}

#[async_trait]
impl BaseNotificationSender for MockNotificationSender {
    async fn send(
        &self,
        address: &str,
        kind: NotificationKind,
        data: serde_json::Value,
    ) -> Result<(), DeliveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError("simulated delivery failure".to_string()));
        }
        self.sent.lock().unwrap().push(SentNotification {
            address: address.to_string(),
            kind,
            data,
        });
        Ok(())
    }
}

// =============================================================================
// Mock User Directory
// =============================================================================

/// In-memory user directory with the same lockout behavior as the Postgres
/// implementation.
pub struct MockUserDirectory {
    accounts: Mutex<HashMap<String, Account>>,
    hasher: Arc<dyn BasePasswordHasher>,
    lockout: LockoutPolicy,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            hasher: Arc::new(Argon2PasswordHasher),
            lockout: LockoutPolicy::default(),
        }
    }

    pub fn with_lockout(mut self, lockout: LockoutPolicy) -> Self {
        self.lockout = lockout;
        self
    }

    /// Seed an account directly (hashes the password through the real hasher)
    pub async fn seed(&self, email: &str, raw_password: &str, name: &str) -> Account {
        let hash = self
            .hasher
            .hash(raw_password)
            .await
            .expect("test hasher should not fail");
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: hash,
            name: name.to_string(),
            region: "US".to_string(),
            phone: "+15555550100".to_string(),
            email_verified: true,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: Utc::now(),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), account.clone());
        account
    }

    /// Snapshot of a stored account
    pub fn get(&self, email: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(email).cloned()
    }

    /// Mutate a stored account in place (for lock-expiry style setups)
    pub fn update_account<F: FnOnce(&mut Account)>(&self, email: &str, f: F) {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.get_mut(email) {
            f(account);
        }
    }
}

impl Default for MockUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseUserDirectory for MockUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        Ok(self.accounts.lock().unwrap().get(email).cloned())
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: NewAccountProfile,
    ) -> Result<Account, DirectoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(DirectoryError::Conflict);
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: profile.name,
            region: profile.region,
            phone: profile.phone,
            email_verified: true,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: Utc::now(),
        };
        accounts.insert(email.to_string(), account.clone());
        Ok(account)
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
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(stored) = accounts.get_mut(&account.email) {
            stored.failed_login_attempts += 1;
            if let Some(until) = self.lockout.lock_after(stored.failed_login_attempts) {
                stored.locked_until = Some(until);
            }
        }
        Ok(())
    }

    async fn reset_failed_attempts(&self, account: &Account) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(stored) = accounts.get_mut(&account.email) {
            stored.failed_login_attempts = 0;
            stored.locked_until = None;
        }
        Ok(())
    }

    async fn record_login(&self, account: &Account) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(stored) = accounts.get_mut(&account.email) {
            stored.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    fn is_locked(&self, account: &Account) -> bool {
        account.is_locked()
    }
}

// =============================================================================
// Deterministic Code Generator
// =============================================================================

/// Cycles through a fixed list of codes.
pub struct SequenceCodeGenerator {
    codes: Vec<String>,
    cursor: Mutex<usize>,
}

impl SequenceCodeGenerator {
    pub fn new(codes: Vec<&str>) -> Self {
        assert!(!codes.is_empty(), "sequence must contain at least one code");
        Self {
            codes: codes.into_iter().map(|c| c.to_string()).collect(),
            cursor: Mutex::new(0),
        }
    }
}

impl BaseCodeGenerator for SequenceCodeGenerator {
    fn generate(&self) -> String {
        let mut cursor = self.cursor.lock().unwrap();
        let code = self.codes[*cursor % self.codes.len()].clone();
        *cursor += 1;
        code
    }
}
