//! In-process pending-registration store.
//!
//! Entries expire lazily: an entry past its `expires_at` is treated as absent
//! and discarded on the next access. No timer or sweep task exists.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domains::auth::models::PendingRegistration;
use crate::kernel::BasePendingStore;

/// Mutexed map keyed by address. Suits a single-process deployment; swapping
/// in a shared cache only requires another `BasePendingStore` impl.
#[derive(Default)]
pub struct InMemoryPendingStore {
    entries: Mutex<HashMap<String, PendingRegistration>>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BasePendingStore for InMemoryPendingStore {
    async fn get(&self, email: &str) -> Option<PendingRegistration> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(email) {
            Some(entry) if entry.is_expired() => {
                entries.remove(email);
                None
            }
            Some(entry) => Some(entry.clone()),
            None => None,
        }
    }

    async fn put(&self, entry: PendingRegistration) {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.email.clone(), entry);
    }

    async fn remove(&self, email: &str) {
        self.entries.lock().unwrap().remove(email);
    }
}
