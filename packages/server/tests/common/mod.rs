//! Shared test fixtures: domain services wired to in-memory collaborators.

use std::sync::Arc;

use commerce_core::domains::account::Argon2PasswordHasher;
use commerce_core::domains::auth::models::RegistrationPayload;
use commerce_core::domains::auth::{
    JwtService, RandomCodeGenerator, RegistrationService, SessionService,
};
use commerce_core::kernel::{
    BaseCodeGenerator, InMemoryPendingStore, MockNotificationSender, MockUserDirectory,
    SequenceCodeGenerator, ServerDeps,
};

pub struct TestHarness {
    pub registration: RegistrationService,
    pub sessions: SessionService,
    pub notifier: Arc<MockNotificationSender>,
    pub directory: Arc<MockUserDirectory>,
    pub store: Arc<InMemoryPendingStore>,
    pub jwt: Arc<JwtService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(true, None)
    }

    /// The no-cooldown policy variant.
    pub fn without_cooldown() -> Self {
        Self::build(false, None)
    }

    /// Deterministic code source cycling through `codes`.
    pub fn with_codes(codes: Vec<&str>) -> Self {
        Self::build(true, Some(SequenceCodeGenerator::new(codes)))
    }

    fn build(cooldown: bool, generator: Option<SequenceCodeGenerator>) -> Self {
        let notifier = Arc::new(MockNotificationSender::new());
        let directory = Arc::new(MockUserDirectory::new());
        let store = Arc::new(InMemoryPendingStore::new());
        let jwt = Arc::new(JwtService::new(
            "test_secret_key",
            "test_issuer".to_string(),
        ));

        let code_generator: Arc<dyn BaseCodeGenerator> = match generator {
            Some(seq) => Arc::new(seq),
            None => Arc::new(RandomCodeGenerator),
        };

        let deps = Arc::new(ServerDeps::new(
            directory.clone(),
            notifier.clone(),
            store.clone(),
            code_generator,
            Arc::new(Argon2PasswordHasher),
            jwt.clone(),
            cooldown,
        ));

        Self {
            registration: RegistrationService::new(deps.clone()),
            sessions: SessionService::new(deps),
            notifier,
            directory,
            store,
            jwt,
        }
    }
}

/// Happy-path registration payload used across the suites.
pub fn ann_payload() -> RegistrationPayload {
    RegistrationPayload {
        name: "Ann".to_string(),
        password: "secret1".to_string(),
        region: "PK".to_string(),
        phone: "+923001234567".to_string(),
    }
}
