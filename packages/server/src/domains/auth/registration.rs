//! Registration state machine.
//!
//! Lifecycle per address: no entry -> pending (code issued) -> verified
//! (account created, entry removed). Expiry drops a pending entry back to
//! "no entry" lazily at read time; there is no sweeper.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domains::auth::errors::AuthError;
use crate::domains::auth::models::{PendingRegistration, RegistrationPayload, CODE_TTL_MINUTES};
use crate::domains::auth::session::AuthSession;
use crate::kernel::{NotificationKind, ServerDeps};

/// Owns the pending-registration lifecycle. The two transport call sites
/// (registration endpoint and code endpoint) are thin adapters over this one
/// service.
pub struct RegistrationService {
    deps: Arc<ServerDeps>,
}

impl RegistrationService {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }

    /// Start a registration: validate, issue a code, deliver it.
    ///
    /// Overwrites any existing pending entry for the address (the old code
    /// stops verifying). Nothing is persisted until the code is verified.
    pub async fn request_registration(
        &self,
        email: &str,
        payload: RegistrationPayload,
    ) -> Result<(), AuthError> {
        let email = email.trim();
        payload.validate(email)?;

        if self
            .deps
            .user_directory
            .find_by_email(email)
            .await?
            .is_some()
        {
            debug!("Registration requested for taken address: {}", email);
            return Err(AuthError::Conflict);
        }

        let code = self.deps.code_generator.generate();
        let entry = PendingRegistration::new(email.to_string(), code.clone(), payload);
        self.deps.pending_store.put(entry).await;

        if let Err(e) = self
            .deps
            .notifier
            .send(email, NotificationKind::Otp, otp_data(&code))
            .await
        {
            // Roll back so the address is not left pending a code that never
            // went out.
            self.deps.pending_store.remove(email).await;
            error!("Failed to deliver verification code to {}: {}", email, e);
            return Err(AuthError::Delivery(e));
        }

        info!("Verification code sent to {}", email);
        Ok(())
    }

    /// Re-issue the code for an unexpired pending registration.
    ///
    /// Draws a fresh code and restarts the 10-minute window; the payload is
    /// untouched. Subject to a 60-second cooldown when the policy is on; a
    /// cooldown rejection leaves the stored code as it was.
    pub async fn resend_code(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        let Some(mut entry) = self.deps.pending_store.get(email).await else {
            return Err(AuthError::NotFound);
        };

        if self.deps.resend_cooldown_enabled && entry.in_resend_cooldown() {
            debug!("Resend for {} rejected by cooldown", email);
            return Err(AuthError::RateLimited);
        }

        entry.refresh(self.deps.code_generator.generate());
        let code = entry.code.clone();
        self.deps.pending_store.put(entry).await;

        // No rollback here: unlike the initial issuance the address is not
        // stuck on failure, a later resend can still go out.
        self.deps
            .notifier
            .send(email, NotificationKind::Otp, otp_data(&code))
            .await?;

        info!("Verification code re-sent to {}", email);
        Ok(())
    }

    /// Verify a submitted code and promote the pending registration to a
    /// persisted account.
    ///
    /// The pending entry is removed before the account is created, so a
    /// racing duplicate submission observes not-found instead of creating a
    /// second account. A lazily-expired entry is also not-found.
    pub async fn verify_code(&self, email: &str, submitted: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim();
        let submitted = submitted.trim();

        let Some(entry) = self.deps.pending_store.get(email).await else {
            return Err(AuthError::NotFound);
        };

        if entry.code != submitted {
            debug!("Wrong verification code submitted for {}", email);
            return Err(AuthError::InvalidCode);
        }

        let password_hash = self
            .deps
            .password_hasher
            .hash(&entry.payload.password)
            .await?;
        self.deps.pending_store.remove(email).await;

        let account = self
            .deps
            .user_directory
            .create(email, &password_hash, entry.payload.profile())
            .await?;

        let token = self
            .deps
            .jwt_service
            .create_token(account.id, account.email.clone())?;

        // Welcome notice is non-critical: fire-and-forget after the account
        // exists, failure is logged and swallowed.
        let notifier = self.deps.notifier.clone();
        let to = account.email.clone();
        let name = account.name.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier
                .send(&to, NotificationKind::Welcome, json!({ "name": name }))
                .await
            {
                warn!("Failed to send welcome notice to {}: {}", to, e);
            }
        });

        info!("Registration verified for {} (account {})", email, account.id);
        Ok(AuthSession {
            account: account.profile(),
            token,
        })
    }
}

fn otp_data(code: &str) -> serde_json::Value {
    json!({ "code": code, "expires_minutes": CODE_TTL_MINUTES })
}
