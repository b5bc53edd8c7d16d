use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::domains::account::models::NewAccountProfile;
use crate::domains::auth::errors::AuthError;

/// Verification-code lifetime, from issuance or re-issuance.
pub const CODE_TTL_MINUTES: i64 = 10;

/// Minimum gap between code resends (when the cooldown policy is on).
pub const RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Registration fields held until the address is verified.
///
/// Carries the raw password for the lifetime of the code window only; it is
/// hashed at promotion time and never persisted.
#[derive(Clone)]
pub struct RegistrationPayload {
    pub name: String,
    pub password: String,
    pub region: String,
    pub phone: String,
}

impl RegistrationPayload {
    /// Field-presence and shape validation for a registration request.
    pub fn validate(&self, email: &str) -> Result<(), AuthError> {
        if !is_valid_email(email) {
            return Err(AuthError::Validation(
                "a valid email address is required".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(AuthError::Validation("name is required".to_string()));
        }
        if self.password.len() < 6 {
            return Err(AuthError::Validation(
                "password must be at least 6 characters".to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(AuthError::Validation("region is required".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(AuthError::Validation("phone is required".to_string()));
        }
        Ok(())
    }

    /// The non-secret fields, in the shape the user directory expects.
    pub fn profile(&self) -> NewAccountProfile {
        NewAccountProfile {
            name: self.name.clone(),
            region: self.region.clone(),
            phone: self.phone.clone(),
        }
    }
}

impl fmt::Debug for RegistrationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationPayload")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("region", &self.region)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Basic e-mail shape check: `local@domain.tld`. Full RFC validation belongs
/// to the delivery provider, which bounces anything undeliverable.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Transient record linking an unverified address to its active code and
/// not-yet-persisted account data. At most one exists per address; a new
/// issuance overwrites the old entry wholesale.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub email: String,
    pub code: String,
    pub payload: RegistrationPayload,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set on the first resend; `None` straight after issuance, so the first
    /// resend is never cooldown-gated.
    pub last_resend_at: Option<DateTime<Utc>>,
}

impl PendingRegistration {
    pub fn new(email: String, code: String, payload: RegistrationPayload) -> Self {
        let now = Utc::now();
        Self {
            email,
            code,
            payload,
            issued_at: now,
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
            last_resend_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Whether a resend must still wait out the cooldown window.
    pub fn in_resend_cooldown(&self) -> bool {
        self.last_resend_at
            .is_some_and(|last| Utc::now() - last < Duration::seconds(RESEND_COOLDOWN_SECONDS))
    }

    /// Replace the code and restart the expiry window. The payload is
    /// untouched.
    pub fn refresh(&mut self, code: String) {
        let now = Utc::now();
        self.code = code;
        self.expires_at = now + Duration::minutes(CODE_TTL_MINUTES);
        self.last_resend_at = Some(now);
    }
}
