//! Credential session issuer.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domains::account::models::AccountProfile;
use crate::domains::auth::errors::AuthError;
use crate::kernel::ServerDeps;

/// A minted session: the public profile plus a signed bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub account: AccountProfile,
    pub token: String,
}

/// Validates credentials against the user directory and mints session
/// tokens. Lockout policy belongs to the directory; this service only
/// branches on it.
pub struct SessionService {
    deps: Arc<ServerDeps>,
}

impl SessionService {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }

    pub async fn authenticate(
        &self,
        email: &str,
        raw_password: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = email.trim();
        let directory = &self.deps.user_directory;

        let Some(account) = directory.find_by_email(email).await? else {
            debug!("Login attempt for unknown address: {}", email);
            return Err(AuthError::NotFound);
        };

        if directory.is_locked(&account) {
            info!("Login attempt for locked account {}", account.id);
            return Err(AuthError::Locked);
        }

        if !directory.verify_password(&account, raw_password).await? {
            directory.increment_failed_attempts(&account).await?;
            debug!("Wrong password for account {}", account.id);
            return Err(AuthError::InvalidCredentials);
        }

        directory.reset_failed_attempts(&account).await?;
        directory.record_login(&account).await?;

        let token = self
            .deps
            .jwt_service
            .create_token(account.id, account.email.clone())?;

        info!("Authenticated account {}", account.id);
        Ok(AuthSession {
            account: account.profile(),
            token,
        })
    }
}
