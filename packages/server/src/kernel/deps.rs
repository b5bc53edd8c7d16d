//! Server dependencies for domain services (using traits for testability)
//!
//! This module provides the central dependency container used by the auth
//! domain services. All external collaborators use trait abstractions to
//! enable testing.

use async_trait::async_trait;
use mailer::MailerService;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::{
    BaseCodeGenerator, BaseNotificationSender, BasePasswordHasher, BasePendingStore,
    BaseUserDirectory, DeliveryError, NotificationKind,
};

// =============================================================================
// MailerService Adapter (implements BaseNotificationSender trait)
// =============================================================================

/// Wrapper around MailerService that implements BaseNotificationSender,
/// rendering the e-mail template for each notification kind.
pub struct MailerAdapter(pub Arc<MailerService>);

impl MailerAdapter {
    pub fn new(service: Arc<MailerService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseNotificationSender for MailerAdapter {
    async fn send(
        &self,
        address: &str,
        kind: NotificationKind,
        data: serde_json::Value,
    ) -> Result<(), DeliveryError> {
        let (subject, html) = render_template(kind, &data);
        self.0
            .send_email(address, &subject, Some(html), None)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError(e.to_string()))
    }
}

/// Render (subject, html body) for a notification kind.
///
/// Templates are deliberately small; marketing-grade layouts belong to the
/// campaign tooling, not the API.
fn render_template(kind: NotificationKind, data: &serde_json::Value) -> (String, String) {
    match kind {
        NotificationKind::Otp => (
            "Your Northwind verification code".to_string(),
            format!(
                "<p>Your verification code is <strong>{}</strong>.</p>\
                 <p>It expires in {} minutes. If you did not request it, ignore this e-mail.</p>",
                data["code"].as_str().unwrap_or_default(),
                data["expires_minutes"].as_i64().unwrap_or(10),
            ),
        ),
        NotificationKind::Welcome => (
            "Welcome to Northwind".to_string(),
            format!(
                "<p>Hi {},</p><p>Your Northwind account is ready. Happy shopping!</p>",
                data["name"].as_str().unwrap_or("there"),
            ),
        ),
        NotificationKind::SecurityAlert => (
            "Security alert for your Northwind account".to_string(),
            format!(
                "<p>We noticed unusual activity on your account: {}.</p>\
                 <p>If this was not you, reset your password immediately.</p>",
                data["detail"].as_str().unwrap_or("a sign-in from a new device"),
            ),
        ),
        NotificationKind::PasswordReset => (
            "Reset your Northwind password".to_string(),
            format!(
                "<p>Use this link to reset your password: <a href=\"{0}\">{0}</a></p>",
                data["link"].as_str().unwrap_or_default(),
            ),
        ),
        NotificationKind::OrderConfirmation => (
            "Your Northwind order confirmation".to_string(),
            format!(
                "<p>Thanks for your order <strong>{}</strong>! We'll let you know when it ships.</p>",
                data["order_id"].as_str().unwrap_or_default(),
            ),
        ),
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to domain services (using traits for
/// testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub user_directory: Arc<dyn BaseUserDirectory>,
    pub notifier: Arc<dyn BaseNotificationSender>,
    pub pending_store: Arc<dyn BasePendingStore>,
    pub code_generator: Arc<dyn BaseCodeGenerator>,
    pub password_hasher: Arc<dyn BasePasswordHasher>,
    /// JWT service for token creation
    pub jwt_service: Arc<JwtService>,
    /// Enforce the 60-second cooldown between code resends.
    ///
    /// Policy knob rather than hard-coded behavior: storefronts behind an
    /// aggressive gateway rate limit run with this off.
    pub resend_cooldown_enabled: bool,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        user_directory: Arc<dyn BaseUserDirectory>,
        notifier: Arc<dyn BaseNotificationSender>,
        pending_store: Arc<dyn BasePendingStore>,
        code_generator: Arc<dyn BaseCodeGenerator>,
        password_hasher: Arc<dyn BasePasswordHasher>,
        jwt_service: Arc<JwtService>,
        resend_cooldown_enabled: bool,
    ) -> Self {
        Self {
            user_directory,
            notifier,
            pending_store,
            code_generator,
            password_hasher,
            jwt_service,
            resend_cooldown_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_template_includes_code() {
        let (subject, html) = render_template(
            NotificationKind::Otp,
            &serde_json::json!({"code": "042137", "expires_minutes": 10}),
        );
        assert!(subject.contains("verification code"));
        assert!(html.contains("042137"));
        assert!(html.contains("10 minutes"));
    }

    #[test]
    fn test_welcome_template_uses_name() {
        let (_, html) =
            render_template(NotificationKind::Welcome, &serde_json::json!({"name": "Ann"}));
        assert!(html.contains("Hi Ann"));
    }

    #[test]
    fn test_each_kind_has_distinct_subject() {
        let kinds = [
            NotificationKind::Otp,
            NotificationKind::Welcome,
            NotificationKind::SecurityAlert,
            NotificationKind::PasswordReset,
            NotificationKind::OrderConfirmation,
        ];
        let subjects: Vec<String> = kinds
            .iter()
            .map(|k| render_template(*k, &serde_json::json!({})).0)
            .collect();
        for (i, a) in subjects.iter().enumerate() {
            for b in subjects.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
