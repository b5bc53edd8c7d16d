use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub brevo_api_key: String,
    pub brevo_sender_email: String,
    pub brevo_sender_name: Option<String>,
    /// Enforce the 60-second cooldown between verification-code resends.
    pub resend_cooldown_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "northwind-api".to_string()),
            brevo_api_key: env::var("BREVO_API_KEY").context("BREVO_API_KEY must be set")?,
            brevo_sender_email: env::var("BREVO_SENDER_EMAIL")
                .context("BREVO_SENDER_EMAIL must be set")?,
            brevo_sender_name: env::var("BREVO_SENDER_NAME").ok(),
            resend_cooldown_enabled: env::var("RESEND_COOLDOWN_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("RESEND_COOLDOWN_ENABLED must be true or false")?,
        })
    }
}
