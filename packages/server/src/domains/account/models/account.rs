use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account model - SQL persistence layer
///
/// The credential hash and lockout counters never leave this module except
/// through `AccountProfile`.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub region: String,
    pub phone: String,
    pub email_verified: bool,

    // Lockout state
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,

    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Non-secret fields for account creation.
#[derive(Debug, Clone)]
pub struct NewAccountProfile {
    pub name: String,
    pub region: String,
    pub phone: String,
}

/// Public view of an account: everything a client may see. Excludes the
/// credential hash and lockout counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub region: String,
    pub phone: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            region: self.region.clone(),
            phone: self.phone.clone(),
            email_verified: self.email_verified,
            created_at: self.created_at,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| until > Utc::now())
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Account {
    /// Find account by email
    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new, already-verified account
    ///
    /// Returns the raw sqlx error so callers can detect the unique-email
    /// violation (code 23505).
    pub async fn insert(
        email: &str,
        password_hash: &str,
        profile: &NewAccountProfile,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, password_hash, name, region, phone, email_verified)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(&profile.name)
        .bind(&profile.region)
        .bind(&profile.phone)
        .fetch_one(pool)
        .await
    }

    /// Overwrite the lockout counters
    pub async fn set_failed_attempts(
        id: Uuid,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
        pool: &PgPool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET failed_login_attempts = $2, locked_until = $3 WHERE id = $1")
            .bind(id)
            .bind(attempts)
            .bind(locked_until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Stamp a successful login
    pub async fn record_login(id: Uuid, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET last_login_at = now() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
