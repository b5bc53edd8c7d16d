//! Account domain - persisted customer identities.
//!
//! The user directory is the system of record for accounts: credential
//! hashes, the verification flag, and lockout counters all live here.

pub mod directory;
pub mod models;
pub mod password;

pub use directory::{LockoutPolicy, PgUserDirectory};
pub use models::{Account, AccountProfile, NewAccountProfile};
pub use password::Argon2PasswordHasher;
