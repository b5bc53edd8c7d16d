//! Auth domain - registration and credential sessions
//!
//! Responsibilities:
//! - Code-gated signup (pending registrations, issuance, verification)
//! - Password authentication with directory-managed lockout
//! - Session/JWT token management

pub mod errors;
pub mod jwt;
pub mod models;
pub mod otp;
pub mod registration;
pub mod session;

pub use errors::AuthError;
pub use jwt::{Claims, JwtService};
pub use otp::RandomCodeGenerator;
pub use registration::RegistrationService;
pub use session::{AuthSession, SessionService};
