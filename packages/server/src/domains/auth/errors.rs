use thiserror::Error;

use crate::kernel::{DeliveryError, DirectoryError};

/// Errors surfaced by the registration and session services.
///
/// These are modeled outcomes, not control-flow exceptions: each variant maps
/// to one stable message so transport adapters can render feedback without
/// parsing free text. Nothing here is retried internally.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Email address already registered")]
    Conflict,

    #[error("Not found")]
    NotFound,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please wait before requesting another code")]
    RateLimited,

    #[error("Account temporarily locked")]
    Locked,

    #[error("Could not deliver notification")]
    Delivery(#[from] DeliveryError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Conflict => AuthError::Conflict,
            DirectoryError::Storage(e) => AuthError::Internal(e),
        }
    }
}
