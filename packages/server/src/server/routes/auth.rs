//! Auth endpoints: thin adapters translating JSON requests into the four
//! core operations. All business rules live in the domain services.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::auth::models::RegistrationPayload;
use crate::domains::auth::{AuthError, AuthSession};
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub region: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub email: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCode => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Locked => StatusCode::LOCKED,
            AuthError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the logs
        let message = match &self {
            AuthError::Internal(e) => {
                tracing::error!("Internal error serving auth request: {:#}", e);
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// POST /auth/register
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AuthError> {
    let payload = RegistrationPayload {
        name: req.name,
        password: req.password,
        region: req.region,
        phone: req.phone,
    };
    state
        .registration
        .request_registration(&req.email, payload)
        .await?;

    Ok(Json(RegisterResponse {
        email: req.email.trim().to_string(),
    }))
}

/// POST /auth/resend-code
pub async fn resend_code_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<ResendCodeRequest>,
) -> Result<StatusCode, AuthError> {
    state.registration.resend_code(&req.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/verify
pub async fn verify_code_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<AuthSession>, AuthError> {
    let session = state.registration.verify_code(&req.email, &req.code).await?;
    Ok(Json(session))
}

/// POST /auth/login
///
/// Unknown address and wrong password produce the same external signal, so
/// account existence is not probeable through this endpoint.
pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthSession>, AuthError> {
    match state.sessions.authenticate(&req.email, &req.password).await {
        Ok(session) => Ok(Json(session)),
        Err(AuthError::NotFound) => Err(AuthError::InvalidCredentials),
        Err(e) => Err(e),
    }
}
