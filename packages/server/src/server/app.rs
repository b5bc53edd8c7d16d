//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use mailer::{MailerOptions, MailerService};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::account::{Argon2PasswordHasher, LockoutPolicy, PgUserDirectory};
use crate::domains::auth::{JwtService, RandomCodeGenerator, RegistrationService, SessionService};
use crate::kernel::{
    BasePasswordHasher, BaseUserDirectory, InMemoryPendingStore, MailerAdapter, ServerDeps,
};
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    health_handler, login_handler, register_handler, resend_code_handler, verify_code_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
    pub registration: Arc<RegistrationService>,
    pub sessions: Arc<SessionService>,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application router
///
/// Wires the production collaborators (Postgres directory, Brevo mailer,
/// in-process pending store) into the domain services and mounts the thin
/// route adapters over them.
pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let mailer = Arc::new(MailerService::new(MailerOptions {
        api_key: config.brevo_api_key.clone(),
        sender_email: config.brevo_sender_email.clone(),
        sender_name: config.brevo_sender_name.clone(),
    }));

    let password_hasher: Arc<dyn BasePasswordHasher> = Arc::new(Argon2PasswordHasher);
    let user_directory: Arc<dyn BaseUserDirectory> = Arc::new(PgUserDirectory::new(
        pool.clone(),
        password_hasher.clone(),
        LockoutPolicy::default(),
    ));

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
    ));

    let deps = Arc::new(ServerDeps::new(
        user_directory,
        Arc::new(MailerAdapter::new(mailer)),
        Arc::new(InMemoryPendingStore::new()),
        Arc::new(RandomCodeGenerator),
        password_hasher,
        jwt_service.clone(),
        config.resend_cooldown_enabled,
    ));

    let app_state = AppState {
        db_pool: pool,
        registration: Arc::new(RegistrationService::new(deps.clone())),
        sessions: Arc::new(SessionService::new(deps.clone())),
        jwt_service: jwt_service.clone(),
        deps,
    };

    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Rate limiting on the auth endpoints: 10/sec with burst of 20 per IP.
    // The code endpoints are the abuse magnet, so the limit sits on this
    // sub-router rather than the whole app.
    let rate_limit_config = std::sync::Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers()
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );
    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let auth_routes = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/resend-code", post(resend_code_handler))
        .route("/auth/verify", post(verify_code_handler))
        .route("/auth/login", post(login_handler))
        .layer(rate_limit_layer);

    // Clone jwt_service for middleware closure
    let jwt_service_for_middleware = jwt_service;

    Router::new()
        .merge(auth_routes)
        // Health check (no rate limit)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
