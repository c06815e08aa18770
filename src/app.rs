// Router assembly and OpenAPI document

use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{self, handlers, models, AuthService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_handler,
        handlers::login_handler,
        handlers::refresh_handler,
        handlers::verify_email_handler,
        handlers::resend_verification_handler,
        handlers::request_password_reset_handler,
        handlers::reset_password_handler,
        handlers::me_handler,
        handlers::update_me_handler,
        handlers::delete_me_handler,
    ),
    components(
        schemas(
            models::RegisterRequest,
            models::LoginRequest,
            models::RefreshRequest,
            models::VerifyEmailRequest,
            models::PasswordResetRequest,
            models::ResetPasswordRequest,
            models::ProfileUpdate,
            models::AccountResponse,
            models::TokenPair,
            models::AuthResponse,
            models::MessageResponse,
        )
    ),
    tags(
        (name = "auth", description = "Account registration, login and token lifecycle")
    ),
    info(
        title = "FindMe Auth API",
        version = "0.1.0",
        description = "Credential and token lifecycle service"
    )
)]
pub struct ApiDoc;

/// Handler for GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "findme-auth",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates and configures the application router
///
/// Every request runs under `request_timeout`; a request that exceeds it is
/// dropped, which cancels the in-flight service call.
pub fn create_router(service: Arc<AuthService>, request_timeout: Duration) -> Router {
    let tokens = service.token_service();

    let protected = Router::new()
        .route(
            "/me",
            get(handlers::me_handler)
                .patch(handlers::update_me_handler)
                .delete(handlers::delete_me_handler),
        )
        .route("/verify-email/resend", post(handlers::resend_verification_handler))
        .route_layer(middleware::from_fn_with_state(tokens, auth::require_auth));

    let public = Router::new()
        .route("/register", post(handlers::register_handler))
        .route("/login", post(handlers::login_handler))
        .route("/refresh", post(handlers::refresh_handler))
        .route("/verify-email", post(handlers::verify_email_handler))
        .route("/password-reset/request", post(handlers::request_password_reset_handler))
        .route("/password-reset/confirm", post(handlers::reset_password_handler));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api/v1/auth", public.merge(protected))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
