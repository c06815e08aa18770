// HTTP handlers for authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedAccount,
    models::{
        AccountResponse, AuthResponse, LoginRequest, MessageResponse, PasswordResetRequest,
        ProfileUpdate, RefreshRequest, RegisterRequest, ResetPasswordRequest, TokenPair,
        VerifyEmailRequest,
    },
    service::AuthService,
};

/// Register a new account
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or date format"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    request.validate()?;
    let response = service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account is inactive")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request.validate()?;
    let response = service.login(&request.email, &request.password).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
/// POST /api/v1/auth/refresh
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenPair),
        (status = 401, description = "Invalid refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let tokens = service.refresh_access_token(&request.refresh_token).await?;
    Ok(Json(tokens))
}

/// Consume an email verification token
/// POST /api/v1/auth/verify-email
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired token")
    ),
    tag = "auth"
)]
pub async fn verify_email_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    service.verify_email(&request.token).await?;
    Ok(Json(MessageResponse::new("Email verified")))
}

/// Send a new verification token to the current account
/// POST /api/v1/auth/verify-email/resend
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-email/resend",
    responses(
        (status = 202, description = "Verification message queued", body = MessageResponse),
        (status = 400, description = "Email already verified"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth"
)]
pub async fn resend_verification_handler(
    State(service): State<Arc<AuthService>>,
    account: AuthenticatedAccount,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    service.resend_verification(account.account_id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Verification email sent")),
    ))
}

/// Request a password reset
/// POST /api/v1/auth/password-reset/request
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/request",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Accepted whether or not the email is registered", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn request_password_reset_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    request.validate()?;
    service.request_password_reset(&request.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(
            "If the email is registered, a password reset link has been sent",
        )),
    ))
}

/// Reset the password with a reset token
/// POST /api/v1/auth/password-reset/confirm
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/confirm",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or expired token")
    ),
    tag = "auth"
)]
pub async fn reset_password_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    request.validate()?;
    service
        .reset_password(&request.token, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// Get current account information (protected endpoint)
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth"
)]
pub async fn me_handler(
    State(service): State<Arc<AuthService>>,
    account: AuthenticatedAccount,
) -> Result<Json<AccountResponse>, AuthError> {
    let current = service.current_account(account.account_id).await?;
    Ok(Json(current))
}

/// Update profile fields of the current account
/// PATCH /api/v1/auth/me
#[utoipa::path(
    patch,
    path = "/api/v1/auth/me",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth"
)]
pub async fn update_me_handler(
    State(service): State<Arc<AuthService>>,
    account: AuthenticatedAccount,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<AccountResponse>, AuthError> {
    update.validate()?;
    let updated = service.update_profile(account.account_id, update).await?;
    Ok(Json(updated))
}

/// Soft-delete the current account
/// DELETE /api/v1/auth/me
#[utoipa::path(
    delete,
    path = "/api/v1/auth/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth"
)]
pub async fn delete_me_handler(
    State(service): State<Arc<AuthService>>,
    account: AuthenticatedAccount,
) -> Result<StatusCode, AuthError> {
    service.delete_account(account.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
