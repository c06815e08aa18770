// Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Authentication error types
///
/// Variants are deliberately coarse towards the client: every bearer-token
/// failure renders as the same 401 body, and every single-use token failure
/// renders as `InvalidOrExpiredToken`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Invalid date format, expected YYYY-MM-DD")]
    InvalidDateFormat,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    /// Single-use token never existed, was already consumed, or expired
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// A refresh token was presented where an access token is required, or vice versa
    #[error("Invalid token type")]
    InvalidTokenType,

    #[error("Malformed token")]
    TokenMalformed,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    TokenBadSignature,

    #[error("Unexpected token signing algorithm")]
    UnexpectedAlgorithm,

    /// Missing or malformed Authorization header
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Store, hashing, or signing failure, with operation context
    #[error("Internal error while {context}: {message}")]
    Internal {
        context: &'static str,
        message: String,
    },
}

impl AuthError {
    /// Wrap a lower-level failure with the operation it interrupted
    pub fn internal(context: &'static str, err: impl std::fmt::Display) -> Self {
        AuthError::Internal {
            context,
            message: err.to_string(),
        }
    }

    /// Whether this error is one of the bearer-token validation failures
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            AuthError::TokenMalformed
                | AuthError::TokenExpired
                | AuthError::TokenBadSignature
                | AuthError::UnexpectedAlgorithm
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::InvalidDateFormat => StatusCode::BAD_REQUEST,
            AuthError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            AuthError::EmailAlreadyRegistered => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::InvalidTokenType => StatusCode::UNAUTHORIZED,
            AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenBadSignature
            | AuthError::UnexpectedAlgorithm
            | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::AccountInactive => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code sent to clients
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            AuthError::InvalidDateFormat => "INVALID_DATE_FORMAT",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountInactive => "ACCOUNT_INACTIVE",
            AuthError::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            AuthError::InvalidTokenType => "INVALID_TOKEN_TYPE",
            AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenBadSignature
            | AuthError::UnexpectedAlgorithm
            | AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Get a descriptive error message for this error
    /// This message is safe to send to clients (no sensitive data)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenBadSignature
            | AuthError::UnexpectedAlgorithm
            | AuthError::Unauthorized(_) => "Unauthorized".to_string(),
            AuthError::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Internal { .. } => error!("{}", self),
            AuthError::Unauthorized(reason) => warn!("Rejected request: {}", reason),
            err if err.is_token_failure() => warn!("Rejected bearer token: {}", err),
            AuthError::InvalidCredentials | AuthError::InvalidTokenType => {
                warn!("Authentication failed: {}", self)
            }
            _ => debug!("Auth request failed: {}", self),
        }

        let body = Json(json!({
            "error": self.error_message(),
            "code": self.error_code(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{}: {}", field, reasons.join(", "))
            })
            .collect();
        fields.sort();
        AuthError::Validation(fields.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_share_one_client_shape() {
        let errors = [
            AuthError::TokenMalformed,
            AuthError::TokenExpired,
            AuthError::TokenBadSignature,
            AuthError::UnexpectedAlgorithm,
            AuthError::Unauthorized("missing authorization header"),
        ];

        for err in errors {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.error_code(), "UNAUTHORIZED");
            assert_eq!(err.error_message(), "Unauthorized");
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AuthError::internal("creating account", "connection reset by peer");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_message(), "Internal server error");
        assert!(err.to_string().contains("creating account"));
    }

    #[test]
    fn status_codes() {
        assert_eq!(AuthError::EmailAlreadyRegistered.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::AccountInactive.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::InvalidOrExpiredToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
    }
}
