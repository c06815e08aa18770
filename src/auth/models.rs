// Authentication data models and DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_gender;

/// Account identifier
pub type AccountId = Uuid;

/// Opaque password hash (PHC string)
///
/// Never serialized and redacted from `Debug`, so it cannot leak through
/// responses or logs once written.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn new(phc: String) -> Self {
        Self(phc)
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest([redacted])")
    }
}

/// Outstanding single-use token: digest and expiry always travel together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToken {
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingToken {
    pub fn new(digest: String, expires_at: DateTime<Utc>) -> Self {
        Self { digest, expires_at }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Pair two nullable columns; a half-set pair is treated as no token
    pub fn from_columns(digest: Option<String>, expires_at: Option<DateTime<Utc>>) -> Option<Self> {
        match (digest, expires_at) {
            (Some(digest), Some(expires_at)) => Some(Self { digest, expires_at }),
            _ => None,
        }
    }
}

/// Account record
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password_hash: PasswordDigest,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub bio: Option<String>,
    pub verified: bool,
    pub active: bool,
    pub email_verification: Option<PendingToken>,
    pub password_reset: Option<PendingToken>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Whether a live password reset token is outstanding
    pub fn reset_pending(&self, now: DateTime<Utc>) -> bool {
        self.password_reset
            .as_ref()
            .map(|t| t.is_live(now))
            .unwrap_or(false)
    }
}

/// Record handed to the store when creating an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: PasswordDigest,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub bio: Option<String>,
    /// First verification token, written in the same insert as the account
    pub email_verification: Option<PendingToken>,
}

/// Profile fields a user may change after registration
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, max = 255))]
    pub full_name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
}

/// Trim and lower-case an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account response model (excludes password hash and token state)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub verified: bool,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            full_name: account.full_name,
            date_of_birth: account.date_of_birth,
            gender: account.gender,
            bio: account.bio,
            verified: account.verified,
            active: account.active,
            last_login_at: account.last_login_at,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Registration request DTO
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, max = 255))]
    pub full_name: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    #[validate(custom = "validate_gender")]
    pub gender: String,
}

/// Login request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Token refresh request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub new_password: String,
}

/// Access + refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub token_type: String,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Authentication response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub tokens: TokenPair,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
