// Authentication service - business logic layer

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{
        normalize_email, AccountId, AccountResponse, AuthResponse, NewAccount, ProfileUpdate,
        RegisterRequest, TokenPair,
    },
    notifier::Notifier,
    opaque,
    password::PasswordService,
    repository::CredentialStore,
    token::TokenService,
};
use crate::validation::parse_birth_date;

/// Authentication service coordinating all auth operations
///
/// Holds no per-call state; share it behind an `Arc`.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    password_service: PasswordService,
    token_service: Arc<TokenService>,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        store: Arc<dyn CredentialStore>,
        password_service: PasswordService,
        token_service: Arc<TokenService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            password_service,
            token_service,
            notifier,
        }
    }

    /// Token service used by the authentication middleware
    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    /// Register a new account
    ///
    /// The email pre-check is only a fast path; the store's uniqueness
    /// constraint decides. The account and its first verification token
    /// are written in a single insert.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);

        match self.store.get_by_email(&email).await {
            Ok(_) => return Err(AuthError::EmailAlreadyRegistered),
            Err(AuthError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let date_of_birth = parse_birth_date(&request.date_of_birth).ok_or(AuthError::InvalidDateFormat)?;

        let password_hash = self
            .password_service
            .hash_password_blocking(request.password)
            .await?;

        let verification = opaque::issue(Utc::now(), opaque::verification_ttl())?;

        let account = self
            .store
            .create_account(NewAccount {
                email,
                password_hash,
                full_name: request.full_name,
                date_of_birth,
                gender: request.gender,
                bio: None,
                email_verification: Some(verification.pending),
            })
            .await?;

        info!(account_id = %account.id, "Account registered");

        if let Err(e) = self.notifier.send_verification(&account, &verification.raw) {
            warn!(account_id = %account.id, "Verification hand-off failed: {}", e);
        }

        let tokens = self.issue_pair(account.id, &account.email)?;
        Ok(AuthResponse {
            account: account.into(),
            tokens,
        })
    }

    /// Login with email and password
    ///
    /// A missing account and a wrong password produce the same error, and
    /// the missing path still pays for one hash verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let account = match self.store.get_by_email(email).await {
            Ok(account) => account,
            Err(AuthError::NotFound(_)) => {
                self.password_service
                    .verify_dummy_blocking(password.to_string())
                    .await;
                debug!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let matches = self
            .password_service
            .verify_password_blocking(password.to_string(), account.password_hash.clone())
            .await?;
        if !matches {
            debug!(account_id = %account.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !account.active {
            return Err(AuthError::AccountInactive);
        }

        if let Err(e) = self.store.mark_last_login(account.id).await {
            warn!(account_id = %account.id, "Failed to record last login: {}", e);
        }

        let tokens = self.issue_pair(account.id, &account.email)?;
        info!(account_id = %account.id, "Login succeeded");

        let mut response: AccountResponse = account.into();
        response.last_login_at = Some(Utc::now());
        Ok(AuthResponse {
            account: response,
            tokens,
        })
    }

    /// Issue a new access token from a refresh token
    ///
    /// The refresh token is not rotated and remains usable until it expires.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.token_service.validate_refresh_token(refresh_token)?;
        let access = self
            .token_service
            .generate_access_token(claims.sub, &claims.email)?;

        Ok(TokenPair::bearer(
            access.token,
            refresh_token.to_string(),
            access.expires_in,
        ))
    }

    /// Consume an email verification token
    pub async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        let consumed = self
            .store
            .consume_verification_token(&opaque::digest(token))
            .await?;

        match consumed {
            Some(account_id) => {
                info!(account_id = %account_id, "Email verified");
                Ok(())
            }
            None => Err(AuthError::InvalidOrExpiredToken),
        }
    }

    /// Issue a fresh verification token for an unverified account
    pub async fn resend_verification(&self, account_id: AccountId) -> Result<(), AuthError> {
        let account = self.store.get_by_id(account_id).await?;
        if account.verified {
            return Err(AuthError::Validation("Email is already verified".to_string()));
        }

        let verification = opaque::issue(Utc::now(), opaque::verification_ttl())?;
        self.store
            .set_verification_token(account.id, &verification.pending)
            .await?;

        if let Err(e) = self.notifier.send_verification(&account, &verification.raw) {
            warn!(account_id = %account.id, "Verification hand-off failed: {}", e);
        }
        Ok(())
    }

    /// Start a password reset
    ///
    /// Succeeds whether or not the email is registered. The miss path
    /// generates a token and touches the store like the hit path does.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let lookup = self.store.get_by_email(email).await;
        let reset = opaque::issue(Utc::now(), opaque::password_reset_ttl())?;

        let account = match lookup {
            Ok(account) => account,
            Err(AuthError::NotFound(_)) => {
                let _ = self
                    .store
                    .set_password_reset_token(Uuid::nil(), &reset.pending)
                    .await;
                debug!("Password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.store
            .set_password_reset_token(account.id, &reset.pending)
            .await?;

        if let Err(e) = self.notifier.send_password_reset(&account, &reset.raw) {
            warn!(account_id = %account.id, "Password reset hand-off failed: {}", e);
        }
        info!(account_id = %account.id, "Password reset requested");
        Ok(())
    }

    /// Replace the password using a reset token
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let new_hash = self
            .password_service
            .hash_password_blocking(new_password.to_string())
            .await?;

        let consumed = self
            .store
            .consume_password_reset_token(&opaque::digest(token), &new_hash)
            .await?;

        match consumed {
            Some(account_id) => {
                info!(account_id = %account_id, "Password reset completed");
                Ok(())
            }
            None => Err(AuthError::InvalidOrExpiredToken),
        }
    }

    /// Get current account information
    pub async fn current_account(&self, account_id: AccountId) -> Result<AccountResponse, AuthError> {
        Ok(self.store.get_by_id(account_id).await?.into())
    }

    /// Update profile fields of the current account
    pub async fn update_profile(
        &self,
        account_id: AccountId,
        update: ProfileUpdate,
    ) -> Result<AccountResponse, AuthError> {
        Ok(self.store.update_profile(account_id, update).await?.into())
    }

    /// Tombstone the current account
    pub async fn delete_account(&self, account_id: AccountId) -> Result<(), AuthError> {
        self.store.soft_delete(account_id).await?;
        info!(account_id = %account_id, "Account deleted");
        Ok(())
    }

    fn issue_pair(&self, account_id: AccountId, email: &str) -> Result<TokenPair, AuthError> {
        let access = self.token_service.generate_access_token(account_id, email)?;
        let refresh = self.token_service.generate_refresh_token(account_id, email)?;
        Ok(TokenPair::bearer(access.token, refresh.token, access.expires_in))
    }
}
