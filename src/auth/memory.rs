// In-memory credential store for tests and local development

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{normalize_email, Account, AccountId, NewAccount, PasswordDigest, PendingToken, ProfileUpdate},
    repository::CredentialStore,
};

#[derive(Default)]
struct Accounts {
    by_id: HashMap<AccountId, Account>,
}

impl Accounts {
    fn live(&self, id: AccountId) -> Option<&Account> {
        self.by_id.get(&id).filter(|a| a.deleted_at.is_none())
    }

    fn live_mut(&mut self, id: AccountId) -> Option<&mut Account> {
        self.by_id.get_mut(&id).filter(|a| a.deleted_at.is_none())
    }

    fn email_taken(&self, email: &str) -> bool {
        self.by_id
            .values()
            .any(|a| a.deleted_at.is_none() && a.email == email)
    }
}

/// Credential store backed by a mutex-guarded map
///
/// Every operation, including both consume paths, runs inside one critical
/// section without awaiting, so concurrent consumers are serialized and a
/// dropped future never observes a half-applied update.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: Mutex<Accounts>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the `active` flag; used by administrative tooling and tests
    pub async fn set_active(&self, id: AccountId, active: bool) -> Result<(), AuthError> {
        let mut accounts = self.inner.lock().await;
        let account = accounts.live_mut(id).ok_or(AuthError::NotFound("Account"))?;
        account.active = active;
        account.updated_at = Utc::now();
        Ok(())
    }

    /// Look up an account including tombstoned ones
    pub async fn get_including_deleted(&self, id: AccountId) -> Option<Account> {
        self.inner.lock().await.by_id.get(&id).cloned()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, AuthError> {
        let email = normalize_email(&account.email);
        let mut accounts = self.inner.lock().await;

        if accounts.email_taken(&email) {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let now = Utc::now();
        let record = Account {
            id: Uuid::new_v4(),
            email,
            password_hash: account.password_hash,
            full_name: account.full_name,
            date_of_birth: account.date_of_birth,
            gender: account.gender,
            bio: account.bio,
            verified: false,
            active: true,
            email_verification: account.email_verification,
            password_reset: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        accounts.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Account, AuthError> {
        self.inner
            .lock()
            .await
            .live(id)
            .cloned()
            .ok_or(AuthError::NotFound("Account"))
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, AuthError> {
        let email = normalize_email(email);
        self.inner
            .lock()
            .await
            .by_id
            .values()
            .find(|a| a.deleted_at.is_none() && a.email == email)
            .cloned()
            .ok_or(AuthError::NotFound("Account"))
    }

    async fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> Result<Account, AuthError> {
        let mut accounts = self.inner.lock().await;
        let account = accounts.live_mut(id).ok_or(AuthError::NotFound("Account"))?;
        if let Some(full_name) = update.full_name {
            account.full_name = full_name;
        }
        if let Some(bio) = update.bio {
            account.bio = Some(bio);
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn mark_last_login(&self, id: AccountId) -> Result<(), AuthError> {
        let mut accounts = self.inner.lock().await;
        if let Some(account) = accounts.live_mut(id) {
            account.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_verification_token(&self, id: AccountId, token: &PendingToken) -> Result<(), AuthError> {
        let mut accounts = self.inner.lock().await;
        let account = accounts.live_mut(id).ok_or(AuthError::NotFound("Account"))?;
        account.email_verification = Some(token.clone());
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn consume_verification_token(&self, digest: &str) -> Result<Option<AccountId>, AuthError> {
        let now = Utc::now();
        let mut accounts = self.inner.lock().await;

        let account = accounts.by_id.values_mut().find(|a| {
            a.deleted_at.is_none()
                && a.email_verification
                    .as_ref()
                    .map(|t| t.digest == digest && t.is_live(now))
                    .unwrap_or(false)
        });

        Ok(account.map(|a| {
            a.verified = true;
            a.email_verification = None;
            a.updated_at = now;
            a.id
        }))
    }

    async fn set_password_reset_token(&self, id: AccountId, token: &PendingToken) -> Result<(), AuthError> {
        let mut accounts = self.inner.lock().await;
        let account = accounts.live_mut(id).ok_or(AuthError::NotFound("Account"))?;
        account.password_reset = Some(token.clone());
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn consume_password_reset_token(
        &self,
        digest: &str,
        new_hash: &PasswordDigest,
    ) -> Result<Option<AccountId>, AuthError> {
        let now = Utc::now();
        let mut accounts = self.inner.lock().await;

        let account = accounts.by_id.values_mut().find(|a| {
            a.deleted_at.is_none()
                && a.password_reset
                    .as_ref()
                    .map(|t| t.digest == digest && t.is_live(now))
                    .unwrap_or(false)
        });

        Ok(account.map(|a| {
            a.password_hash = new_hash.clone();
            a.password_reset = None;
            a.updated_at = now;
            a.id
        }))
    }

    async fn soft_delete(&self, id: AccountId) -> Result<(), AuthError> {
        let mut accounts = self.inner.lock().await;
        let account = accounts.live_mut(id).ok_or(AuthError::NotFound("Account"))?;
        account.deleted_at = Some(Utc::now());
        Ok(())
    }
}
