// Password hashing and verification service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;

use crate::auth::{error::AuthError, models::PasswordDigest};

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    /// OWASP baseline for Argon2id: 19 MiB, 2 iterations, 1 lane
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Password service for hashing and verification
///
/// Cheap to clone; the dummy hash is shared so miss paths in login can pay
/// the same verification cost as hits.
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
    dummy_hash: Arc<str>,
}

impl PasswordService {
    /// Create a PasswordService with the given Argon2id cost
    pub fn new(cost: HashCost) -> Result<Self, AuthError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AuthError::internal("configuring password hasher", e))?;

        let mut service = Self {
            params,
            dummy_hash: Arc::from(""),
        };
        let dummy = service.hash_password("findme-dummy-password")?;
        service.dummy_hash = Arc::from(dummy.expose());
        Ok(service)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id with a random salt
    ///
    /// Never rejects weak input; strength policy belongs to request validation.
    pub fn hash_password(&self, password: &str) -> Result<PasswordDigest, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::internal("hashing password", e))?;
        Ok(PasswordDigest::new(hash.to_string()))
    }

    /// Verify a password against a hash
    ///
    /// Returns `Ok(false)` on mismatch and an internal error when the stored
    /// hash is not a valid PHC string.
    pub fn verify_password(&self, password: &str, hash: &PasswordDigest) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash.expose())
            .map_err(|e| AuthError::internal("parsing stored password hash", e))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::internal("verifying password", e)),
        }
    }

    /// Spend one verification's worth of work against the dummy hash
    pub fn verify_dummy(&self, password: &str) {
        let dummy = PasswordDigest::new(self.dummy_hash.to_string());
        let _ = self.verify_password(password, &dummy);
    }

    /// Run `hash_password` on the blocking pool
    pub async fn hash_password_blocking(&self, password: String) -> Result<PasswordDigest, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AuthError::internal("joining password hash task", e))?
    }

    /// Run `verify_password` on the blocking pool
    pub async fn verify_password_blocking(
        &self,
        password: String,
        hash: PasswordDigest,
    ) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::internal("joining password verify task", e))?
    }

    /// Run `verify_dummy` on the blocking pool
    pub async fn verify_dummy_blocking(&self, password: String) {
        let hasher = self.clone();
        let _ = tokio::task::spawn_blocking(move || hasher.verify_dummy(&password)).await;
    }
}

#[cfg(test)]
pub(crate) fn test_password_service() -> PasswordService {
    PasswordService::new(HashCost {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test hash cost is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let service = test_password_service();
        let hash = service.hash_password("Password123!").unwrap();
        assert!(hash.expose().starts_with("$argon2id$"));
        assert!(service.verify_password("Password123!", &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let service = test_password_service();
        let hash = service.hash_password("Password123!").unwrap();
        assert!(!service.verify_password("password123!", &hash).unwrap());
        assert!(!service.verify_password("", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let service = test_password_service();
        let a = service.hash_password("same").unwrap();
        let b = service.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn weak_input_is_still_hashed() {
        let service = test_password_service();
        assert!(service.hash_password("").is_ok());
        assert!(service.hash_password("a").is_ok());
    }

    #[test]
    fn structurally_invalid_hash_is_internal_error() {
        let service = test_password_service();
        let garbage = PasswordDigest::new("not-a-phc-string".to_string());
        let result = service.verify_password("anything", &garbage);
        assert!(matches!(result, Err(AuthError::Internal { .. })));
    }

    #[test]
    fn cost_is_configurable() {
        let service = test_password_service();
        let hash = service.hash_password("pw").unwrap();
        assert!(hash.expose().contains("m=64,t=1,p=1"));
    }

    #[test]
    fn invalid_cost_is_rejected() {
        let result = PasswordService::new(HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers() {
        let service = test_password_service();
        let hash = service
            .hash_password_blocking("Password123!".to_string())
            .await
            .unwrap();
        assert!(service
            .verify_password_blocking("Password123!".to_string(), hash)
            .await
            .unwrap());
        service.verify_dummy_blocking("whatever".to_string()).await;
    }
}
