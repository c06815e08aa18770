// Single-use opaque tokens for email verification and password reset

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::auth::{error::AuthError, models::PendingToken};

/// Raw token entropy in bytes (256 bits)
pub const TOKEN_BYTES: usize = 32;

/// Email verification token lifetime
pub fn verification_ttl() -> Duration {
    Duration::hours(24)
}

/// Password reset token lifetime
pub fn password_reset_ttl() -> Duration {
    Duration::hours(1)
}

/// A raw token for the notifier and the digest the store keeps
#[derive(Debug, Clone)]
pub struct OpaqueToken {
    pub raw: String,
    pub pending: PendingToken,
}

/// Generate a hex-encoded random token from the OS CSPRNG
pub fn generate_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::internal("generating single-use token", e))?;
    Ok(hex::encode(bytes))
}

/// Hash a token using SHA-256
pub fn digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a token and its pending record expiring after `ttl`
pub fn issue(now: DateTime<Utc>, ttl: Duration) -> Result<OpaqueToken, AuthError> {
    let raw = generate_token()?;
    let pending = PendingToken::new(digest(&raw), now + ttl);
    Ok(OpaqueToken { raw, pending })
}
