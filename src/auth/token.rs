// JWT token generation and validation service

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::auth::{error::AuthError, models::AccountId};

/// The only signing algorithm accepted in a token header
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: AccountId,
    pub email: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token and its lifetime in seconds
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Token service for JWT operations
///
/// Keys are derived once from the process-scoped secret; there is no
/// runtime rotation.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_duration: i64,  // in seconds
    refresh_token_duration: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService with secret key
    /// Access tokens expire in 15 minutes (900 seconds)
    /// Refresh tokens expire in 7 days (604800 seconds)
    pub fn new(secret: &str) -> Self {
        Self::with_lifetimes(secret, 900, 604_800)
    }

    /// Create a TokenService with explicit lifetimes in seconds
    pub fn with_lifetimes(secret: &str, access_seconds: i64, refresh_seconds: i64) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_token_duration: access_seconds,
            refresh_token_duration: refresh_seconds,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_token_duration(&self) -> i64 {
        self.access_token_duration
    }

    /// Generate an access token
    pub fn generate_access_token(&self, account_id: AccountId, email: &str) -> Result<IssuedToken, AuthError> {
        self.issue(account_id, email, TokenType::Access, self.access_token_duration)
    }

    /// Generate a refresh token
    pub fn generate_refresh_token(&self, account_id: AccountId, email: &str) -> Result<IssuedToken, AuthError> {
        self.issue(account_id, email, TokenType::Refresh, self.refresh_token_duration)
    }

    fn issue(
        &self,
        account_id: AccountId,
        email: &str,
        token_type: TokenType,
        lifetime: i64,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account_id,
            email: email.to_string(),
            token_type,
            iat: now,
            exp: now + lifetime,
        };

        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::internal("signing token", e))?;

        Ok(IssuedToken {
            token,
            expires_in: lifetime,
        })
    }

    /// Validate a token of either type and return its claims
    ///
    /// The header algorithm is checked before the signature so that a
    /// token claiming `none` or any other algorithm is rejected outright.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        pin_algorithm(token)?;

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::TokenBadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::UnexpectedAlgorithm
                }
                _ => AuthError::TokenMalformed,
            })
    }

    /// Validate a token and require it to be an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_typed(token, TokenType::Access)
    }

    /// Validate a token and require it to be a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_typed(token, TokenType::Refresh)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(AuthError::InvalidTokenType);
        }
        Ok(claims)
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// Reject any token whose header does not name the pinned algorithm
fn pin_algorithm(token: &str) -> Result<(), AuthError> {
    let mut segments = token.split('.');
    let header_segment = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(header), Some(_), Some(_), None) if !header.is_empty() => header,
        _ => return Err(AuthError::TokenMalformed),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(|_| AuthError::TokenMalformed)?;
    let header: RawHeader = serde_json::from_slice(&bytes).map_err(|_| AuthError::TokenMalformed)?;

    match header.alg.as_deref() {
        Some("HS256") => Ok(()),
        _ => Err(AuthError::UnexpectedAlgorithm),
    }
}
