// Authentication middleware for protected routes

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::AccountId, token::TokenService};

/// Identity attached to a request that passed authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
    pub email: String,
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| AuthError::Unauthorized("authorization header is not valid text"))?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::Unauthorized("malformed authorization header")),
    }
}

/// Validate the bearer credential in `headers`
///
/// Only access tokens authenticate; a refresh token is rejected.
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<AuthenticatedAccount, AuthError> {
    let token = bearer_token(headers)?;

    let claims = tokens.validate_access_token(token).map_err(|e| {
        warn!("Bearer token rejected: {}", e);
        AuthError::Unauthorized("invalid bearer token")
    })?;

    Ok(AuthenticatedAccount {
        account_id: claims.sub,
        email: claims.email,
    })
}

/// Middleware function that requires a valid access token
///
/// On success the identity is stored in the request extensions for
/// `AuthenticatedAccount` to pick up.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let account = authenticate(&tokens, request.headers())?;

    debug!(
        "Authentication successful: account_id={}, endpoint={}",
        account.account_id,
        request.uri().path()
    );
    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAccount>()
            .cloned()
            .ok_or(AuthError::Unauthorized("route is not behind require_auth"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use proptest::prelude::*;
    use tower::ServiceExt;
    use uuid::Uuid;

    // Helper to create a test token service
    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes")
    }

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    async fn whoami(account: AuthenticatedAccount) -> String {
        format!("{}|{}", account.account_id, account.email)
    }

    fn protected_app(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(tokens, require_auth))
    }

    #[test]
    fn valid_access_token_is_accepted() {
        let service = test_token_service();
        let id = Uuid::new_v4();
        let token = service.generate_access_token(id, "test@example.com").unwrap().token;

        let account = authenticate(&service, &headers_with_auth(&format!("Bearer {}", token))).unwrap();
        assert_eq!(account.account_id, id);
        assert_eq!(account.email, "test@example.com");
    }

    #[test]
    fn refresh_token_never_authenticates() {
        let service = test_token_service();
        let token = service
            .generate_refresh_token(Uuid::new_v4(), "test@example.com")
            .unwrap()
            .token;

        let result = authenticate(&service, &headers_with_auth(&format!("Bearer {}", token)));
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let result = authenticate(&test_token_service(), &HeaderMap::new());
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[test]
    fn malformed_headers_are_unauthorized() {
        let service = test_token_service();
        let token = service.generate_access_token(Uuid::new_v4(), "a@x.com").unwrap().token;

        for value in [
            "InvalidFormat token".to_string(),
            "token_without_bearer".to_string(),
            "Basic dXNlcjpwYXNz".to_string(),
            "Bearer".to_string(),
            "Bearer ".to_string(),
            "bearer ".to_string() + &token,
            format!("Bearer  {}", token),
            format!("Bearer {} extra", token),
            token.clone(),
        ] {
            let result = authenticate(&service, &headers_with_auth(&value));
            assert!(
                matches!(result, Err(AuthError::Unauthorized(_))),
                "header {:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn invalid_tokens_are_unauthorized() {
        let service = test_token_service();
        let foreign = TokenService::new("other_secret")
            .generate_access_token(Uuid::new_v4(), "a@x.com")
            .unwrap()
            .token;

        for value in [
            "Bearer invalid_token".to_string(),
            "Bearer not.a.valid.jwt".to_string(),
            "Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature".to_string(),
            format!("Bearer {}", foreign),
        ] {
            let result = authenticate(&service, &headers_with_auth(&value));
            assert!(matches!(result, Err(AuthError::Unauthorized(_))));
        }
    }

    #[tokio::test]
    async fn middleware_attaches_identity() {
        let tokens = Arc::new(test_token_service());
        let id = Uuid::new_v4();
        let token = tokens.generate_access_token(id, "a@x.com").unwrap().token;

        let response = protected_app(tokens)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), format!("{}|a@x.com", id));
    }

    #[tokio::test]
    async fn middleware_rejects_without_running_handler() {
        let tokens = Arc::new(test_token_service());
        let refresh = tokens
            .generate_refresh_token(Uuid::new_v4(), "a@x.com")
            .unwrap()
            .token;

        for auth in [None, Some(format!("Bearer {}", refresh))] {
            let mut builder = Request::builder().uri("/whoami");
            if let Some(value) = auth {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            let response = protected_app(tokens.clone())
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn extractor_without_middleware_is_unauthorized() {
        let app = Router::new().route("/whoami", get(whoami));
        let response = app
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    proptest! {
        #[test]
        fn prop_valid_tokens_accepted(
            id_bytes in any::<u128>(),
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net)"
        ) {
            let service = test_token_service();
            let id = Uuid::from_u128(id_bytes);
            let token = service.generate_access_token(id, &email).unwrap().token;

            let account = authenticate(&service, &headers_with_auth(&format!("Bearer {}", token))).unwrap();
            prop_assert_eq!(account.account_id, id);
            prop_assert_eq!(account.email, email);
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            let result = authenticate(&service, &headers_with_auth(&format!("Bearer {}", malformed)));
            prop_assert!(result.is_err());
        }
    }
}
