//! Session credentials and request authentication.
//!
//! Passwords are hashed with Argon2; session tokens are HS256 JWTs carrying
//! the account id, email, name, and role. The middleware resolves the bearer
//! token (when present) into an [`AuthContext`] that handlers consult through
//! the `authorize_*` helpers. Requests without an Authorization header pass
//! through as anonymous so public endpoints keep working; requests with a
//! *bad* token are rejected outright.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tavola_core::{TvError, TvResult, User, UserRole};

use crate::rest::ApiError;
use crate::state::AppState;

const AUTHORIZATION_BEARER_PREFIX: &str = "Bearer ";

/// Maximum bearer token length. Prevents DoS via oversized Authorization headers.
const MAX_TOKEN_LENGTH: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRole {
    Anonymous,
    Customer,
    Admin,
}

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: AuthRole,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            email: None,
            name: None,
            role: AuthRole::Anonymous,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == AuthRole::Admin
    }

    pub fn is_authenticated(&self) -> bool {
        self.role != AuthRole::Anonymous
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    name: String,
    role: String,
    exp: usize,
    iat: usize,
}

pub fn hash_password(password: &str) -> TvResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| TvError::Internal(format!("password hashing failed: {err}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Issue a signed session credential for this account.
pub fn issue_token(user: &User, secret: &str, ttl_secs: i64) -> TvResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.as_str().to_string(),
        exp: (now + ttl_secs) as usize,
        iat: now as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| TvError::Internal(format!("token encoding failed: {err}")))
}

pub fn validate_token(token: &str, secret: &str) -> Result<AuthContext, StatusCode> {
    if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_err| StatusCode::UNAUTHORIZED)?;

    let user_id =
        Uuid::parse_str(&token_data.claims.sub).map_err(|_err| StatusCode::UNAUTHORIZED)?;
    let role = match UserRole::parse(&token_data.claims.role) {
        Some(UserRole::Admin) => AuthRole::Admin,
        Some(UserRole::Customer) => AuthRole::Customer,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    Ok(AuthContext {
        user_id: Some(user_id),
        email: Some(token_data.claims.email),
        name: Some(token_data.claims.name),
        role,
    })
}

pub fn auth_context_from_headers(
    headers: &HeaderMap,
    secret: &str,
) -> Result<AuthContext, StatusCode> {
    let header = match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(header) => header,
        None => return Ok(AuthContext::anonymous()),
    };
    let token = header
        .strip_prefix(AUTHORIZATION_BEARER_PREFIX)
        .ok_or(StatusCode::UNAUTHORIZED)?;
    validate_token(token, secret)
}

/// Resolve the bearer token into an [`AuthContext`] request extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth = auth_context_from_headers(request.headers(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(auth);
    Ok(next.run(request).await)
}

pub fn authorize_user(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.is_authenticated() {
        Ok(())
    } else {
        Err(ApiError::unauthorized("authentication required"))
    }
}

pub fn authorize_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.is_admin() {
        Ok(())
    } else if auth.is_authenticated() {
        Err(ApiError::forbidden("admin permission required"))
    } else {
        Err(ApiError::unauthorized("authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavola_core::AuthProvider;

    fn test_user(role: UserRole) -> User {
        User {
            id: Uuid::now_v7(),
            email: "dana@example.com".into(),
            name: "Dana".into(),
            password_hash: None,
            role,
            provider: AuthProvider::Local,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
        assert!(!verify_password("hunter2!", "not-a-phc-string"));
    }

    #[test]
    fn token_roundtrip_preserves_identity_and_role() {
        let user = test_user(UserRole::Admin);
        let token = issue_token(&user, "secret", 3600).unwrap();

        let auth = validate_token(&token, "secret").unwrap();
        assert_eq!(auth.user_id, Some(user.id));
        assert_eq!(auth.email.as_deref(), Some("dana@example.com"));
        assert_eq!(auth.role, AuthRole::Admin);
        assert!(auth.is_admin());
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let user = test_user(UserRole::Customer);
        let token = issue_token(&user, "secret", 3600).unwrap();
        assert!(validate_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = test_user(UserRole::Customer);
        let token = issue_token(&user, "secret", -120).unwrap();
        assert!(validate_token(&token, "secret").is_err());
    }

    #[test]
    fn missing_header_is_anonymous() {
        let headers = HeaderMap::new();
        let auth = auth_context_from_headers(&headers, "secret").unwrap();
        assert_eq!(auth.role, AuthRole::Anonymous);
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn malformed_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Token abc".parse().unwrap());
        assert!(auth_context_from_headers(&headers, "secret").is_err());
    }

    #[test]
    fn oversized_token_is_rejected() {
        let long = "x".repeat(MAX_TOKEN_LENGTH + 1);
        assert!(validate_token(&long, "secret").is_err());
    }

    #[test]
    fn authorize_helpers_enforce_roles() {
        let anon = AuthContext::anonymous();
        assert!(authorize_user(&anon).is_err());
        assert!(authorize_admin(&anon).is_err());

        let customer = validate_token(
            &issue_token(&test_user(UserRole::Customer), "s", 3600).unwrap(),
            "s",
        )
        .unwrap();
        assert!(authorize_user(&customer).is_ok());
        assert!(authorize_admin(&customer).is_err());

        let admin = validate_token(
            &issue_token(&test_user(UserRole::Admin), "s", 3600).unwrap(),
            "s",
        )
        .unwrap();
        assert!(authorize_admin(&admin).is_ok());
    }
}
