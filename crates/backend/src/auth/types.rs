//! Auth-related types and configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use shared_types::Fields;

/// Claim names owned by the issuer.
pub(crate) const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Identity payload supplied by the client when requesting a session.
///
/// Only `email` is required; anything else rides along in the token untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityPayload {
    pub email: String,
    #[serde(flatten)]
    pub extra: Fields,
}

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity the token was issued for
    #[serde(flatten)]
    pub identity: IdentityPayload,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Verified identity attached to a request by the access guard
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub email: String,
    pub claims: Claims,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.identity.email.clone(),
            claims,
        }
    }
}

/// Auth configuration. The issuer and the guard must share one instance.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_duration: Duration,
    pub cookie_name: String,
    pub secure_cookie: bool,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, secure_cookie: bool) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_duration: Duration::hours(1),
            cookie_name: "token".to_string(),
            secure_cookie,
        }
    }
}
