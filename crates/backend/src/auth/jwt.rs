//! JWT token creation and validation.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use super::types::{AuthConfig, Claims, IdentityPayload, RESERVED_CLAIMS};

/// Create a new session token for an identity payload.
pub fn create_token(
    config: &AuthConfig,
    mut identity: IdentityPayload,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + config.token_duration;

    for claim in RESERVED_CLAIMS {
        identity.extra.remove(claim);
    }

    let claims = Claims {
        identity,
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode_claims(config, &claims)
}

pub(crate) fn encode_claims(
    config: &AuthConfig,
    claims: &Claims,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Validate a session token and return its claims.
///
/// Expiry is checked with no leeway.
pub fn validate_token(
    config: &AuthConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::Fields;

    fn test_config() -> AuthConfig {
        AuthConfig::new("test-secret-key-for-testing-only", false)
    }

    fn identity(email: &str) -> IdentityPayload {
        IdentityPayload {
            email: email.to_string(),
            extra: Fields::new(),
        }
    }

    #[test]
    fn test_create_and_validate_token() {
        let config = test_config();
        let mut payload = identity("test@example.com");
        payload.extra.insert("name".to_string(), json!("Test User"));

        let token = create_token(&config, payload).expect("should create token");
        let claims = validate_token(&config, &token).expect("should validate token");

        assert_eq!(claims.identity.email, "test@example.com");
        assert_eq!(claims.identity.extra["name"], "Test User");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_payload_cannot_override_expiry() {
        let config = test_config();
        let mut payload = identity("test@example.com");
        payload.extra.insert("exp".to_string(), json!(i64::MAX));

        let token = create_token(&config, payload).expect("should create token");
        let claims = validate_token(&config, &token).expect("should validate token");

        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.identity.extra.contains_key("exp"));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let config = test_config();
        let result = validate_token(&config, "invalid-token");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_config();
        let token =
            create_token(&config, identity("test@example.com")).expect("should create token");

        let mut wrong_config = config;
        wrong_config.jwt_secret = "wrong-secret".to_string();

        let result = validate_token(&wrong_config, &token);
        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let config = test_config();
        let token =
            create_token(&config, identity("test@example.com")).expect("should create token");

        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", unsigned, flipped, &signature[1..]);

        assert!(validate_token(&config, &tampered).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            identity: identity("test@example.com"),
            iat: now - 2 * 3600 - 1,
            exp: now - 3600 - 1,
        };
        let token = encode_claims(&config, &claims).expect("should encode");

        assert!(validate_token(&config, &token).is_err());
    }
}
