//! Authentication middleware layer for protecting routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{time, Cookie, SameSite};

use crate::error::ApiError;
use crate::AppState;

use super::jwt;
use super::types::{AuthConfig, AuthUser};

/// Middleware function that requires a valid session cookie.
///
/// Use with `axum::middleware::from_fn_with_state`. On success the verified
/// [`AuthUser`] is available to handlers through `Extension<AuthUser>`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match extract_auth_user(request.headers(), &state.auth_config) {
        Ok(user) => {
            tracing::debug!("authenticated request for {}", user.email);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!("authentication denied: {}", err);
            err.into_response()
        }
    }
}

/// Extract and validate the session from request headers.
pub fn extract_auth_user(headers: &HeaderMap, config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let token = extract_token_from_cookie(headers, &config.cookie_name)
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication".to_string()))?;

    let claims = jwt::validate_token(config, &token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    Ok(AuthUser::from(claims))
}

fn extract_token_from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == cookie_name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

/// Build the `Set-Cookie` value carrying a session token.
pub fn build_auth_cookie(config: &AuthConfig, token: &str) -> String {
    Cookie::build((config.cookie_name.as_str(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure_cookie)
        .max_age(time::Duration::seconds(config.token_duration.num_seconds()))
        .build()
        .to_string()
}

/// Build a `Set-Cookie` value that clears the session cookie.
pub fn build_clear_cookie(config: &AuthConfig) -> String {
    Cookie::build((config.cookie_name.as_str(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure_cookie)
        .max_age(time::Duration::ZERO)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use shared_types::Fields;

    use crate::auth::types::IdentityPayload;

    fn test_config() -> AuthConfig {
        AuthConfig::new("test-secret-key-for-testing-only", false)
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extracts_named_cookie_among_others() {
        let headers = headers_with_cookie("theme=dark; token=abc.def.ghi; lang=en");
        assert_eq!(
            extract_token_from_cookie(&headers, "token").as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_empty_cookie_is_missing() {
        let headers = headers_with_cookie("token=");
        assert!(extract_token_from_cookie(&headers, "token").is_none());
        assert!(extract_token_from_cookie(&HeaderMap::new(), "token").is_none());
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = build_auth_cookie(&test_config(), "abc");
        assert!(cookie.starts_with("token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_secure_flag_follows_config() {
        let config = AuthConfig::new("secret", true);
        assert!(build_auth_cookie(&config, "abc").contains("Secure"));
        assert!(build_clear_cookie(&config).contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_auth_user() {
        let config = test_config();
        let token = jwt::create_token(
            &config,
            IdentityPayload {
                email: "a@x.com".to_string(),
                extra: Fields::new(),
            },
        )
        .unwrap();

        let user = extract_auth_user(&headers_with_cookie(&format!("token={}", token)), &config)
            .expect("should authenticate");
        assert_eq!(user.email, "a@x.com");

        let missing = extract_auth_user(&HeaderMap::new(), &config);
        assert!(matches!(missing, Err(ApiError::Unauthorized(_))));

        let forged = extract_auth_user(&headers_with_cookie("token=forged"), &config);
        assert!(matches!(forged, Err(ApiError::Unauthorized(_))));
    }
}
