//! Per-request ownership rule for user-scoped reads.

use crate::error::{ApiError, ApiResult};

use super::types::AuthUser;

/// Require that the verified identity is the one whose data is requested.
///
/// Plain string equality is the whole policy.
pub fn ensure_owner(user: &AuthUser, requested_email: &str) -> ApiResult<()> {
    if user.email != requested_email {
        tracing::warn!(
            "{} attempted to read data belonging to {}",
            user.email,
            requested_email
        );
        return Err(ApiError::Forbidden("Forbidden access".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::{Claims, IdentityPayload};
    use shared_types::Fields;

    fn user(email: &str) -> AuthUser {
        AuthUser::from(Claims {
            identity: IdentityPayload {
                email: email.to_string(),
                extra: Fields::new(),
            },
            iat: 0,
            exp: 3600,
        })
    }

    #[test]
    fn test_same_email_allowed() {
        assert!(ensure_owner(&user("a@x.com"), "a@x.com").is_ok());
    }

    #[test]
    fn test_other_email_forbidden() {
        let result = ensure_owner(&user("a@x.com"), "b@x.com");
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_comparison_is_exact() {
        assert!(ensure_owner(&user("a@x.com"), "A@x.com").is_err());
        assert!(ensure_owner(&user("a@x.com"), "a@x.com ").is_err());
    }
}
