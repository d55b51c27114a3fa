//! Session issuing HTTP handlers.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use shared_types::SuccessResponse;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

use super::{build_auth_cookie, build_clear_cookie, jwt, types::IdentityPayload};

/// Issue a session cookie for the supplied identity.
///
/// No credential is checked here; whatever identity is posted gets a token.
/// The token travels only in the cookie, never in the body.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(identity): Json<IdentityPayload>,
) -> ApiResult<Response> {
    let config = &state.auth_config;
    let email = identity.email.clone();

    let token = jwt::create_token(config, identity).map_err(ApiError::TokenSigning)?;
    let cookie = build_auth_cookie(config, &token);

    tracing::info!("Issued session for: {}", email);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SuccessResponse { success: true }),
    )
        .into_response())
}

/// Logout - clear the session cookie.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = build_clear_cookie(&state.auth_config);

    (
        [(header::SET_COOKIE, cookie)],
        Json(SuccessResponse { success: true }),
    )
}
