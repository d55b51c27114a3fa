use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth;
use crate::handlers;
use crate::AppState;

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Session routes
        .route("/jwt", post(auth::issue_token))
        .route("/logout", post(auth::logout))
        // Job routes
        .route("/jobs", get(handlers::list_jobs))
        .route("/jobs", post(handlers::create_job))
        .route("/jobs/:id", get(handlers::get_job))
        // Application routes
        .route("/job-applications", get(handlers::list_applications))
        .route("/job-applications", post(handlers::create_application))
        // Only GET is guarded; a bare DELETE is a missing id, not a missing session
        .route(
            "/job-application",
            get(handlers::list_my_applications)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::require_auth,
                ))
                .delete(handlers::delete_application_without_id),
        )
        .route(
            "/job-application/",
            delete(handlers::delete_application_without_id),
        )
        .route(
            "/job-application/:job_id",
            delete(handlers::delete_application),
        )
        .layer(build_cors_layer(state.cors_allowed_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build CORS layer from the configured origins.
///
/// Session cookies need credentialed requests, which browsers only allow with
/// an explicit origin list. Without one, CORS is permissive and cookies will
/// only work same-origin.
fn build_cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origins: Vec<_> = allowed_origins
        .unwrap_or_default()
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
