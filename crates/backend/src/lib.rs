//! Job portal HTTP backend.
//!
//! Jobs and job applications live in a [`DocumentStore`]; one route is gated
//! behind a cookie-carried session token and an ownership check.

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod enrich;
pub mod error;
mod handlers;
mod models;
mod routes;
mod schema;
pub mod store;

pub use config::{AppConfig, StoreBackend};
pub use enrich::EnrichStrategy;
pub use routes::create_router;
pub use store::{DocumentStore, MemoryStore, PgStore};

use auth::types::AuthConfig;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth_config: AuthConfig,
    pub enrich_strategy: EnrichStrategy,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        Self {
            store,
            auth_config: config.auth.clone(),
            enrich_strategy: config.enrich_strategy,
            cors_allowed_origins: config.cors_allowed_origins.clone(),
        }
    }
}
