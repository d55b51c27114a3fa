//! Process configuration loaded from environment variables.

use std::net::{IpAddr, SocketAddr};

use anyhow::{bail, Context, Result};

use crate::auth::types::AuthConfig;
use crate::enrich::EnrichStrategy;

/// Which document store backs the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreBackend,
    pub auth: AuthConfig,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub enrich_strategy: EnrichStrategy,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Required env vars:
    /// - `ACCESS_TOKEN_SECRET`: Secret key for signing session tokens
    /// - `DATABASE_URL`: PostgreSQL connection string (unless `STORE_BACKEND=memory`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .context("HOST must be a valid IP address")?;

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let store = match lookup("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("unknown STORE_BACKEND: {}", other),
        };

        let jwt_secret = lookup("ACCESS_TOKEN_SECRET")
            .filter(|s| !s.is_empty())
            .context("ACCESS_TOKEN_SECRET must be set")?;

        let secure_cookie = lookup("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let enrich_strategy = match lookup("ENRICH_STRATEGY").as_deref() {
            None | Some("batched") => EnrichStrategy::Batched,
            Some("sequential") => EnrichStrategy::Sequential,
            Some(other) => bail!("unknown ENRICH_STRATEGY: {}", other),
        };

        Ok(Self {
            host,
            port,
            store,
            auth: AuthConfig::new(jwt_secret, secure_cookie),
            cors_allowed_origins,
            enrich_strategy,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
