//! Process configuration, read once from the environment at startup.

use chrono::Duration;

/// Runtime configuration for the API process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,

    /// Use Postgres when true, the in-memory store otherwise.
    pub use_persistent_store: bool,

    /// Postgres connection string (required when persistent).
    pub database_url: Option<String>,

    /// HS256 secret for session tokens.
    pub session_secret: String,

    /// Stored hash the shared owner password is verified against.
    pub password_hash: String,

    /// Session token lifetime.
    pub session_ttl: Duration,

    /// Interval for the store keep-alive ping task.
    pub store_ping_interval: std::time::Duration,
}

impl Config {
    /// Read configuration from the environment, with dev defaults.
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let use_persistent_store = std::env::var("USE_PERSISTENT_STORE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let database_url = std::env::var("DATABASE_URL").ok();

        let session_secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SESSION_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let password_hash = match std::env::var("NESTEGG_PASSWORD_HASH") {
            Ok(hash) => hash,
            Err(_) => {
                let password = std::env::var("NESTEGG_PASSWORD").unwrap_or_else(|_| {
                    tracing::warn!("NESTEGG_PASSWORD not set; using insecure dev default");
                    "dev-password".to_string()
                });
                nestegg_auth::hash_password(&password)
            }
        };

        let session_ttl = Duration::minutes(
            std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        );

        let store_ping_interval = std::time::Duration::from_secs(
            std::env::var("STORE_PING_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60),
        );

        Self {
            bind_addr,
            use_persistent_store,
            database_url,
            session_secret,
            password_hash,
            session_ttl,
            store_ping_interval,
        }
    }
}
