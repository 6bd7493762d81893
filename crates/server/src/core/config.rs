//! Server configuration

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::chat::{self, ChatProvider};
use crate::core::auth::AuthManager;
use crate::core::db::Db;
use crate::friends::FriendManager;

/// Credentials for the external chat provider
#[derive(Clone, Debug)]
pub struct StreamConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

pub const DEFAULT_STREAM_BASE_URL: &str = "https://chat.stream-io-api.com";

/// Upper bound for `SESSION_TTL_DAYS`.
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

/// Configuration for the Streamify server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// sqlx SQLite URL
    pub database_url: String,
    /// Secret used to sign session tokens
    pub jwt_secret: String,
    /// Origins allowed to make credentialed requests
    pub allowed_origins: Vec<String>,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Session lifetime in days
    pub session_ttl_days: i64,
    /// bcrypt cost factor
    pub password_hash_cost: u32,
    /// Chat provider credentials, if configured
    pub stream: Option<StreamConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            database_url: "sqlite://streamify.sqlite".to_string(),
            jwt_secret: String::new(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            cookie_secure: false,
            session_ttl_days: 7,
            password_hash_cost: bcrypt::DEFAULT_COST,
            stream: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = var("PORT") {
            config.port = port.parse().context("PORT must be a port number")?;
        }
        if let Some(url) = var("DATABASE_URL") {
            config.database_url = url;
        }

        config.jwt_secret = var("JWT_SECRET_KEY")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET_KEY must be set")?;

        if let Some(origins) = var("FRONTEND_URL") {
            let origins = parse_origins(&origins);
            if !origins.is_empty() {
                config.allowed_origins = origins;
            }
        }

        config.cookie_secure = var("NODE_ENV").as_deref() == Some("production");

        if let Some(days) = var("SESSION_TTL_DAYS") {
            config.session_ttl_days = days
                .parse::<i64>()
                .ok()
                .filter(|d| (1..=MAX_SESSION_TTL_DAYS).contains(d))
                .with_context(|| {
                    format!("SESSION_TTL_DAYS must be between 1 and {}", MAX_SESSION_TTL_DAYS)
                })?;
        }
        if let Some(cost) = var("BCRYPT_COST") {
            config.password_hash_cost = cost.parse().context("BCRYPT_COST must be an integer")?;
        }

        config.stream = match (var("STREAM_API_KEY"), var("STREAM_API_SECRET")) {
            (Some(api_key), Some(api_secret)) if !api_key.is_empty() && !api_secret.is_empty() => {
                Some(StreamConfig {
                    api_key,
                    api_secret,
                    base_url: var("STREAM_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_STREAM_BASE_URL.to_string()),
                })
            }
            _ => None,
        };

        Ok(config)
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub auth: Arc<AuthManager>,
    pub friends: Arc<FriendManager>,
    pub chat: Arc<dyn ChatProvider>,
}

impl AppState {
    pub fn new(config: ServerConfig, db: Db, chat: Arc<dyn ChatProvider>) -> Self {
        let auth = Arc::new(AuthManager::new(db.clone(), &config));
        let friends = Arc::new(FriendManager::new(db));
        Self {
            config: Arc::new(config),
            auth,
            friends,
            chat,
        }
    }

    /// Build state with the chat provider described by `config`.
    pub fn from_config(config: ServerConfig, db: Db) -> Self {
        let chat = chat::provider_from_config(config.stream.as_ref());
        Self::new(config, db, chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn requires_jwt_secret() {
        assert!(ServerConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::from_lookup(lookup(&[("JWT_SECRET_KEY", "s3cret")])).unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.session_ttl_days, 7);
        assert_eq!(config.allowed_origins, vec!["http://localhost:5173"]);
        assert!(!config.cookie_secure);
        assert!(config.stream.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("JWT_SECRET_KEY", "s3cret"),
            ("PORT", "8080"),
            ("FRONTEND_URL", "https://a.example/, https://b.example"),
            ("NODE_ENV", "production"),
            ("STREAM_API_KEY", "key"),
            ("STREAM_API_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.cookie_secure);
        let stream = config.stream.unwrap();
        assert_eq!(stream.api_key, "key");
        assert_eq!(stream.base_url, DEFAULT_STREAM_BASE_URL);
    }

    #[test]
    fn rejects_bad_port() {
        let result =
            ServerConfig::from_lookup(lookup(&[("JWT_SECRET_KEY", "x"), ("PORT", "nope")]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_out_of_range_session_ttl() {
        for days in ["0", "-3", "366", "9223372036854775807", "week"] {
            let result = ServerConfig::from_lookup(lookup(&[
                ("JWT_SECRET_KEY", "x"),
                ("SESSION_TTL_DAYS", days),
            ]));
            assert!(result.is_err(), "accepted SESSION_TTL_DAYS={}", days);
        }

        let config = ServerConfig::from_lookup(lookup(&[
            ("JWT_SECRET_KEY", "x"),
            ("SESSION_TTL_DAYS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.session_ttl_days, 30);
    }

    #[test]
    fn parse_origins_skips_blanks() {
        assert_eq!(parse_origins(" , http://x.test ,"), vec!["http://x.test"]);
    }
}
