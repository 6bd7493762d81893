//! Chat Credential Layer
//!
//! Messaging, delivery and presence are handled by an external chat
//! provider. This module only keeps the provider's user directory in sync
//! and mints the tokens its client SDK needs.

pub mod handlers;

pub use handlers::router;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::StreamConfig;
use crate::core::error::{Error, Result};
use crate::core::models::User;

/// Identity registered with the chat provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl From<&User> for ChatUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.full_name.clone(),
            image: user.profile_pic.clone(),
        }
    }
}

/// Everything the client SDK needs to connect as the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCredentials {
    pub token: String,
    pub api_key: Option<String>,
    pub user: ChatUser,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Public key the client SDK is initialised with.
    fn api_key(&self) -> Option<&str>;

    /// Create or update the user in the provider's directory.
    async fn upsert_user(&self, user: &ChatUser) -> Result<()>;

    /// Mint a user token for the client SDK.
    fn issue_token(&self, user_id: &str) -> Result<String>;
}

/// Stream Chat REST provider
pub struct StreamChatProvider {
    api_key: String,
    base_url: String,
    signing_key: EncodingKey,
    client: reqwest::Client,
}

impl StreamChatProvider {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            signing_key: EncodingKey::from_secret(config.api_secret.as_bytes()),
            client: reqwest::Client::new(),
        }
    }

    fn server_token(&self) -> Result<String> {
        Ok(encode(
            &Header::default(),
            &json!({ "server": true }),
            &self.signing_key,
        )?)
    }
}

#[async_trait]
impl ChatProvider for StreamChatProvider {
    fn api_key(&self) -> Option<&str> {
        Some(&self.api_key)
    }

    async fn upsert_user(&self, user: &ChatUser) -> Result<()> {
        let url = format!("{}/users?api_key={}", self.base_url, self.api_key);
        let body = json!({ "users": { user.id.as_str(): user } });

        let response = self
            .client
            .post(url)
            .header("Authorization", self.server_token()?)
            .header("stream-auth-type", "jwt")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "chat provider rejected user upsert ({}): {}",
                status, detail
            )));
        }

        info!("[Chat] Upserted user {}", user.id);
        Ok(())
    }

    fn issue_token(&self, user_id: &str) -> Result<String> {
        Ok(encode(
            &Header::default(),
            &json!({ "user_id": user_id }),
            &self.signing_key,
        )?)
    }
}

/// Stand-in used when no provider credentials are configured.
pub struct UnconfiguredChatProvider;

#[async_trait]
impl ChatProvider for UnconfiguredChatProvider {
    fn api_key(&self) -> Option<&str> {
        None
    }

    async fn upsert_user(&self, user: &ChatUser) -> Result<()> {
        warn!("[Chat] Provider not configured, skipping upsert of {}", user.id);
        Ok(())
    }

    fn issue_token(&self, _user_id: &str) -> Result<String> {
        Err(Error::Internal(
            "Chat provider is not configured".to_string(),
        ))
    }
}

pub fn provider_from_config(config: Option<&StreamConfig>) -> Arc<dyn ChatProvider> {
    match config {
        Some(config) => {
            info!("[Chat] Using Stream provider at {}", config.base_url);
            Arc::new(StreamChatProvider::new(config))
        }
        None => {
            warn!("[Chat] STREAM_API_KEY or STREAM_API_SECRET missing, chat tokens disabled");
            Arc::new(UnconfiguredChatProvider)
        }
    }
}

/// Push the user's current name and avatar to the provider.
///
/// Failures are logged and do not fail the calling request.
pub async fn sync_user(provider: &dyn ChatProvider, user: &User) {
    if let Err(e) = provider.upsert_user(&ChatUser::from(user)).await {
        warn!("[Chat] Failed to sync user {}: {}", user.id, e);
    }
}

pub fn issue_credentials(provider: &dyn ChatProvider, user: &User) -> Result<ChatCredentials> {
    let token = provider.issue_token(&user.id)?;
    Ok(ChatCredentials {
        token,
        api_key: provider.api_key().map(str::to_string),
        user: ChatUser::from(user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn stream_config() -> StreamConfig {
        StreamConfig {
            api_key: "key".to_string(),
            api_secret: "provider-secret".to_string(),
            base_url: "https://chat.example.test/".to_string(),
        }
    }

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            full_name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            bio: String::new(),
            profile_pic: "https://avatar.iran.liara.run/public/7.png".to_string(),
            native_language: String::new(),
            learning_language: String::new(),
            location: String::new(),
            is_onboarded: false,
            friends: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[derive(Deserialize)]
    struct UserClaims {
        user_id: String,
    }

    #[test]
    fn stream_token_carries_user_id() {
        let provider = StreamChatProvider::new(&stream_config());
        let token = provider.issue_token("u-1").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let claims = decode::<UserClaims>(
            &token,
            &DecodingKey::from_secret(b"provider-secret"),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims.user_id, "u-1");
    }

    #[test]
    fn credentials_include_public_fields() {
        let provider = StreamChatProvider::new(&stream_config());
        let creds = issue_credentials(&provider, &user()).unwrap();
        assert_eq!(creds.api_key.as_deref(), Some("key"));
        assert_eq!(creds.user.name, "Alice");
        assert_eq!(creds.user.image, "https://avatar.iran.liara.run/public/7.png");
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses_tokens() {
        let provider = provider_from_config(None);
        assert!(provider.api_key().is_none());
        assert!(provider.upsert_user(&ChatUser::from(&user())).await.is_ok());
        let err = issue_credentials(provider.as_ref(), &user()).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
