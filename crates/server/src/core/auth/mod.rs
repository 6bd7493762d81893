//! Authentication Module
//!
//! Handles signup, login, session tokens and profile onboarding.
//! Users live in the `users` table of the shared SQLite database.

pub mod handlers;
pub mod middleware;
pub mod session;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::config::ServerConfig;
use crate::core::db::Db;
use crate::core::error::{is_unique_violation, Error, Result};
use crate::core::models::User;
use session::SessionKeys;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Profile fields submitted by the onboarding form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingProfile {
    pub full_name: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub profile_pic: Option<String>,
}

impl OnboardingProfile {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("bio", &self.bio),
            ("nativeLanguage", &self.native_language),
            ("learningLanguage", &self.learning_language),
            ("location", &self.location),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Auth manager handles all authentication
pub struct AuthManager {
    db: Db,
    keys: SessionKeys,
    hash_cost: u32,
}

impl AuthManager {
    pub fn new(db: Db, config: &ServerConfig) -> Self {
        Self {
            db,
            keys: SessionKeys::new(
                config.jwt_secret.as_bytes(),
                Duration::days(config.session_ttl_days),
            ),
            hash_cost: config.password_hash_cost,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.keys.ttl()
    }

    /// Register a new user and issue a session token for it.
    pub async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String)> {
        let full_name = full_name.trim();
        let email = normalize_email(email);
        let email = email.as_str();

        if full_name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput("All fields are required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if !is_valid_email(email) {
            return Err(Error::InvalidInput("Invalid email format".to_string()));
        }

        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "Email already exists, please use a different one".to_string(),
            ));
        }

        let password_hash = hash_password(password.to_string(), self.hash_cost).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash,
            bio: String::new(),
            profile_pic: random_avatar(),
            native_language: String::new(),
            learning_language: String::new(),
            location: String::new(),
            is_onboarded: false,
            friends: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, full_name, email, password_hash, profile_pic, is_onboarded, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_pic)
        .bind(user.is_onboarded)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.db.pool())
        .await
        .map_err(|e| {
            // Lost a race with another signup for the same email.
            if is_unique_violation(&e) {
                Error::Conflict("Email already exists, please use a different one".to_string())
            } else {
                e.into()
            }
        })?;

        let token = self.keys.issue(&user.id)?;

        info!("[Auth] User registered: {} ({})", user.full_name, user.email);

        Ok((user, token))
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let invalid = || Error::Unauthorized("Invalid email or password".to_string());

        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(self.db.pool())
            .await?;
        let mut user = user.ok_or_else(invalid)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            warn!("[Auth] Failed login attempt for {}", user.email);
            return Err(invalid());
        }

        user.friends = self.friend_ids(&user.id).await?;
        let token = self.keys.issue(&user.id)?;

        info!("[Auth] User logged in: {}", user.full_name);

        Ok((user, token))
    }

    /// Resolve a session token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.keys.verify(token)?;
        match self.find_user(&claims.sub).await? {
            Some(user) => Ok(user),
            None => Err(Error::Unauthorized(
                "Unauthorized - User not found".to_string(),
            )),
        }
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.find_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        match user {
            Some(mut user) => {
                user.friends = self.friend_ids(&user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT friend_id FROM friendships WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Fill in the profile and mark the account as onboarded.
    pub async fn complete_onboarding(
        &self,
        user_id: &str,
        profile: OnboardingProfile,
    ) -> Result<User> {
        let missing = profile.missing_fields();
        if !missing.is_empty() {
            return Err(Error::InvalidInput(format!(
                "All fields are required (missing: {})",
                missing.join(", ")
            )));
        }

        let profile_pic = profile
            .profile_pic
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let result = sqlx::query(
            r#"
            UPDATE users SET
                full_name = ?,
                bio = ?,
                native_language = ?,
                learning_language = ?,
                location = ?,
                profile_pic = COALESCE(?, profile_pic),
                is_onboarded = 1,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(profile.full_name.trim())
        .bind(profile.bio.trim())
        .bind(profile.native_language.trim())
        .bind(profile.learning_language.trim())
        .bind(profile.location.trim())
        .bind(profile_pic)
        .bind(Utc::now())
        .bind(user_id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".to_string()));
        }

        info!("[Auth] User onboarded: {}", user_id);

        self.get_user(user_id).await
    }
}

/// Minimal `local@domain.tld` shape check with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn random_avatar() -> String {
    let idx = rand::thread_rng().gen_range(1..=100);
    format!("https://avatar.iran.liara.run/public/{}.png", idx)
}

async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| Error::Internal(format!("hash task failed: {}", e)))?
        .map_err(Into::into)
}

async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| Error::Internal(format!("verify task failed: {}", e)))?
        .map_err(Into::into)
}

/// Emails are stored and looked up trimmed and lowercased.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
