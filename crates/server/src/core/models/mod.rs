use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record as stored in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub bio: String,
    pub profile_pic: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub is_onboarded: bool,
    /// Ids of accepted friends, loaded from the `friendships` table.
    #[sqlx(skip)]
    #[serde(default)]
    pub friends: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            profile_pic: self.profile_pic.clone(),
            bio: self.bio.clone(),
            native_language: self.native_language.clone(),
            learning_language: self.learning_language.clone(),
            location: self.location.clone(),
        }
    }
}

/// Public user info (no email, no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: String,
    pub full_name: String,
    pub profile_pic: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
}

/// Friend request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
}

/// Friend request record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A friend request joined with the profile of the user on the other side.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestSummary {
    #[serde(rename = "id")]
    pub request_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub user: PublicProfile,
}

/// Requests shown on the notifications screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequests {
    /// Pending requests addressed to the user, with the sender's profile.
    pub incoming_reqs: Vec<FriendRequestSummary>,
    /// Requests the user sent that were accepted, with the recipient's profile.
    pub accepted_reqs: Vec<FriendRequestSummary>,
}
