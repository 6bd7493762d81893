//! Friend Request & Friend List Module
//!
//! Friend requests form a ledger in `friend_requests`; each user's friend
//! list is materialized in `friendships` and written in the same
//! transaction that accepts the request.

pub mod handlers;

pub use handlers::router;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::db::Db;
use crate::core::error::{is_unique_violation, Error, Result};
use crate::core::models::{
    FriendRequest, FriendRequestSummary, IncomingRequests, PublicProfile, RequestStatus,
};

const PROFILE_COLUMNS: &str =
    "u.id, u.full_name, u.profile_pic, u.bio, u.native_language, u.learning_language, u.location";

const SUMMARY_COLUMNS: &str = "fr.id AS request_id, fr.sender_id, fr.recipient_id, fr.status, \
     fr.created_at AS requested_at";

/// Friend manager handles all friend-related operations
pub struct FriendManager {
    db: Db,
}

impl FriendManager {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Profiles of the user's accepted friends.
    pub async fn list_friends(&self, user_id: &str) -> Result<Vec<PublicProfile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM friendships f \
             JOIN users u ON u.id = f.friend_id \
             WHERE f.user_id = ? ORDER BY u.full_name"
        );
        Ok(sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    /// Onboarded users who are neither the caller nor already friends.
    pub async fn list_recommendations(&self, user_id: &str) -> Result<Vec<PublicProfile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM users u \
             WHERE u.id != ? \
               AND u.is_onboarded = 1 \
               AND u.id NOT IN (SELECT friend_id FROM friendships WHERE user_id = ?) \
             ORDER BY u.created_at DESC"
        );
        Ok(sqlx::query_as(&sql)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    /// Pending requests the user sent, with each recipient's profile.
    pub async fn list_outgoing_requests(&self, user_id: &str) -> Result<Vec<FriendRequestSummary>> {
        self.summaries("fr.recipient_id", "fr.sender_id", RequestStatus::Pending, user_id)
            .await
    }

    /// Pending requests sent to the user and the user's own requests that
    /// were accepted.
    pub async fn list_incoming_requests(&self, user_id: &str) -> Result<IncomingRequests> {
        let incoming_reqs = self
            .summaries("fr.sender_id", "fr.recipient_id", RequestStatus::Pending, user_id)
            .await?;
        let accepted_reqs = self
            .summaries("fr.recipient_id", "fr.sender_id", RequestStatus::Accepted, user_id)
            .await?;
        Ok(IncomingRequests {
            incoming_reqs,
            accepted_reqs,
        })
    }

    /// Requests with `filter_column = user_id`, joined with the profile found
    /// through `profile_column`. Both columns are fixed by the callers above.
    async fn summaries(
        &self,
        profile_column: &str,
        filter_column: &str,
        status: RequestStatus,
        user_id: &str,
    ) -> Result<Vec<FriendRequestSummary>> {
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS}, {PROFILE_COLUMNS} FROM friend_requests fr \
             JOIN users u ON u.id = {profile_column} \
             WHERE {filter_column} = ? AND fr.status = ? \
             ORDER BY fr.created_at DESC"
        );
        Ok(sqlx::query_as(&sql)
            .bind(user_id)
            .bind(status)
            .fetch_all(self.db.pool())
            .await?)
    }

    /// Send a friend request
    pub async fn send_request(&self, from_user_id: &str, to_user_id: &str) -> Result<FriendRequest> {
        if from_user_id == to_user_id {
            return Err(Error::InvalidInput(
                "You can't send a friend request to yourself".to_string(),
            ));
        }

        let pool = self.db.pool();

        let recipient: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(to_user_id)
            .fetch_optional(pool)
            .await?;
        if recipient.is_none() {
            return Err(Error::NotFound("Recipient not found".to_string()));
        }

        // "Already friends" wins over "request exists" when both hold.
        let friends: Option<(String,)> = sqlx::query_as(
            "SELECT user_id FROM friendships WHERE user_id = ? AND friend_id = ?",
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_optional(pool)
        .await?;
        if friends.is_some() {
            return Err(Error::Conflict(
                "You are already friends with this user".to_string(),
            ));
        }

        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM friend_requests WHERE \
             (sender_id = ? AND recipient_id = ?) OR \
             (sender_id = ? AND recipient_id = ?)",
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(to_user_id)
        .bind(from_user_id)
        .fetch_optional(pool)
        .await?;
        if existing.is_some() {
            return Err(request_exists());
        }

        let now = Utc::now();
        let request = FriendRequest {
            id: Uuid::new_v4().to_string(),
            sender_id: from_user_id.to_string(),
            recipient_id: to_user_id.to_string(),
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.insert_request(&request).await?;

        info!(
            "[Friends] Request sent: {} -> {}",
            request.sender_id, request.recipient_id
        );

        Ok(request)
    }

    async fn insert_request(&self, request: &FriendRequest) -> Result<()> {
        sqlx::query(
            "INSERT INTO friend_requests (id, sender_id, recipient_id, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.id)
        .bind(&request.sender_id)
        .bind(&request.recipient_id)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(self.db.pool())
        .await
        .map_err(|e| {
            // The pair index caught a concurrent request.
            if is_unique_violation(&e) {
                request_exists()
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    /// Accept a pending request on behalf of its recipient.
    ///
    /// The status change and both friend-list entries commit together; any
    /// error drops the transaction and leaves the request pending.
    pub async fn accept_request(&self, request_id: &str, user_id: &str) -> Result<FriendRequest> {
        let mut tx = self.db.pool().begin().await?;

        let request: Option<FriendRequest> =
            sqlx::query_as("SELECT * FROM friend_requests WHERE id = ?")
                .bind(request_id)
                .fetch_optional(&mut *tx)
                .await?;
        let mut request =
            request.ok_or_else(|| Error::NotFound("Friend request not found".to_string()))?;

        if request.recipient_id != user_id {
            warn!(
                "[Friends] {} tried to accept request {} addressed to {}",
                user_id, request_id, request.recipient_id
            );
            return Err(Error::Forbidden(
                "You are not authorized to accept this request".to_string(),
            ));
        }
        if request.status == RequestStatus::Accepted {
            return Err(already_accepted());
        }

        let now = Utc::now();
        let updated = sqlx::query(
            "UPDATE friend_requests SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(RequestStatus::Accepted)
        .bind(now)
        .bind(request_id)
        .bind(RequestStatus::Pending)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() != 1 {
            return Err(already_accepted());
        }

        for (user, friend) in [
            (&request.sender_id, &request.recipient_id),
            (&request.recipient_id, &request.sender_id),
        ] {
            sqlx::query(
                "INSERT OR IGNORE INTO friendships (user_id, friend_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(user)
            .bind(friend)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        request.status = RequestStatus::Accepted;
        request.updated_at = now;

        info!(
            "[Friends] Request {} accepted: {} <-> {}",
            request.id, request.sender_id, request.recipient_id
        );

        Ok(request)
    }
}

fn request_exists() -> Error {
    Error::Conflict("A friend request already exists between you and this user".to_string())
}

fn already_accepted() -> Error {
    Error::Conflict("Friend request already accepted".to_string())
}
