// ABOUTME: Friend connection models for recipe sharing
// ABOUTME: Connection lifecycle and friend list views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use nutrilog_core::models::FriendStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;

/// A friend request or friendship between two users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendConnection {
    /// Unique identifier for this connection
    pub id: Uuid,
    /// User who sent the request
    pub initiator_id: Uuid,
    /// User who received the request
    pub receiver_id: Uuid,
    /// Current status
    pub status: FriendStatus,
    /// When the request was created
    pub created_at: DateTime<Utc>,
    /// When the connection was last updated
    pub updated_at: DateTime<Utc>,
    /// When the request was accepted
    pub accepted_at: Option<DateTime<Utc>>,
}

impl FriendConnection {
    /// Create a new pending friend connection
    #[must_use]
    pub fn new(initiator_id: Uuid, receiver_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            initiator_id,
            receiver_id,
            status: FriendStatus::Pending,
            created_at: now,
            updated_at: now,
            accepted_at: None,
        }
    }

    /// Check if the given user is part of this connection
    #[must_use]
    pub fn involves_user(&self, user_id: Uuid) -> bool {
        self.initiator_id == user_id || self.receiver_id == user_id
    }

    /// The other user in this connection
    #[must_use]
    pub fn other_user(&self, user_id: Uuid) -> Uuid {
        if self.initiator_id == user_id {
            self.receiver_id
        } else {
            self.initiator_id
        }
    }
}

/// A connection as seen by one of its users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendInfo {
    /// Connection identifier, used to accept, decline, or remove
    pub connection_id: Uuid,
    /// The other user
    pub user: UserSummary,
    /// Connection status
    pub status: FriendStatus,
    /// When the request was created
    pub requested_at: DateTime<Utc>,
    /// When the request was accepted
    pub friends_since: Option<DateTime<Utc>>,
}

/// Pending requests split by direction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequests {
    /// Requests the user sent
    pub sent: Vec<FriendInfo>,
    /// Requests the user received
    pub received: Vec<FriendInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_user() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conn = FriendConnection::new(a, b);
        assert_eq!(conn.other_user(a), b);
        assert_eq!(conn.other_user(b), a);
        assert!(conn.involves_user(a));
        assert!(!conn.involves_user(Uuid::new_v4()));
        assert_eq!(conn.status, FriendStatus::Pending);
    }
}
