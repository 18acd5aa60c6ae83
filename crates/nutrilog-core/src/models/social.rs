// ABOUTME: Social model enums for friend connections and recipe sharing
// ABOUTME: FriendStatus lifecycle and RecipeVisibility access levels
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Status of a friend connection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    /// Request sent, awaiting acceptance
    #[default]
    Pending,
    /// Both users have connected
    Accepted,
    /// Request was declined by receiver
    Declined,
}

impl FriendStatus {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Whether this status represents an active friendship
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl Display for FriendStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FriendStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            _ => Err(AppError::invalid_input(format!(
                "Invalid friend status: {s}"
            ))),
        }
    }
}

/// Who can see a recipe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecipeVisibility {
    /// Owner only
    #[default]
    Private,
    /// Owner and accepted friends
    Friends,
    /// Everyone
    Public,
}

impl RecipeVisibility {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Friends => "friends",
            Self::Public => "public",
        }
    }

    /// Whether a viewer with the given relationship may see the recipe
    #[must_use]
    pub const fn allows(&self, is_owner: bool, is_friend: bool) -> bool {
        match self {
            Self::Private => is_owner,
            Self::Friends => is_owner || is_friend,
            Self::Public => true,
        }
    }
}

impl Display for RecipeVisibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecipeVisibility {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "friends" => Ok(Self::Friends),
            "public" => Ok(Self::Public),
            _ => Err(AppError::invalid_input(format!(
                "Invalid recipe visibility: {s}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_rules() {
        assert!(RecipeVisibility::Private.allows(true, false));
        assert!(!RecipeVisibility::Private.allows(false, true));
        assert!(RecipeVisibility::Friends.allows(false, true));
        assert!(!RecipeVisibility::Friends.allows(false, false));
        assert!(RecipeVisibility::Public.allows(false, false));
    }

    #[test]
    fn test_friend_status_roundtrip() {
        for status in [
            FriendStatus::Pending,
            FriendStatus::Accepted,
            FriendStatus::Declined,
        ] {
            assert_eq!(status.as_str().parse::<FriendStatus>().unwrap(), status);
        }
        assert!("blocked".parse::<FriendStatus>().is_err());
    }
}
