//! Vote edges: one persisted row per user and target.
//!
//! A direction of zero is a real, stored state: the user explicitly withdrew
//! their vote. It is distinct from "never voted", where no edge exists at
//! all, and it counts in neither tally.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{CommentId, PostId, UserId, VoteId};

/// Validation errors for vote payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteValidationError {
    /// Direction was outside the [-1, 1] range.
    DirectionOutOfRange { value: i64 },
}

impl fmt::Display for VoteValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectionOutOfRange { value } => {
                write!(f, "{value} is not a valid vote direction (-1, 0, or 1)")
            }
        }
    }
}

impl std::error::Error for VoteValidationError {}

/// The three persisted vote states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteDirection {
    /// A dislike.
    Down,
    /// An explicitly withdrawn vote; stored, but tallied in neither bucket.
    Cleared,
    /// A like.
    Up,
}

impl VoteDirection {
    /// Signed integer representation used on the wire and in storage.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Down => -1,
            Self::Cleared => 0,
            Self::Up => 1,
        }
    }
}

impl TryFrom<i64> for VoteDirection {
    type Error = VoteValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Down),
            0 => Ok(Self::Cleared),
            1 => Ok(Self::Up),
            other => Err(VoteValidationError::DirectionOutOfRange { value: other }),
        }
    }
}

impl From<VoteDirection> for i64 {
    fn from(value: VoteDirection) -> Self {
        value.as_i64()
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// The parent a vote edge points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum TargetRef {
    /// A vote on a post.
    Post(PostId),
    /// A vote on a comment.
    Comment(CommentId),
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post(id) => write!(f, "post:{id}"),
            Self::Comment(id) => write!(f, "comment:{id}"),
        }
    }
}

/// A single user's vote on a single target.
///
/// ## Invariants
/// - Unique per `(user, target)`; the store enforces this.
/// - `direction` is one of the three persisted states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteEdge {
    /// Edge identifier.
    #[schema(value_type = String)]
    pub id: VoteId,
    /// The voting user.
    #[schema(value_type = String)]
    pub user: UserId,
    /// The post or comment voted on.
    #[schema(value_type = Object)]
    pub target: TargetRef,
    /// Current vote state.
    #[schema(value_type = i64, minimum = -1, maximum = 1)]
    pub direction: VoteDirection,
}

impl VoteEdge {
    /// Build a fresh edge with a random identifier.
    pub fn new(user: UserId, target: TargetRef, direction: VoteDirection) -> Self {
        Self {
            id: VoteId::random(),
            user,
            target,
            direction,
        }
    }
}
