//! Comments on posts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{CommentId, PostId, UserId};
use super::vote_summary::VoteSummary;

/// Validation errors returned by the comment value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    /// Body was blank after trimming.
    EmptyBody,
    /// Body exceeded the allowed length.
    BodyTooLong { max: usize },
}

impl fmt::Display for CommentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "a comment must have content"),
            Self::BodyTooLong { max } => {
                write!(f, "a comment must not be longer than {max} characters")
            }
        }
    }
}

impl std::error::Error for CommentValidationError {}

/// Maximum allowed length for a comment body.
pub const COMMENT_BODY_MAX: usize = 3000;

/// Comment text, non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentBody(String);

impl CommentBody {
    /// Validate and construct a [`CommentBody`].
    pub fn new(body: impl Into<String>) -> Result<Self, CommentValidationError> {
        let raw = body.into();
        if raw.trim().is_empty() {
            return Err(CommentValidationError::EmptyBody);
        }
        if raw.chars().count() > COMMENT_BODY_MAX {
            return Err(CommentValidationError::BodyTooLong {
                max: COMMENT_BODY_MAX,
            });
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for CommentBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CommentBody> for String {
    fn from(value: CommentBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentBody {
    type Error = CommentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A comment under a post.
///
/// ## Invariants
/// - One comment per `(post, author)`; the store enforces this.
/// - `votes` is a cache written only by the vote recompute step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Stable identifier.
    #[schema(value_type = String)]
    pub id: CommentId,
    /// Owning user.
    #[schema(value_type = String)]
    pub author: UserId,
    /// Parent post.
    #[schema(value_type = String)]
    pub post: PostId,
    /// Comment text.
    #[schema(value_type = String)]
    pub body: CommentBody,
    /// Publication time.
    pub created_at: DateTime<Utc>,
    /// Derived vote tallies.
    pub votes: VoteSummary,
}

impl Comment {
    /// Build a fresh comment with a random identifier and a zeroed summary.
    pub fn new(author: UserId, post: PostId, body: CommentBody) -> Self {
        Self {
            id: CommentId::random(),
            author,
            post,
            body,
            created_at: Utc::now(),
            votes: VoteSummary::zero(),
        }
    }
}
