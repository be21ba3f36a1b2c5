//! Posts and their validated value types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{PostId, UserId};
use super::vote_summary::VoteSummary;

/// Validation errors returned by the post value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// Title was blank after trimming.
    EmptyTitle,
    /// Title exceeded the allowed length.
    TitleTooLong { max: usize },
    /// Content exceeded the allowed length.
    ContentTooLong { max: usize },
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "a post must have a title"),
            Self::TitleTooLong { max } => {
                write!(f, "a post title can have at most {max} characters")
            }
            Self::ContentTooLong { max } => {
                write!(f, "post content must not be longer than {max} characters")
            }
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Maximum allowed length for a post title.
pub const POST_TITLE_MAX: usize = 300;
/// Maximum allowed length for post content.
pub const POST_CONTENT_MAX: usize = 3000;

/// Post headline, trimmed, between 1 and [`POST_TITLE_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostTitle(String);

impl PostTitle {
    /// Validate and construct a [`PostTitle`].
    pub fn new(title: impl Into<String>) -> Result<Self, PostValidationError> {
        let trimmed = title.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > POST_TITLE_MAX {
            return Err(PostValidationError::TitleTooLong {
                max: POST_TITLE_MAX,
            });
        }
        Ok(Self(trimmed))
    }
}

impl AsRef<str> for PostTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PostTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PostTitle> for String {
    fn from(value: PostTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostTitle {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Post body, at most [`POST_CONTENT_MAX`] characters; may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub struct PostContent(String);

impl PostContent {
    /// Validate and construct [`PostContent`].
    pub fn new(content: impl Into<String>) -> Result<Self, PostValidationError> {
        let raw = content.into();
        if raw.chars().count() > POST_CONTENT_MAX {
            return Err(PostValidationError::ContentTooLong {
                max: POST_CONTENT_MAX,
            });
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for PostContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PostContent> for String {
    fn from(value: PostContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostContent {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A published post.
///
/// ## Invariants
/// - `votes` and `comment_count` are caches, written only by the recompute
///   step after a vote or comment mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Stable identifier.
    #[schema(value_type = String)]
    pub id: PostId,
    /// Owning user.
    #[schema(value_type = String)]
    pub author: UserId,
    /// Headline.
    #[schema(value_type = String, example = "Hello world")]
    pub title: PostTitle,
    /// Body text.
    #[schema(value_type = String)]
    pub content: PostContent,
    /// Publication time.
    pub created_at: DateTime<Utc>,
    /// Derived vote tallies.
    pub votes: VoteSummary,
    /// Derived number of comments.
    pub comment_count: u64,
}

impl Post {
    /// Build a fresh post with a random identifier and zeroed caches.
    pub fn new(author: UserId, title: PostTitle, content: PostContent) -> Self {
        Self {
            id: PostId::random(),
            author,
            title,
            content,
            created_at: Utc::now(),
            votes: VoteSummary::zero(),
            comment_count: 0,
        }
    }
}
