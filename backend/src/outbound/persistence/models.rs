//! Row types bridging Diesel and the domain.
//!
//! Conversions out of the database are lenient where serving beats failing:
//! an unknown role label degrades to `user` with a warning rather than
//! erroring the read. Value constraints (title length and the like) are
//! enforced on the way in, so reads go through the validating constructors
//! only where corruption would otherwise propagate.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    Comment, CommentBody, CommentId, EmailAddress, FollowStats, Post, PostContent, PostId,
    PostTitle, ResetTokenRecord, Role, TargetRef, User, UserAccount, UserId, UserName, VoteDirection,
    VoteEdge, VoteId, VoteSummary,
};

use super::schema::{comments, posts, users, vote_edges};

/// Conversion failures surfaced when a stored row no longer satisfies the
/// domain's value constraints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {entity} {id} is corrupt: {message}")]
pub struct RowConversionError {
    /// Entity label for the message.
    pub entity: &'static str,
    /// Offending row's id.
    pub id: Uuid,
    /// What failed to parse.
    pub message: String,
}

impl RowConversionError {
    fn new(entity: &'static str, id: Uuid, message: impl Into<String>) -> Self {
        Self {
            entity,
            id,
            message: message.into(),
        }
    }
}

/// Row shape for `users`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub user_name: String,
    /// Lowercased email.
    pub email: String,
    /// Role label.
    pub role: String,
    /// Ban reason, if banned.
    pub ban_reason: Option<String>,
    /// Salted password hash.
    pub password_hash: String,
    /// Pending reset-token hash.
    pub reset_token_hash: Option<String>,
    /// Reset-token expiry.
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    /// Derived following count.
    pub following_count: i64,
    /// Derived followers count.
    pub followers_count: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Flatten a domain account into a row.
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            id: *account.user.id.as_uuid(),
            user_name: account.user.name.as_ref().to_owned(),
            email: account.user.email.as_ref().to_owned(),
            role: account.user.role.as_str().to_owned(),
            ban_reason: account.user.ban_reason.clone(),
            password_hash: account.password_hash.clone(),
            reset_token_hash: account
                .reset_token
                .as_ref()
                .map(|record| record.token_hash.clone()),
            reset_token_expires_at: account.reset_token.as_ref().map(|record| record.expires_at),
            following_count: account.user.follow_stats.following as i64,
            followers_count: account.user.follow_stats.followers as i64,
            created_at: account.user.created_at,
        }
    }

    /// Rebuild the domain account from a row.
    pub fn into_account(self) -> Result<UserAccount, RowConversionError> {
        let role = Role::parse(&self.role).unwrap_or_else(|error| {
            warn!(user = %self.id, error = %error, "unrecognised role label, defaulting to user");
            Role::User
        });
        let name = UserName::new(self.user_name)
            .map_err(|error| RowConversionError::new("user", self.id, error.to_string()))?;
        let email = EmailAddress::new(self.email)
            .map_err(|error| RowConversionError::new("user", self.id, error.to_string()))?;
        let reset_token = match (self.reset_token_hash, self.reset_token_expires_at) {
            (Some(token_hash), Some(expires_at)) => Some(ResetTokenRecord {
                token_hash,
                expires_at,
            }),
            _ => None,
        };

        Ok(UserAccount {
            user: User {
                id: UserId::from_uuid(self.id),
                name,
                email,
                role,
                ban_reason: self.ban_reason,
                created_at: self.created_at,
                follow_stats: FollowStats {
                    following: self.following_count.max(0) as u64,
                    followers: self.followers_count.max(0) as u64,
                },
            },
            password_hash: self.password_hash,
            reset_token,
        })
    }
}

/// Row shape for `posts`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning user.
    pub author_id: Uuid,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
    /// Derived up votes.
    pub likes: i64,
    /// Derived down votes.
    pub dislikes: i64,
    /// Derived total.
    pub total_votes: i64,
    /// Derived like share.
    pub like_percentage: f64,
    /// Derived comment count.
    pub comment_count: i64,
}

fn summary_from_columns(likes: i64, dislikes: i64, total: i64, percentage: f64) -> VoteSummary {
    VoteSummary {
        likes: likes.max(0) as u64,
        dislikes: dislikes.max(0) as u64,
        total_votes: total.max(0) as u64,
        like_percentage: percentage,
    }
}

impl PostRow {
    /// Flatten a domain post into a row.
    pub fn from_post(post: &Post) -> Self {
        Self {
            id: *post.id.as_uuid(),
            author_id: *post.author.as_uuid(),
            title: post.title.as_ref().to_owned(),
            content: post.content.as_ref().to_owned(),
            created_at: post.created_at,
            likes: post.votes.likes as i64,
            dislikes: post.votes.dislikes as i64,
            total_votes: post.votes.total_votes as i64,
            like_percentage: post.votes.like_percentage,
            comment_count: post.comment_count as i64,
        }
    }

    /// Rebuild the domain post from a row.
    pub fn into_post(self) -> Result<Post, RowConversionError> {
        let title = PostTitle::new(self.title)
            .map_err(|error| RowConversionError::new("post", self.id, error.to_string()))?;
        let content = PostContent::new(self.content)
            .map_err(|error| RowConversionError::new("post", self.id, error.to_string()))?;

        Ok(Post {
            id: PostId::from_uuid(self.id),
            author: UserId::from_uuid(self.author_id),
            title,
            content,
            created_at: self.created_at,
            votes: summary_from_columns(
                self.likes,
                self.dislikes,
                self.total_votes,
                self.like_percentage,
            ),
            comment_count: self.comment_count.max(0) as u64,
        })
    }
}

/// Row shape for `comments`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning user.
    pub author_id: Uuid,
    /// Parent post.
    pub post_id: Uuid,
    /// Comment text.
    pub body: String,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
    /// Derived up votes.
    pub likes: i64,
    /// Derived down votes.
    pub dislikes: i64,
    /// Derived total.
    pub total_votes: i64,
    /// Derived like share.
    pub like_percentage: f64,
}

impl CommentRow {
    /// Flatten a domain comment into a row.
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            id: *comment.id.as_uuid(),
            author_id: *comment.author.as_uuid(),
            post_id: *comment.post.as_uuid(),
            body: comment.body.as_ref().to_owned(),
            created_at: comment.created_at,
            likes: comment.votes.likes as i64,
            dislikes: comment.votes.dislikes as i64,
            total_votes: comment.votes.total_votes as i64,
            like_percentage: comment.votes.like_percentage,
        }
    }

    /// Rebuild the domain comment from a row.
    pub fn into_comment(self) -> Result<Comment, RowConversionError> {
        let body = CommentBody::new(self.body)
            .map_err(|error| RowConversionError::new("comment", self.id, error.to_string()))?;

        Ok(Comment {
            id: CommentId::from_uuid(self.id),
            author: UserId::from_uuid(self.author_id),
            post: PostId::from_uuid(self.post_id),
            body,
            created_at: self.created_at,
            votes: summary_from_columns(
                self.likes,
                self.dislikes,
                self.total_votes,
                self.like_percentage,
            ),
        })
    }
}

/// Storage label for post targets.
pub const TARGET_KIND_POST: &str = "post";
/// Storage label for comment targets.
pub const TARGET_KIND_COMMENT: &str = "comment";

/// Split a target reference into its storage columns.
pub fn target_columns(target: &TargetRef) -> (&'static str, Uuid) {
    match target {
        TargetRef::Post(id) => (TARGET_KIND_POST, *id.as_uuid()),
        TargetRef::Comment(id) => (TARGET_KIND_COMMENT, *id.as_uuid()),
    }
}

/// Row shape for `vote_edges`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = vote_edges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VoteEdgeRow {
    /// Primary key.
    pub id: Uuid,
    /// The voting user.
    pub user_id: Uuid,
    /// Target discriminator.
    pub target_kind: String,
    /// Target identifier.
    pub target_id: Uuid,
    /// Direction in [-1, 1].
    pub direction: i16,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl VoteEdgeRow {
    /// Rebuild the domain edge from a row.
    pub fn into_edge(self) -> Result<VoteEdge, RowConversionError> {
        let target = match self.target_kind.as_str() {
            TARGET_KIND_POST => TargetRef::Post(PostId::from_uuid(self.target_id)),
            TARGET_KIND_COMMENT => TargetRef::Comment(CommentId::from_uuid(self.target_id)),
            other => {
                return Err(RowConversionError::new(
                    "vote",
                    self.id,
                    format!("unknown target kind: {other}"),
                ));
            }
        };
        let direction = VoteDirection::try_from(i64::from(self.direction))
            .map_err(|error| RowConversionError::new("vote", self.id, error.to_string()))?;

        Ok(VoteEdge {
            id: VoteId::from_uuid(self.id),
            user: UserId::from_uuid(self.user_id),
            target,
            direction,
        })
    }
}
