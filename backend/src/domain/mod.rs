//! Domain primitives, ports, and services.
//!
//! Purpose: define strongly typed domain entities used by the API and
//! persistence layers, the ports at the hexagon's edges, and the services
//! that keep derived aggregate fields consistent with their child records.

pub mod access;
pub mod account_service;
pub mod auth;
pub mod comment;
pub mod comment_service;
pub mod error;
pub mod follow;
pub mod follow_service;
pub mod ids;
pub mod pagination;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod user;
pub mod vote;
pub mod vote_service;
pub mod vote_summary;

pub use self::access::{Actor, gate_account};
pub use self::account_service::AccountService;
pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MIN, Password, SignupDetails,
};
pub use self::comment::{COMMENT_BODY_MAX, Comment, CommentBody, CommentValidationError};
pub use self::comment_service::CommentService;
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::follow::{FollowList, FollowStats};
pub use self::follow_service::FollowService;
pub use self::ids::{CommentId, IdValidationError, PostId, UserId, VoteId};
pub use self::pagination::Page;
pub use self::post::{
    POST_CONTENT_MAX, POST_TITLE_MAX, Post, PostContent, PostTitle, PostValidationError,
};
pub use self::post_service::PostService;
pub use self::user::{
    EmailAddress, ResetTokenRecord, Role, USER_NAME_MAX, User, UserAccount, UserName,
    UserValidationError,
};
pub use self::vote::{TargetRef, VoteDirection, VoteEdge, VoteValidationError};
pub use self::vote_service::VoteService;
pub use self::vote_summary::VoteSummary;

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, DomainError};
///
/// fn refuse() -> ApiResult<()> {
///     Err(DomainError::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, DomainError>;
