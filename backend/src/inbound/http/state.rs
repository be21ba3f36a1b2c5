//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, CommentCommand, CommentQuery, FixtureAccountCommand,
    FixtureAccountQuery, FixtureCommentCommand, FixtureCommentQuery, FixtureFollowCommand,
    FixtureFollowQuery, FixturePostCommand, FixturePostQuery, FixtureVoteCommand, FixtureVoteQuery,
    FollowCommand, FollowQuery, PostCommand, PostQuery, VoteCommand, VoteQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Signup, login, and the password lifecycle.
    pub account_commands: Arc<dyn AccountCommand>,
    /// Account reads and the authentication gate.
    pub accounts: Arc<dyn AccountQuery>,
    /// Post mutations.
    pub post_commands: Arc<dyn PostCommand>,
    /// Post reads.
    pub posts: Arc<dyn PostQuery>,
    /// Comment mutations.
    pub comment_commands: Arc<dyn CommentCommand>,
    /// Comment reads.
    pub comments: Arc<dyn CommentQuery>,
    /// Vote mutations.
    pub vote_commands: Arc<dyn VoteCommand>,
    /// Vote reads.
    pub votes: Arc<dyn VoteQuery>,
    /// Follow mutations.
    pub follow_commands: Arc<dyn FollowCommand>,
    /// Follow reads.
    pub follows: Arc<dyn FollowQuery>,
}

impl HttpState {
    /// State wired entirely to fixtures, for handler tests that only care
    /// about one port (override the relevant field).
    pub fn fixtures() -> Self {
        Self {
            account_commands: Arc::new(FixtureAccountCommand),
            accounts: Arc::new(FixtureAccountQuery),
            post_commands: Arc::new(FixturePostCommand),
            posts: Arc::new(FixturePostQuery),
            comment_commands: Arc::new(FixtureCommentCommand),
            comments: Arc::new(FixtureCommentQuery),
            vote_commands: Arc::new(FixtureVoteCommand),
            votes: Arc::new(FixtureVoteQuery),
            follow_commands: Arc::new(FixtureFollowCommand),
            follows: Arc::new(FixtureFollowQuery),
        }
    }
}
