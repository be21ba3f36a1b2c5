//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Store`, [`CredentialHasher`], [`Mailer`]) describe how the
//! domain expects to talk to adapters; driving ports (`*Command`, `*Query`)
//! are the use-cases inbound adapters invoke. Every port ships a fixture
//! implementation and, under test, a mockall mock.

mod macros;
pub(crate) use macros::define_port_error;

mod account_api;
mod comment_api;
mod comment_store;
mod credential_hasher;
mod follow_api;
mod follow_graph_store;
mod mailer;
mod post_api;
mod post_store;
mod user_store;
mod vote_api;
mod vote_edge_store;

#[cfg(test)]
pub use account_api::{MockAccountCommand, MockAccountQuery};
pub use account_api::{
    AccountCommand, AccountQuery, FIXTURE_USER_ID, FixtureAccountCommand, FixtureAccountQuery,
};
#[cfg(test)]
pub use comment_api::{MockCommentCommand, MockCommentQuery};
pub use comment_api::{
    CommentCommand, CommentQuery, FixtureCommentCommand, FixtureCommentQuery, NewComment,
};
#[cfg(test)]
pub use comment_store::MockCommentStore;
pub use comment_store::{CommentStore, CommentStoreError, FixtureCommentStore};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, FixtureCredentialHasher, IssuedResetToken};
#[cfg(test)]
pub use follow_api::{MockFollowCommand, MockFollowQuery};
pub use follow_api::{
    FixtureFollowCommand, FixtureFollowQuery, FollowChange, FollowCommand, FollowQuery,
};
#[cfg(test)]
pub use follow_graph_store::MockFollowGraphStore;
pub use follow_graph_store::{FixtureFollowGraphStore, FollowGraphStore, FollowStoreError};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{FixtureMailer, Mailer, MailerError};
#[cfg(test)]
pub use post_api::{MockPostCommand, MockPostQuery};
pub use post_api::{FixturePostCommand, FixturePostQuery, NewPost, PostCommand, PostQuery};
#[cfg(test)]
pub use post_store::MockPostStore;
pub use post_store::{FixturePostStore, PostPatch, PostStore, PostStoreError};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{FixtureUserStore, UserStore, UserStoreError};
#[cfg(test)]
pub use vote_api::{MockVoteCommand, MockVoteQuery};
pub use vote_api::{CastVote, FixtureVoteCommand, FixtureVoteQuery, VoteCommand, VoteQuery};
#[cfg(test)]
pub use vote_edge_store::MockVoteEdgeStore;
pub use vote_edge_store::{FixtureVoteEdgeStore, VoteEdgeStore, VoteStoreError};
