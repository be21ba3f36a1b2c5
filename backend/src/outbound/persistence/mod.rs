//! PostgreSQL persistence adapters built on Diesel.

mod diesel_comment_store;
mod diesel_follow_graph_store;
mod diesel_helpers;
mod diesel_post_store;
mod diesel_user_store;
mod diesel_vote_edge_store;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_comment_store::DieselCommentStore;
pub use diesel_follow_graph_store::DieselFollowGraphStore;
pub use diesel_post_store::DieselPostStore;
pub use diesel_user_store::DieselUserStore;
pub use diesel_vote_edge_store::DieselVoteEdgeStore;
pub use pool::{DbPool, PoolConfig, PoolError};
