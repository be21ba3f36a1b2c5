//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod comments;
pub mod error;
pub mod follows;
pub mod health;
pub mod posts;
pub mod session;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod votes;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` endpoint on a service config.
///
/// The caller provides the surrounding scope, session middleware, and
/// [`state::HttpState`] app data; this only wires the handlers, so the
/// server and tests share one routing table.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::signup)
        .service(users::login)
        .service(users::logout)
        .service(users::forgot_password)
        .service(users::reset_password)
        .service(users::update_password)
        .service(users::current_user)
        .service(users::list_users)
        .service(follows::follow)
        .service(follows::unfollow)
        .service(follows::remove_follower)
        .service(follows::list_following)
        .service(follows::list_followers)
        .service(posts::create_post)
        .service(posts::list_posts)
        .service(votes::vote_on_post)
        .service(votes::list_post_votes)
        .service(comments::create_comment)
        .service(comments::list_comments)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::delete_post)
        .service(votes::vote_on_comment)
        .service(votes::list_comment_votes)
        .service(comments::get_comment)
        .service(comments::update_comment)
        .service(comments::delete_comment)
        .service(votes::get_vote)
        .service(votes::update_vote)
        .service(votes::delete_vote)
        .service(users::get_user);
}
