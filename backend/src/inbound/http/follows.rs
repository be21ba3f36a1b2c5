//! Follow-graph API handlers.
//!
//! ```text
//! POST   /api/v1/following/{userId}   follow a user
//! DELETE /api/v1/following/{userId}   unfollow a user
//! DELETE /api/v1/followers/{userId}   remove a follower
//! GET    /api/v1/users/{id}/following
//! GET    /api/v1/users/{id}/followers
//! ```
//!
//! The response carries both mirror lists; front-ends should rely on
//! membership rather than the denormalised counters, which may lag by one
//! recompute.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;

use crate::domain::ports::{FollowCommand, FollowQuery};
use crate::domain::{DomainError, FollowList, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Both mirror lists after a follow mutation.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowChangeResponse {
    /// The caller's following list.
    #[schema(value_type = Object)]
    pub following: FollowList,
    /// The followee's followers list.
    #[schema(value_type = Object)]
    pub followers: FollowList,
}

/// Follow another user.
#[utoipa::path(
    post,
    path = "/api/v1/following/{userId}",
    responses(
        (status = 200, description = "Now following", body = FollowChangeResponse),
        (status = 401, description = "Unauthorised or self-follow", body = DomainError)
    ),
    params(("userId" = String, Path, description = "User to follow")),
    tags = ["follows"],
    operation_id = "follow"
)]
#[post("/following/{userId}")]
pub async fn follow(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<FollowChangeResponse>> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let followee: UserId = parse_id(FieldName::new("userId"), path.into_inner())?;

    let change = state.follow_commands.follow(&actor, &followee).await?;
    Ok(web::Json(FollowChangeResponse {
        following: change.following,
        followers: change.followers,
    }))
}

/// Stop following a user; removing an absent edge succeeds quietly.
#[utoipa::path(
    delete,
    path = "/api/v1/following/{userId}",
    responses(
        (status = 204, description = "No longer following"),
        (status = 401, description = "Unauthorised", body = DomainError)
    ),
    params(("userId" = String, Path, description = "User to unfollow")),
    tags = ["follows"],
    operation_id = "unfollow"
)]
#[delete("/following/{userId}")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let followee: UserId = parse_id(FieldName::new("userId"), path.into_inner())?;
    state.follow_commands.unfollow(&actor, &followee).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a user from the caller's own followers.
#[utoipa::path(
    delete,
    path = "/api/v1/followers/{userId}",
    responses(
        (status = 204, description = "Follower removed"),
        (status = 401, description = "Unauthorised", body = DomainError)
    ),
    params(("userId" = String, Path, description = "Follower to remove")),
    tags = ["follows"],
    operation_id = "removeFollower"
)]
#[delete("/followers/{userId}")]
pub async fn remove_follower(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let follower: UserId = parse_id(FieldName::new("userId"), path.into_inner())?;
    state
        .follow_commands
        .remove_follower(&actor, &follower)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The users a user follows.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/following",
    responses((status = 200, description = "Following list")),
    params(("id" = String, Path, description = "User id")),
    tags = ["follows"],
    operation_id = "listFollowing"
)]
#[get("/users/{id}/following")]
pub async fn list_following(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<FollowList>> {
    require_actor(&session, state.accounts.as_ref()).await?;
    let user: UserId = parse_id(FieldName::new("id"), path.into_inner())?;
    let list = state.follows.following_of(&user).await?;
    Ok(web::Json(list))
}

/// The users following a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/followers",
    responses((status = 200, description = "Followers list")),
    params(("id" = String, Path, description = "User id")),
    tags = ["follows"],
    operation_id = "listFollowers"
)]
#[get("/users/{id}/followers")]
pub async fn list_followers(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<FollowList>> {
    require_actor(&session, state.accounts.as_ref()).await?;
    let user: UserId = parse_id(FieldName::new("id"), path.into_inner())?;
    let list = state.follows.followers_of(&user).await?;
    Ok(web::Json(list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{in_memory_app, signup_and_login};
    use crate::test_support::in_memory_state;
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::Value;

    async fn follow_req(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        followee: &UserId,
    ) -> actix_web::dev::ServiceResponse {
        actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/following/{followee}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await
    }

    async fn fetch_profile(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        user: &UserId,
    ) -> Value {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/users/{user}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        actix_test::read_body_json(response).await
    }

    #[actix_web::test]
    async fn self_follow_is_refused() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, ada_id) = signup_and_login(&app, "Ada", "ada@example.com").await;

        let response = follow_req(&app, &ada, &ada_id).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("you cannot follow yourself")
        );
    }

    #[actix_web::test]
    async fn follow_updates_both_mirrors_and_the_counters() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, ada_id) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let (_eve, eve_id) = signup_and_login(&app, "Eve", "eve@example.com").await;

        let response = follow_req(&app, &ada, &eve_id).await;
        assert!(response.status().is_success());
        let body: Value = actix_test::read_body_json(response).await;
        let following = body
            .get("following")
            .and_then(|list| list.get("members"))
            .and_then(Value::as_array)
            .expect("following members");
        assert!(following.iter().any(|id| id == &Value::from(eve_id.to_string())));

        let profile = fetch_profile(&app, &ada, &eve_id).await;
        let stats = profile.get("followStats").expect("follow stats");
        assert_eq!(stats.get("followers").and_then(Value::as_u64), Some(1));
        assert_eq!(stats.get("following").and_then(Value::as_u64), Some(0));

        let profile = fetch_profile(&app, &ada, &ada_id).await;
        let stats = profile.get("followStats").expect("follow stats");
        assert_eq!(stats.get("following").and_then(Value::as_u64), Some(1));
    }

    #[actix_web::test]
    async fn unfollow_is_idempotent_and_resets_counters() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let (_eve, eve_id) = signup_and_login(&app, "Eve", "eve@example.com").await;

        follow_req(&app, &ada, &eve_id).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/following/{eve_id}"))
                .cookie(ada.clone())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let profile = fetch_profile(&app, &ada, &eve_id).await;
        let stats = profile.get("followStats").expect("follow stats");
        assert_eq!(stats.get("followers").and_then(Value::as_u64), Some(0));

        // Repeating the unfollow still succeeds.
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/following/{eve_id}"))
                .cookie(ada)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
