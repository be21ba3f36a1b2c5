//! Vote API handlers.
//!
//! ```text
//! POST   /api/v1/posts/{postId}/votes
//! GET    /api/v1/posts/{postId}/votes
//! POST   /api/v1/comments/{commentId}/votes
//! GET    /api/v1/comments/{commentId}/votes
//! GET    /api/v1/votes/{id}
//! PATCH  /api/v1/votes/{id}
//! DELETE /api/v1/votes/{id}
//! ```
//!
//! Casting is an upsert: re-voting on the same target moves the existing
//! edge. A direction of `0` withdraws the vote but keeps the row.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CastVote, VoteCommand, VoteQuery};
use crate::domain::{CommentId, DomainError, Page, PostId, TargetRef, VoteEdge, VoteId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_direction, parse_id};

/// Vote request body: `1` like, `-1` dislike, `0` withdraw.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// Vote direction as a signed integer in `[-1, 1]`.
    #[schema(example = 1, minimum = -1, maximum = 1)]
    pub direction: i64,
}

async fn cast_on_target(
    state: &HttpState,
    session: &SessionContext,
    target: TargetRef,
    payload: VoteRequest,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(session, state.accounts.as_ref()).await?;
    let direction = parse_direction(FieldName::new("direction"), payload.direction)?;
    let edge = state
        .vote_commands
        .cast(&actor, CastVote { target, direction })
        .await?;
    Ok(HttpResponse::Created().json(edge))
}

/// Cast or move the caller's vote on a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{postId}/votes",
    request_body = VoteRequest,
    responses(
        (status = 201, description = "Vote recorded", body = VoteEdge),
        (status = 400, description = "Invalid direction", body = DomainError),
        (status = 404, description = "Post not found", body = DomainError)
    ),
    params(("postId" = String, Path, description = "Post id")),
    tags = ["votes"],
    operation_id = "voteOnPost"
)]
#[post("/posts/{postId}/votes")]
pub async fn vote_on_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<HttpResponse> {
    let post: PostId = parse_id(FieldName::new("postId"), path.into_inner())?;
    cast_on_target(&state, &session, TargetRef::Post(post), *payload).await
}

/// Cast or move the caller's vote on a comment.
#[utoipa::path(
    post,
    path = "/api/v1/comments/{commentId}/votes",
    request_body = VoteRequest,
    responses(
        (status = 201, description = "Vote recorded", body = VoteEdge),
        (status = 400, description = "Invalid direction", body = DomainError),
        (status = 404, description = "Comment not found", body = DomainError)
    ),
    params(("commentId" = String, Path, description = "Comment id")),
    tags = ["votes"],
    operation_id = "voteOnComment"
)]
#[post("/comments/{commentId}/votes")]
pub async fn vote_on_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<HttpResponse> {
    let comment: CommentId = parse_id(FieldName::new("commentId"), path.into_inner())?;
    cast_on_target(&state, &session, TargetRef::Comment(comment), *payload).await
}

/// Page through the votes on a post.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{postId}/votes",
    responses((status = 200, description = "Votes", body = [VoteEdge])),
    params(
        ("postId" = String, Path, description = "Post id"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Records per page")
    ),
    tags = ["votes"],
    operation_id = "listPostVotes",
    security([])
)]
#[get("/posts/{postId}/votes")]
pub async fn list_post_votes(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    page: web::Query<Page>,
) -> ApiResult<web::Json<Vec<VoteEdge>>> {
    let post: PostId = parse_id(FieldName::new("postId"), path.into_inner())?;
    let votes = state
        .votes
        .list_for_target(&TargetRef::Post(post), *page)
        .await?;
    Ok(web::Json(votes))
}

/// Page through the votes on a comment.
#[utoipa::path(
    get,
    path = "/api/v1/comments/{commentId}/votes",
    responses((status = 200, description = "Votes", body = [VoteEdge])),
    params(
        ("commentId" = String, Path, description = "Comment id"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Records per page")
    ),
    tags = ["votes"],
    operation_id = "listCommentVotes",
    security([])
)]
#[get("/comments/{commentId}/votes")]
pub async fn list_comment_votes(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    page: web::Query<Page>,
) -> ApiResult<web::Json<Vec<VoteEdge>>> {
    let comment: CommentId = parse_id(FieldName::new("commentId"), path.into_inner())?;
    let votes = state
        .votes
        .list_for_target(&TargetRef::Comment(comment), *page)
        .await?;
    Ok(web::Json(votes))
}

/// Fetch a single vote edge.
#[utoipa::path(
    get,
    path = "/api/v1/votes/{id}",
    responses(
        (status = 200, description = "Vote", body = VoteEdge),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Vote id")),
    tags = ["votes"],
    operation_id = "getVote"
)]
#[get("/votes/{id}")]
pub async fn get_vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<VoteEdge>> {
    require_actor(&session, state.accounts.as_ref()).await?;
    let id: VoteId = parse_id(FieldName::new("id"), path.into_inner())?;
    let edge = state.votes.get(&id).await?;
    Ok(web::Json(edge))
}

/// Change a vote's direction (owner or admin only).
#[utoipa::path(
    patch,
    path = "/api/v1/votes/{id}",
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Updated vote", body = VoteEdge),
        (status = 401, description = "Not the owner", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Vote id")),
    tags = ["votes"],
    operation_id = "updateVote"
)]
#[patch("/votes/{id}")]
pub async fn update_vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<web::Json<VoteEdge>> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let id: VoteId = parse_id(FieldName::new("id"), path.into_inner())?;
    let direction = parse_direction(FieldName::new("direction"), payload.direction)?;
    let edge = state.vote_commands.change(&actor, &id, direction).await?;
    Ok(web::Json(edge))
}

/// Remove a vote edge entirely (owner or admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/votes/{id}",
    responses(
        (status = 204, description = "Vote deleted"),
        (status = 401, description = "Not the owner", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Vote id")),
    tags = ["votes"],
    operation_id = "deleteVote"
)]
#[delete("/votes/{id}")]
pub async fn delete_vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let id: VoteId = parse_id(FieldName::new("id"), path.into_inner())?;
    state.vote_commands.retract(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{create_post_for, in_memory_app, signup_and_login};
    use crate::test_support::in_memory_state;
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::Value;

    async fn vote_on(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        post_id: &str,
        direction: i64,
    ) -> actix_web::dev::ServiceResponse {
        actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/posts/{post_id}/votes"))
                .cookie(cookie.clone())
                .set_json(VoteRequest { direction })
                .to_request(),
        )
        .await
    }

    async fn fetch_votes(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        post_id: &str,
    ) -> Value {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(response).await;
        body.get("votes").expect("votes summary").clone()
    }

    #[actix_web::test]
    async fn out_of_range_direction_is_a_bad_request() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let post_id = create_post_for(&app, &ada, "Vote here").await;

        let response = vote_on(&app, &ada, &post_id, 2).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            fetch_votes(&app, &post_id)
                .await
                .get("totalVotes")
                .and_then(Value::as_u64),
            Some(0)
        );
    }

    #[actix_web::test]
    async fn first_vote_yields_a_full_percentage() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let post_id = create_post_for(&app, &ada, "Vote here").await;

        let response = vote_on(&app, &ada, &post_id, 1).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let votes = fetch_votes(&app, &post_id).await;
        assert_eq!(votes.get("likes").and_then(Value::as_u64), Some(1));
        assert_eq!(votes.get("totalVotes").and_then(Value::as_u64), Some(1));
        assert_eq!(
            votes.get("likePercentage").and_then(Value::as_f64),
            Some(100.0)
        );
    }

    #[actix_web::test]
    async fn revoting_moves_the_edge_instead_of_duplicating_it() {
        let (state, handles) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let post_id = create_post_for(&app, &ada, "Vote here").await;

        vote_on(&app, &ada, &post_id, 1).await;
        vote_on(&app, &ada, &post_id, -1).await;

        let votes = fetch_votes(&app, &post_id).await;
        assert_eq!(votes.get("likes").and_then(Value::as_u64), Some(0));
        assert_eq!(votes.get("dislikes").and_then(Value::as_u64), Some(1));
        assert_eq!(votes.get("totalVotes").and_then(Value::as_u64), Some(1));

        // Exactly one stored edge for (user, post).
        use crate::domain::ports::VoteEdgeStore;
        let post = crate::domain::PostId::new(&post_id).expect("valid post id");
        let directions = handles
            .votes
            .directions_for(&TargetRef::Post(post))
            .await
            .expect("directions");
        assert_eq!(directions.len(), 1);
    }

    #[actix_web::test]
    async fn withdrawing_keeps_the_row_but_clears_the_tallies() {
        let (state, handles) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let post_id = create_post_for(&app, &ada, "Vote here").await;

        vote_on(&app, &ada, &post_id, 1).await;
        vote_on(&app, &ada, &post_id, 0).await;

        let votes = fetch_votes(&app, &post_id).await;
        assert_eq!(votes.get("totalVotes").and_then(Value::as_u64), Some(0));
        assert_eq!(
            votes.get("likePercentage").and_then(Value::as_f64),
            Some(0.0)
        );

        // An explicitly withdrawn vote is still a stored row.
        use crate::domain::ports::VoteEdgeStore;
        let post = crate::domain::PostId::new(&post_id).expect("valid post id");
        let directions = handles
            .votes
            .directions_for(&TargetRef::Post(post))
            .await
            .expect("directions");
        assert_eq!(directions.len(), 1);
    }

    #[actix_web::test]
    async fn stranger_cannot_delete_anothers_vote() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let post_id = create_post_for(&app, &ada, "Vote here").await;

        let response = vote_on(&app, &ada, &post_id, 1).await;
        let body: Value = actix_test::read_body_json(response).await;
        let vote_id = body.get("id").and_then(Value::as_str).expect("vote id");

        let (eve, _) = signup_and_login(&app, "Eve", "eve@example.com").await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/votes/{vote_id}"))
                .cookie(eve)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // The vote and its tally are untouched.
        let votes = fetch_votes(&app, &post_id).await;
        assert_eq!(votes.get("likes").and_then(Value::as_u64), Some(1));
    }
}
