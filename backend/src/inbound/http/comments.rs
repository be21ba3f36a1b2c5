//! Comment API handlers.
//!
//! ```text
//! POST   /api/v1/posts/{postId}/comments
//! GET    /api/v1/posts/{postId}/comments
//! GET    /api/v1/comments/{id}
//! PATCH  /api/v1/comments/{id}
//! DELETE /api/v1/comments/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CommentCommand, CommentQuery, NewComment};
use crate::domain::{Comment, CommentBody, CommentId, DomainError, Page, PostId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_id};

/// Comment creation/update request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Comment text.
    pub body: String,
}

fn parse_comment_body(raw: String) -> Result<CommentBody, DomainError> {
    CommentBody::new(raw).map_err(|error| invalid_field(FieldName::new("body"), error))
}

/// Comment on a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{postId}/comments",
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 404, description = "Post not found", body = DomainError),
        (status = 409, description = "Already commented", body = DomainError)
    ),
    params(("postId" = String, Path, description = "Post id")),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/posts/{postId}/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let post: PostId = parse_id(FieldName::new("postId"), path.into_inner())?;
    let body = parse_comment_body(payload.into_inner().body)?;

    let comment = state
        .comment_commands
        .create(&actor, NewComment { post, body })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Page through a post's comments, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{postId}/comments",
    responses((status = 200, description = "Comments", body = [Comment])),
    params(
        ("postId" = String, Path, description = "Post id"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Records per page")
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/posts/{postId}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    page: web::Query<Page>,
) -> ApiResult<web::Json<Vec<Comment>>> {
    let post: PostId = parse_id(FieldName::new("postId"), path.into_inner())?;
    let comments = state.comments.list_for_post(&post, *page).await?;
    Ok(web::Json(comments))
}

/// Fetch a single comment.
#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    responses(
        (status = 200, description = "Comment", body = Comment),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Comment id")),
    tags = ["comments"],
    operation_id = "getComment",
    security([])
)]
#[get("/comments/{id}")]
pub async fn get_comment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Comment>> {
    let id: CommentId = parse_id(FieldName::new("id"), path.into_inner())?;
    let comment = state.comments.get(&id).await?;
    Ok(web::Json(comment))
}

/// Edit a comment (owner or admin only).
#[utoipa::path(
    patch,
    path = "/api/v1/comments/{id}",
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated comment", body = Comment),
        (status = 401, description = "Not the owner", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Comment id")),
    tags = ["comments"],
    operation_id = "updateComment"
)]
#[patch("/comments/{id}")]
pub async fn update_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<web::Json<Comment>> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let id: CommentId = parse_id(FieldName::new("id"), path.into_inner())?;
    let body = parse_comment_body(payload.into_inner().body)?;

    let comment = state.comment_commands.update(&actor, &id, body).await?;
    Ok(web::Json(comment))
}

/// Delete a comment (owner or admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Not the owner", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Comment id")),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/comments/{id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let id: CommentId = parse_id(FieldName::new("id"), path.into_inner())?;
    state.comment_commands.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{create_post_for, in_memory_app, signup_and_login};
    use crate::test_support::in_memory_state;
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::Value;

    async fn comment_on(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        post_id: &str,
        body: &str,
    ) -> actix_web::dev::ServiceResponse {
        actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/posts/{post_id}/comments"))
                .cookie(cookie.clone())
                .set_json(CommentRequest { body: body.into() })
                .to_request(),
        )
        .await
    }

    async fn fetch_comment_count(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        post_id: &str,
    ) -> u64 {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(response).await;
        body.get("commentCount")
            .and_then(Value::as_u64)
            .expect("comment count")
    }

    #[actix_web::test]
    async fn commenting_updates_the_posts_comment_count() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let post_id = create_post_for(&app, &ada, "Discuss").await;

        let response = comment_on(&app, &ada, &post_id, "first!").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(fetch_comment_count(&app, &post_id).await, 1);

        let (eve, _) = signup_and_login(&app, "Eve", "eve@example.com").await;
        let response = comment_on(&app, &eve, &post_id, "second!").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(fetch_comment_count(&app, &post_id).await, 2);
    }

    #[actix_web::test]
    async fn double_commenting_is_a_conflict() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let post_id = create_post_for(&app, &ada, "Discuss").await;

        comment_on(&app, &ada, &post_id, "first!").await;
        let response = comment_on(&app, &ada, &post_id, "again!").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(fetch_comment_count(&app, &post_id).await, 1);
    }

    #[actix_web::test]
    async fn deleting_a_comment_recounts() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;
        let post_id = create_post_for(&app, &ada, "Discuss").await;

        let response = comment_on(&app, &ada, &post_id, "fleeting").await;
        let body: Value = actix_test::read_body_json(response).await;
        let comment_id = body.get("id").and_then(Value::as_str).expect("comment id");

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/comments/{comment_id}"))
                .cookie(ada.clone())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(fetch_comment_count(&app, &post_id).await, 0);
    }

    #[actix_web::test]
    async fn commenting_on_a_missing_post_is_not_found() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (ada, _) = signup_and_login(&app, "Ada", "ada@example.com").await;

        let response = comment_on(
            &app,
            &ada,
            "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "into the void",
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
