//! Post API handlers.
//!
//! ```text
//! POST   /api/v1/posts
//! GET    /api/v1/posts
//! GET    /api/v1/posts/{id}
//! PATCH  /api/v1/posts/{id}
//! DELETE /api/v1/posts/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{NewPost, PostCommand, PostPatch, PostQuery};
use crate::domain::{DomainError, Page, Post, PostContent, PostId, PostTitle};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_id};

/// Post creation request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// Headline.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub content: String,
}

/// Post update request body; absent fields stay unchanged.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    /// Replacement headline.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement body text.
    #[serde(default)]
    pub content: Option<String>,
}

fn parse_post_id(raw: String) -> Result<PostId, DomainError> {
    parse_id(FieldName::new("id"), raw)
}

/// Publish a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid request", body = DomainError),
        (status = 401, description = "Unauthorised", body = DomainError)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let payload = payload.into_inner();
    let title = PostTitle::new(payload.title)
        .map_err(|error| invalid_field(FieldName::new("title"), error))?;
    let content = PostContent::new(payload.content)
        .map_err(|error| invalid_field(FieldName::new("content"), error))?;

    let post = state
        .post_commands
        .create(&actor, NewPost { title, content })
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// Page through posts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    responses((status = 200, description = "Posts", body = [Post])),
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Records per page")
    ),
    tags = ["posts"],
    operation_id = "listPosts",
    security([])
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    page: web::Query<Page>,
) -> ApiResult<web::Json<Vec<Post>>> {
    let posts = state.posts.list(*page).await?;
    Ok(web::Json(posts))
}

/// Fetch a single post.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Post id")),
    tags = ["posts"],
    operation_id = "getPost",
    security([])
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Post>> {
    let id = parse_post_id(path.into_inner())?;
    let post = state.posts.get(&id).await?;
    Ok(web::Json(post))
}

/// Edit a post (owner or admin only).
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 401, description = "Not the owner", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Post id")),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[patch("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdatePostRequest>,
) -> ApiResult<web::Json<Post>> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let id = parse_post_id(path.into_inner())?;
    let payload = payload.into_inner();

    let title = payload
        .title
        .map(PostTitle::new)
        .transpose()
        .map_err(|error| invalid_field(FieldName::new("title"), error))?;
    let content = payload
        .content
        .map(PostContent::new)
        .transpose()
        .map_err(|error| invalid_field(FieldName::new("content"), error))?;

    let post = state
        .post_commands
        .update(&actor, &id, PostPatch { title, content })
        .await?;
    Ok(web::Json(post))
}

/// Delete a post (owner or admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not the owner", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "Post id")),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let id = parse_post_id(path.into_inner())?;
    state.post_commands.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
