//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every HTTP endpoint from the inbound layer, the shared
//! error schema, and the session cookie security scheme. Swagger UI serves
//! the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/users/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Palaver backend API",
        description = "HTTP interface for posts, comments, votes, the follow graph, and accounts.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::forgot_password,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::users::update_password,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::comments::create_comment,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::get_comment,
        crate::inbound::http::comments::update_comment,
        crate::inbound::http::comments::delete_comment,
        crate::inbound::http::votes::vote_on_post,
        crate::inbound::http::votes::vote_on_comment,
        crate::inbound::http::votes::list_post_votes,
        crate::inbound::http::votes::list_comment_votes,
        crate::inbound::http::votes::get_vote,
        crate::inbound::http::votes::update_vote,
        crate::inbound::http::votes::delete_vote,
        crate::inbound::http::follows::follow,
        crate::inbound::http::follows::unfollow,
        crate::inbound::http::follows::remove_follower,
        crate::inbound::http::follows::list_following,
        crate::inbound::http::follows::list_followers,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    )
)]
pub struct ApiDoc;
