//! Account API handlers.
//!
//! ```text
//! POST   /api/v1/users/signup
//! POST   /api/v1/users/login
//! GET    /api/v1/users/logout
//! POST   /api/v1/users/forgot-password
//! PATCH  /api/v1/users/reset-password/{token}
//! PATCH  /api/v1/users/update-password
//! GET    /api/v1/users/me
//! GET    /api/v1/users/{id}
//! GET    /api/v1/users
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AccountCommand, AccountQuery};
use crate::domain::{
    DomainError, LoginCredentials, Page, Password, SignupDetails, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_id};

/// Signup request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Chosen password.
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Forgot-password request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    /// Account email to send the reset token to.
    pub email: String,
}

/// Reset-password request body; the token travels in the path.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Newly chosen password.
    pub password: String,
}

/// Update-password request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// The current password, verified before the change.
    pub current_password: String,
    /// Newly chosen password.
    pub password: String,
}

/// Create an account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/users/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = DomainError),
        (status = 409, description = "Email already registered", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "signup",
    security([])
)]
#[post("/users/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let details = SignupDetails::try_from_parts(&payload.name, &payload.email, &payload.password)
        .map_err(|error| invalid_field(FieldName::new("signup"), error))?;

    let user = state.account_commands.sign_up(details).await?;
    session.persist_user(&user.id)?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User),
        (status = 400, description = "Invalid request", body = DomainError),
        (status = 401, description = "Invalid credentials", body = DomainError),
        (status = 403, description = "Account banned", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|error| invalid_field(FieldName::new("login"), error))?;

    let user = state.account_commands.login(credentials).await?;
    session.persist_user(&user.id)?;
    Ok(HttpResponse::Ok().json(user))
}

/// Tear the session down.
#[utoipa::path(
    get,
    path = "/api/v1/users/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[get("/users/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().finish()
}

/// Mail a password-reset token to the account holder.
#[utoipa::path(
    post,
    path = "/api/v1/users/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Token sent"),
        (status = 404, description = "Unknown email", body = DomainError),
        (status = 503, description = "Mail dispatch failed", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/users/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let email = crate::domain::EmailAddress::new(payload.email.as_str())
        .map_err(|error| invalid_field(FieldName::new("email"), error))?;
    state.account_commands.forgot_password(email).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "token sent to email" })))
}

/// Redeem a reset token, set a new password, and log in.
#[utoipa::path(
    patch,
    path = "/api/v1/users/reset-password/{token}",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = User),
        (status = 400, description = "Token invalid or expired", body = DomainError)
    ),
    params(("token" = String, Path, description = "Reset token from the email")),
    tags = ["users"],
    operation_id = "resetPassword",
    security([])
)]
#[patch("/users/reset-password/{token}")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let token = path.into_inner();
    let password = Password::new_choice(&payload.password)
        .map_err(|error| invalid_field(FieldName::new("password"), error))?;

    let user = state
        .account_commands
        .reset_password(&token, password)
        .await?;
    session.persist_user(&user.id)?;
    Ok(HttpResponse::Ok().json(user))
}

/// Change the logged-in user's password.
#[utoipa::path(
    patch,
    path = "/api/v1/users/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password wrong", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "updatePassword"
)]
#[patch("/users/update-password")]
pub async fn update_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdatePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let current = Password::for_login(&payload.current_password)
        .map_err(|error| invalid_field(FieldName::new("currentPassword"), error))?;
    let next = Password::new_choice(&payload.password)
        .map_err(|error| invalid_field(FieldName::new("password"), error))?;

    state
        .account_commands
        .change_password(&actor, current, next)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// The logged-in user's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    let user = state.accounts.get_user(&actor.id).await?;
    Ok(web::Json(user))
}

/// A user's public profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "Not found", body = DomainError)
    ),
    params(("id" = String, Path, description = "User id")),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    require_actor(&session, state.accounts.as_ref()).await?;
    let id: UserId = parse_id(FieldName::new("id"), path.into_inner())?;
    let user = state.accounts.get_user(&id).await?;
    Ok(web::Json(user))
}

/// List accounts (administrators only).
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 403, description = "Not an administrator", body = DomainError)
    ),
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Records per page")
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    page: web::Query<Page>,
) -> ApiResult<web::Json<Vec<User>>> {
    let actor = require_actor(&session, state.accounts.as_ref()).await?;
    if !actor.is_admin() {
        return Err(DomainError::forbidden(
            "you do not have permission to perform this action",
        ));
    }
    let users = state.accounts.list_users(*page).await?;
    Ok(web::Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{in_memory_app, signup_and_login};
    use crate::test_support::in_memory_state;
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::Value;

    #[actix_web::test]
    async fn signup_rejects_a_short_password_with_field_details() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/users/signup")
            .set_json(SignupRequest {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "short".into(),
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("code").and_then(Value::as_str),
            Some("invalid_request")
        );
    }

    #[actix_web::test]
    async fn signup_establishes_a_session_and_me_works() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (cookie, user_id) = signup_and_login(&app, "Ada", "ada@example.com").await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert!(response.status().is_success());

        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("id").and_then(Value::as_str),
            Some(user_id.to_string().as_str())
        );
        // Secrets never serialise.
        assert!(body.get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn login_with_wrong_password_is_unauthorised() {
        let (state, _) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        signup_and_login(&app, "Ada", "ada@example.com").await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong password".into(),
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn list_users_requires_the_admin_role() {
        let (state, handles) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (cookie, user_id) = signup_and_login(&app, "Ada", "ada@example.com").await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        handles.users.set_role(&user_id, crate::domain::Role::Admin);
        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert!(response.status().is_success());
    }

    #[actix_web::test]
    async fn banned_user_is_refused_at_the_gate() {
        let (state, handles) = in_memory_state();
        let app = actix_test::init_service(in_memory_app(state)).await;
        let (cookie, user_id) = signup_and_login(&app, "Ada", "ada@example.com").await;
        handles.users.ban(&user_id, "spam");

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body: Value = actix_test::read_body_json(response).await;
        assert!(
            body.get("message")
                .and_then(Value::as_str)
                .is_some_and(|message| message.contains("spam"))
        );
    }
}
