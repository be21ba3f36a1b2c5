//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

use crate::domain::UserId;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build the full API app over the given state.
pub fn in_memory_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(super::configure_api))
}

/// Sign a fresh user up and return their session cookie and id.
///
/// The password is always `correct horse battery`.
pub async fn signup_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
) -> (actix_web::cookie::Cookie<'static>, UserId) {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users/signup")
            .set_json(serde_json::json!({
                "name": name,
                "email": email,
                "password": "correct horse battery",
            }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "signup must succeed");

    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();
    let body: Value = actix_test::read_body_json(response).await;
    let id = body
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| UserId::new(raw).ok())
        .expect("user id in signup response");
    (cookie, id)
}

/// Publish a post as the given session and return its id as a string.
pub async fn create_post_for(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &actix_web::cookie::Cookie<'static>,
    title: &str,
) -> String {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .cookie(cookie.clone())
            .set_json(serde_json::json!({ "title": title, "content": "" }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "post creation must succeed");
    let body: Value = actix_test::read_body_json(response).await;
    body.get("id")
        .and_then(Value::as_str)
        .expect("post id in response")
        .to_owned()
}
