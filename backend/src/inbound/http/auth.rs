//! Authentication helpers used by HTTP handlers.
//!
//! The gate runs in two steps: the session cookie yields a user id, and the
//! account query resolves that id into an [`Actor`], refusing deleted or
//! banned accounts. Handlers call [`require_actor`] before any gated
//! operation so the transitions happen in one place.

use crate::domain::Actor;
use crate::domain::ports::AccountQuery;

use super::ApiResult;
use super::session::SessionContext;

/// Resolve the session into an authenticated, non-banned [`Actor`].
pub async fn require_actor(
    session: &SessionContext,
    accounts: &dyn AccountQuery,
) -> ApiResult<Actor> {
    let user_id = session.require_user_id()?;
    accounts.fetch_actor(&user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, Role, UserId};
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::{App, HttpResponse, test, web};
    use std::sync::Arc;

    use crate::domain::ports::MockAccountQuery;

    fn app_with_query(
        accounts: MockAccountQuery,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let accounts: Arc<dyn AccountQuery> = Arc::new(accounts);
        App::new()
            .app_data(web::Data::new(accounts))
            .wrap(test_session_middleware())
            .route(
                "/login-as/{id}",
                web::get().to(|session: SessionContext, path: web::Path<String>| async move {
                    let id = UserId::new(path.into_inner())
                        .map_err(|err| DomainError::invalid_request(err.to_string()))?;
                    session.persist_user(&id)?;
                    Ok::<_, DomainError>(HttpResponse::Ok())
                }),
            )
            .route(
                "/gated",
                web::get().to(
                    |session: SessionContext,
                     accounts: web::Data<Arc<dyn AccountQuery>>| async move {
                        let actor = require_actor(&session, accounts.as_ref().as_ref()).await?;
                        Ok::<_, DomainError>(HttpResponse::Ok().body(actor.id.to_string()))
                    },
                ),
            )
    }

    async fn login_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        id: &UserId,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = test::call_service(
            app,
            test::TestRequest::get()
                .uri(&format!("/login-as/{id}"))
                .to_request(),
        )
        .await;
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    #[actix_web::test]
    async fn no_session_is_unauthorised_without_a_lookup() {
        let mut accounts = MockAccountQuery::new();
        accounts.expect_fetch_actor().times(0);
        let app = test::init_service(app_with_query(accounts)).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/gated").to_request()).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn live_account_passes_the_gate() {
        let id = UserId::random();
        let mut accounts = MockAccountQuery::new();
        accounts
            .expect_fetch_actor()
            .times(1)
            .return_once(move |id| Ok(Actor::new(*id, Role::User)));
        let app = test::init_service(app_with_query(accounts)).await;

        let cookie = login_cookie(&app, &id).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/gated")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let body = test::read_body(res).await;
        assert_eq!(body.as_ref(), id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn banned_account_is_forbidden_with_the_reason() {
        let id = UserId::random();
        let mut accounts = MockAccountQuery::new();
        accounts
            .expect_fetch_actor()
            .times(1)
            .return_once(|_| Err(DomainError::forbidden("you are banned. Reason: spam")));
        let app = test::init_service(app_with_query(accounts)).await;

        let cookie = login_cookie(&app, &id).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/gated")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(
            body.get("code").and_then(serde_json::Value::as_str),
            Some("forbidden")
        );
        assert!(
            body.get("message")
                .and_then(serde_json::Value::as_str)
                .is_some_and(|message| message.contains("spam"))
        );
    }
}
