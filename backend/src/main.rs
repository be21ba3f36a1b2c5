//! Backend entry-point: wires the REST endpoints over PostgreSQL.

use std::env;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::ports::{FixtureMailer, Mailer};
use backend::domain::{
    AccountService, CommentService, FollowService, PostService, VoteService,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::configure_api;
use backend::outbound::mail::{HttpMailer, MailerConfig};
use backend::outbound::persistence::{
    DbPool, DieselCommentStore, DieselFollowGraphStore, DieselPostStore, DieselUserStore,
    DieselVoteEdgeStore, PoolConfig,
};
use backend::outbound::security::Sha256CredentialHasher;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;
    run_migrations(&database_url)?;

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("failed to build database pool: {e}")))?;
    let state = build_state(pool);

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(web::Data::new(state.clone()))
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session)
                    .configure(configure_api),
            )
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = app
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(&bind_addr)?;

    health_state.mark_ready();
    server.run().await
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    use diesel::Connection;

    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("failed to connect for migrations: {e}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("failed to run migrations: {e}")))?;
    Ok(())
}

fn build_state(pool: DbPool) -> HttpState {
    let endpoint = env::var("MAIL_API_URL")
        .ok()
        .and_then(|raw| url::Url::parse(&raw).ok());
    match endpoint {
        Some(endpoint) => build_state_with_mailer(
            pool,
            HttpMailer::new(MailerConfig {
                endpoint,
                api_token: env::var("MAIL_API_TOKEN").unwrap_or_default(),
                sender: env::var("MAIL_SENDER").unwrap_or_else(|_| "noreply@localhost".into()),
            }),
        ),
        None => {
            warn!("MAIL_API_URL not set; outgoing mail is discarded");
            build_state_with_mailer(pool, FixtureMailer)
        }
    }
}

fn build_state_with_mailer<M: Mailer + 'static>(pool: DbPool, mailer: M) -> HttpState {
    let users = Arc::new(DieselUserStore::new(pool.clone()));
    let posts = Arc::new(DieselPostStore::new(pool.clone()));
    let comments = Arc::new(DieselCommentStore::new(pool.clone()));
    let votes = Arc::new(DieselVoteEdgeStore::new(pool.clone()));
    let graph = Arc::new(DieselFollowGraphStore::new(pool));

    let accounts = Arc::new(AccountService::new(
        Arc::clone(&users),
        Arc::new(Sha256CredentialHasher),
        Arc::new(mailer),
    ));
    let post_service = Arc::new(PostService::new(Arc::clone(&posts)));
    let comment_service = Arc::new(CommentService::new(
        Arc::clone(&comments),
        Arc::clone(&posts),
    ));
    let vote_service = Arc::new(VoteService::new(votes, Arc::clone(&posts), comments));
    let follow_service = Arc::new(FollowService::new(graph, users));

    HttpState {
        account_commands: accounts.clone(),
        accounts,
        post_commands: post_service.clone(),
        posts: post_service,
        comment_commands: comment_service.clone(),
        comments: comment_service,
        vote_commands: vote_service.clone(),
        votes: vote_service,
        follow_commands: follow_service.clone(),
        follows: follow_service,
    }
}
