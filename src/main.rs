use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use roommates::config::Settings;
use roommates::database;
use roommates::services::clock::SystemClock;
use roommates::web::middleware::auth as auth_middleware;
use roommates::web::routes::{health, likes, questionnaire, search, users};
use roommates::web::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    // 2. Configuration and database
    let settings = Settings::from_env().expect("invalid configuration");
    info!(
        database_url = %settings.database_url,
        gender_policy = ?settings.gender_policy,
        scoring_variant = ?settings.scoring_variant,
        "starting"
    );
    if settings.dev_external_id.is_some() {
        warn!("DEV_EXTERNAL_ID is set; unauthenticated requests act as the development user");
    }

    let pool = database::connect(&settings.database_url)
        .await
        .expect("cannot open database");

    let host = settings.host.clone();
    let port = settings.port;
    let state = AppState::new(pool, settings, Arc::new(SystemClock));

    // 3. Protected routes behind one middleware layer
    let protected_routes = Router::new()
        .route(
            "/users/me",
            get(users::me_handler)
                .put(users::update_me_handler)
                .delete(users::delete_me_handler),
        )
        .route("/users/me/test", delete(questionnaire::reset_handler))
        .route("/users/:user_id", get(users::user_profile_handler))
        .route(
            "/users/:user_id/compatibility",
            get(users::compatibility_handler),
        )
        .route("/tests/questions", get(questionnaire::questions_handler))
        .route("/tests/submit", post(questionnaire::submit_handler))
        .route(
            "/tests/answers/:question_id",
            put(questionnaire::save_answer_handler),
        )
        .route("/tests/status", get(questionnaire::status_handler))
        .route("/tests/my-answers", get(questionnaire::my_answers_handler))
        .route("/search", post(search::search_handler))
        .route("/likes", post(likes::swipe_handler))
        .route("/likes/matches", get(likes::matches_handler))
        .route(
            "/likes/matches/:match_id",
            get(likes::match_detail_handler),
        )
        .route("/likes/sent", get(likes::sent_handler))
        .route("/likes/received", get(likes::received_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    // 4. Whole application
    let app = Router::new()
        .route("/health", get(health::health_handler))
        .merge(protected_routes)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state);

    // 5. Serve, falling back to the next port when the configured one is taken
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            warn!(%addr, error = %e, "bind_failed_trying_fallback_port");
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("cannot parse fallback host/port");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("cannot bind fallback port")
        }
    };

    let bound_addr = listener.local_addr().expect("listener has no local address");
    info!(%bound_addr, "listening");

    axum::serve(listener, app).await.expect("server error");
}
