use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;
use services::avatar_storage::{AvatarStorage, MAX_AVATAR_BYTES};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
    pub avatars: AvatarStorage,
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    // Auth routes, rate limited per IP and path
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let demo_public_routes = Router::new()
        .route("/api/demo/start", post(handlers::demo::start_demo))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_demo,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(demo_public_routes)
        .merge(auth_routes);

    let protected_routes = Router::new()
        // Session
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/password", put(handlers::auth::change_password))
        // Dashboard
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        // Goals
        .route(
            "/api/goals",
            get(handlers::goals::list_goals).post(handlers::goals::create_goal),
        )
        .route(
            "/api/goals/:id",
            get(handlers::goals::get_goal)
                .put(handlers::goals::update_goal)
                .delete(handlers::goals::delete_goal),
        )
        .route(
            "/api/goals/:id/progress",
            put(handlers::goals::update_goal_progress),
        )
        // Daily logs
        .route(
            "/api/daily-logs",
            get(handlers::daily_logs::list_daily_logs).post(handlers::daily_logs::create_daily_log),
        )
        .route(
            "/api/daily-logs/recent",
            get(handlers::daily_logs::recent_daily_logs),
        )
        .route(
            "/api/daily-logs/date/:date",
            get(handlers::daily_logs::get_daily_log_by_date),
        )
        .route(
            "/api/daily-logs/:id",
            put(handlers::daily_logs::update_daily_log)
                .delete(handlers::daily_logs::delete_daily_log),
        )
        // Profile
        .route(
            "/api/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route(
            "/api/profile/avatar",
            post(handlers::profile::upload_avatar)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "healthpulse_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let db = db::create_pool(&config.database_url).await?;

    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations applied");

    let rate_limiter = RateLimitState::from_config(&config);
    auth::rate_limit::spawn_rate_limit_cleanup(rate_limiter.clone());

    if config.demo_enabled {
        handlers::demo::seed_demo_data(&db, &config).await?;
        handlers::demo::spawn_demo_refresh_worker(db.clone(), config.clone());
        tracing::info!(demo_user_id = %config.demo_user_id, "Demo identity ready");
    }

    let avatars = AvatarStorage::from_config(&config)?;
    if !avatars.is_configured() {
        tracing::warn!("STORAGE_URL not set; avatar uploads will fail");
    }

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter,
        avatars,
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // Connect info feeds the per-IP rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
