use std::{net::SocketAddr, sync::Arc};

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use healthplus_backend::catalog::FileCatalog;
use healthplus_backend::config::Config;
use healthplus_backend::metrics::MetricsHandle;
use healthplus_backend::responses::JsonResponse;
use healthplus_backend::routes::{
    admin_page::admin_page,
    auth::{handle_login, handle_logout, handle_me, handle_signup},
    checkout::create_checkout_session,
    metrics::metrics_snapshot,
    products::list_products,
    webhook::stripe_webhook,
};
use healthplus_backend::services::payments::LiveStripeService;
use healthplus_backend::store::JsonUserStore;
use healthplus_backend::utils::jwt::JwtKeys;
use healthplus_backend::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(Config::from_env());

    // Stricter limiter for /auth/*
    let rate_limit_auth_s: u64 = std::env::var("RATE_LIMITER_AUTH_SECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1);
    let rate_limit_auth_burst: u32 = std::env::var("RATE_LIMITER_AUTH_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(10);
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(rate_limit_auth_s)
            .burst_size(rate_limit_auth_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .unwrap(),
    );

    // Background task to cleanup old rate-limiter IPs
    let governor_limiter = auth_governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = std::time::Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            governor_limiter.retain_recent();
        }
    });

    let jwt_keys =
        JwtKeys::from_secret(&config.session_secret).expect("SESSION_SECRET is not usable");

    let state = AppState {
        users: Arc::new(JsonUserStore::new(&config.users_path)),
        catalog: Arc::new(FileCatalog::new(&config.products_path)),
        payments: Arc::new(LiveStripeService::new(
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
        )),
        metrics: MetricsHandle::new(),
        jwt_keys,
        config: config.clone(),
    };

    let auth_routes = Router::new()
        .route("/signup", post(handle_signup))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/me", get(handle_me))
        .layer(GovernorLayer {
            config: auth_governor_conf,
        });

    let app = Router::new()
        .route("/healthz", get(healthz))
        .nest("/auth", auth_routes)
        .route("/api/products", get(list_products))
        .route("/api/metrics", get(metrics_snapshot))
        // Gated dashboard page must be registered ahead of the static fallback.
        .route("/admin.html", get(admin_page))
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/webhook", post(stripe_webhook))
        .fallback_service(ServeDir::new(&config.public_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = TcpListener::bind(addr).await.unwrap();
    info!("Health+ running on {}", config.base_url);
    axum::serve(listener, make_service).await.unwrap();
}

/// A simple health check.
async fn healthz() -> Response {
    Json(json!({ "ok": true })).into_response()
}
