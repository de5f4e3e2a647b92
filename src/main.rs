use olympus_web::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, state, then the HTTP server.
#[tokio::main]
async fn main() -> ExitCode {
    // 1. Configuration. `.env` is optional; real deployments set variables directly.
    dotenv::dotenv().ok();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            // The subscriber is not up yet, so this one goes straight to stderr.
            eprintln!("FATAL: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    // 2. Logging. RUST_LOG wins over the built-in filter.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "olympus_web=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Gateway starting in {:?} mode", config.env);
    tracing::info!(
        protected = ?config.guard.protected_prefixes,
        auth_only = ?config.guard.auth_only_prefixes,
        cookie = %config.auth_cookie,
        "route guard configured"
    );
    if !config.static_dir.join("index.html").exists() {
        tracing::warn!(dir = %config.static_dir.display(), "no index.html in STATIC_DIR; pages will 404");
    }

    // 3. State and router.
    let bind_addr = config.bind_addr;
    let app = create_router(AppState::new(config));

    // 4. Server.
    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%bind_addr, error = %err, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API documentation available at http://{bind_addr}/swagger-ui");

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server terminated");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
