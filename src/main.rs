//! saas-core server binary.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use saas_core::adapters::auth::{Argon2CredentialVerifier, JwtTokenCodec};
use saas_core::adapters::http::{app_router, AppPorts, AppState};
use saas_core::adapters::postgres::{
    self, PostgresAlertSink, PostgresEntitlementStore, PostgresIntegrationRepository,
    PostgresSessionStore, PostgresUserRepository, PostgresWebhookEventRepository,
};
use saas_core::application::handlers::auth::SessionSweeper;
use saas_core::config::AppConfig;
use saas_core::ports::SystemClock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);
    tracing::info!(
        environment = ?config.server.environment,
        "Starting saas-core"
    );

    let pool = postgres::connect(&config.database).await?;
    if config.database.run_migrations {
        postgres::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let clock = Arc::new(SystemClock);
    let sessions = Arc::new(PostgresSessionStore::new(pool.clone()));

    let ports = AppPorts {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        sessions: sessions.clone(),
        entitlements: Arc::new(PostgresEntitlementStore::new(pool.clone())),
        alerts: Arc::new(PostgresAlertSink::new(pool.clone())),
        integrations: Arc::new(PostgresIntegrationRepository::new(pool.clone())),
        webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool.clone())),
        credentials: Arc::new(Argon2CredentialVerifier::new()),
        codec: Arc::new(JwtTokenCodec::new(
            config.auth.session_secret.clone(),
            &config.auth.token_issuer,
        )),
        clock: clock.clone(),
    };
    let state = AppState::new(
        ports,
        config.session_guard_config(),
        config.webhook_intake_config(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = SessionSweeper::new(sessions, clock, config.auth.sweep_interval());
    let sweeper_handle = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    let app = app_router(state, config.server.request_timeout());
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped; stopping background tasks");
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_handle.await {
        tracing::error!(error = %e, "Session sweeper task failed");
    }
    pool.close().await;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.server.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
