use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use domain::services::AttendeeCache;
use tracing::{info, warn};

use event_checkin_api::app::{build_router, AppState};
use event_checkin_api::config::Config;
use event_checkin_api::jobs::{JobScheduler, PoolMetricsJob, RateLimitPruneJob};
use event_checkin_api::middleware::{init_metrics, logging::init_logging};
use event_checkin_api::services::{bootstrap_admin, BootstrapOutcome, RedisAttendeeCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging);
    init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting event check-in API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.to_pool_config())
        .await
        .context("Failed to connect to the database")?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    match bootstrap_admin(&pool, &config.admin).await? {
        BootstrapOutcome::Created => info!("Bootstrap admin volunteer created"),
        BootstrapOutcome::AdminExists | BootstrapOutcome::NotConfigured => {}
    }

    let cache = connect_cache(&config).await;

    let addr = config.socket_addr()?;
    let state = AppState::new(config, pool.clone(), cache)?;

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool));
    if let Some(limiter) = &state.rate_limiter {
        scheduler.register(RateLimitPruneJob::new(Arc::clone(limiter)));
    }
    scheduler.start();

    let app = build_router(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(5)).await;
    info!("Server stopped");

    Ok(())
}

/// Connects the optional Redis cache. Failure disables caching.
async fn connect_cache(config: &Config) -> Option<Arc<dyn AttendeeCache>> {
    if !config.cache.is_enabled() {
        info!("Attendee cache disabled");
        return None;
    }

    match RedisAttendeeCache::connect(&config.cache.redis_url, config.cache.ttl_secs).await {
        Ok(cache) => {
            info!(ttl_secs = config.cache.ttl_secs, "Attendee cache connected");
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!(error = %e, "Attendee cache unavailable, continuing without it");
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
