//! Server startup and lifecycle.
//!
//! Long-lived resources are opened in dependency order (store, cache,
//! broker, listener) and closed in reverse on shutdown.

use crate::config::Config;
use crate::infrastructure::broker::Broker;
use crate::infrastructure::cache::{Cache, CacheBackend, MemoryCache, RedisCache};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs the HTTP server until a shutdown signal arrives.
///
/// # Errors
///
/// Fails fast when the store cannot be opened, a configured cache cannot
/// be reached, the broker is unavailable, or a required queue cannot be
/// declared.
pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);

    let pool = PgPoolOptions::new()
        .min_connections(config.db_min_pool_size)
        .max_connections(config.db_max_pool_size)
        .acquire_timeout(config.db_conn_timeout)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let cache_backend: Arc<dyn CacheBackend> = match &config.redis_url {
        Some(redis_url) => Arc::new(
            RedisCache::connect(redis_url)
                .await
                .context("failed to open cache")?,
        ),
        None => {
            tracing::info!("Redis not configured, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    };
    let cache = Cache::new(cache_backend);

    let broker = Broker::connect(&config.rabbitmq_url)
        .await
        .context("failed to connect to broker")?;
    broker
        .declare_queues(&[
            config.queue_click_events.as_str(),
            config.queue_dashboard_request.as_str(),
        ])
        .await
        .context("failed to declare queues")?;

    let pool = Arc::new(pool);
    let link_repo = Arc::new(PgLinkRepository::new(pool.clone()));
    let click_repo = Arc::new(PgClickRepository::new(pool.clone()));

    let shutdown = CancellationToken::new();

    let state = AppState::new(
        config.clone(),
        link_repo,
        click_repo,
        cache,
        Arc::new(broker.rpc_client()),
        Arc::new(broker.publisher()),
        shutdown.clone(),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                shutdown_signal().await;
                // Abort in-flight broker waits; their requests fail fast
                // instead of holding the drain open for a full RPC timeout.
                shutdown.cancel();
            }
        })
        .await?;

    // Reverse of startup: listener has drained; broker channel and
    // connection next, then the store pool. The cache manager closes on
    // drop.
    tracing::info!("HTTP server stopped, closing resources");
    broker.close().await;
    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C (all platforms) or SIGTERM (Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
