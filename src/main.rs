//! Staple server binary.

use std::error::Error;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use staple::adapters::auth::{AdapterRegistry, AdapterResources};
use staple::adapters::http::{app_router, AppState, SessionCookie};
use staple::adapters::session_store::{
    FileSessionStore, InMemorySessionStore, PostgresSessionStore, RedisSessionStore,
};
use staple::application::{SessionManager, SessionSweeper};
use staple::config::{AppConfig, SessionBackend};
use staple::ports::SessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    let pool = match &config.database {
        Some(db) => {
            info!("Connecting to PostgreSQL");
            Some(db.pool_options().connect(&db.url).await?)
        }
        None => None,
    };

    let store = session_store(&config, pool.clone()).await?;
    let sessions = SessionManager::new(store, config.session.ttl());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = SessionSweeper::new(sessions.clone(), config.session.purge_interval());
    let sweeper_task = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    let resources = AdapterResources { pool };
    let adapter = AdapterRegistry::with_defaults().resolve(&config.auth, &resources)?;
    let policy = config.auth.route_policy()?;

    let cookie = SessionCookie::new(
        config.session.cookie_name.clone(),
        config.session.cookie_secret.clone(),
    )
    .secure(config.server.is_production());

    let state = AppState::new(sessions, adapter, policy, cookie)
        .with_verbose_errors(config.features.verbose_errors);
    let app = app_router(state, config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    sweeper_task.await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn session_store(
    config: &AppConfig,
    pool: Option<PgPool>,
) -> Result<Arc<dyn SessionStore>, Box<dyn Error + Send + Sync>> {
    let backend = config.session.backend;
    info!(backend = backend.as_str(), "Session store");

    Ok(match backend {
        SessionBackend::Memory => Arc::new(InMemorySessionStore::new()),
        SessionBackend::File => Arc::new(FileSessionStore::new(&config.session.file_dir)),
        SessionBackend::Redis => {
            let redis = config
                .redis
                .as_ref()
                .ok_or("session backend 'redis' needs a redis section")?;
            let store =
                RedisSessionStore::connect(&redis.url, redis.key_prefix.clone(), redis.timeout())
                    .await?;
            Arc::new(store)
        }
        SessionBackend::Postgres => {
            let pool = pool.ok_or("session backend 'postgres' needs a database section")?;
            let store = PostgresSessionStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
    })
}

fn init_tracing(config: &AppConfig) {
    if !config.features.enable_tracing {
        return;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if config.server.is_production() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
