mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vibecheck_pipeline::IngestRunner;

use crate::{
    api::{build_app, AppState},
    scheduler::{SchedulerState, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = vibecheck_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = vibecheck_db::PoolConfig::from_app_config(&config);
    let pool = vibecheck_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = vibecheck_db::run_migrations(&pool).await?;
    let seeded = vibecheck_db::seed_entities(&pool, vibecheck_core::curated_entities()).await?;
    tracing::info!(migrations_applied = applied, entities_seeded = seeded, "database ready");

    let runner = IngestRunner::from_app_config(pool.clone(), &config)?;
    let scheduler_state = SchedulerState::new(Arc::new(SystemClock));
    let mut job_scheduler =
        scheduler::build_scheduler(pool.clone(), runner, scheduler_state.clone(), &config).await?;

    let app = build_app(
        AppState {
            pool,
            scheduler: scheduler_state.clone(),
        },
        &config.cors_origins,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(bind_addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler_state.begin_shutdown();
    if let Err(e) = job_scheduler.shutdown().await {
        tracing::error!(error = %e, "scheduler: shutdown failed");
    }
    tracing::info!("scheduler: waiting for in-flight runs");
    scheduler_state.drain().await;
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
