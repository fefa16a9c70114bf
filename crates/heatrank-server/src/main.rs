mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use heatrank_db::{PgTrendStore, TrendStore};
use heatrank_pipeline::{load_registry, CycleContext};
use heatrank_scoring::{MetricEstimator, RandomEstimator};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    scheduler::{build_scheduler, schedule_offset, CycleRunner},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(heatrank_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = heatrank_db::connect_pool_from_config(&config).await?;
    let applied = heatrank_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let store: Arc<dyn TrendStore> = Arc::new(PgTrendStore::new(pool.clone()));
    let ctx = CycleContext::build(
        &config,
        load_registry(&config)?,
        Arc::clone(&store),
        Arc::new(RandomEstimator) as Arc<dyn MetricEstimator>,
    )?;
    tracing::info!(stages = ?ctx.chain.stage_names(), "classification chain ready");

    let runner = CycleRunner::new(Arc::new(ctx));
    let offset = schedule_offset(config.schedule_utc_offset_hours).with_context(|| {
        format!(
            "invalid HEATRANK_SCHEDULE_UTC_OFFSET_HOURS: {}",
            config.schedule_utc_offset_hours
        )
    })?;
    let _scheduler = build_scheduler(runner.clone(), &config.schedule, offset).await?;

    tokio::spawn(async move {
        runner.run("startup").await;
    });

    let app = build_app(AppState {
        store,
        pool: Some(pool),
        local_region: config.local_region.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
