//! Drinks API HTTP service entry point.
//!
//! # Purpose
//! Loads configuration, installs observability, builds the shared state and
//! serves the API until interrupted, with Prometheus metrics on a separate
//! listener.
use drinks_api::app::{build_router, build_state};
use drinks_api::config::DrinksApiConfig;
use drinks_api::observability;
use std::future::Future;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DrinksApiConfig::from_env_or_yaml()?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: DrinksApiConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability(observability::SERVICE_NAME)?;
    let state = build_state(&config).await?;
    tracing::info!(backend = state.store.backend_name(), "drink store ready");

    let metrics_bind = config.metrics_bind;
    let metrics_task = tokio::spawn(async move {
        if let Err(err) =
            observability::serve_metrics(metrics_handle, metrics_bind, std::future::pending()).await
        {
            tracing::warn!(error = %err, %metrics_bind, "metrics listener stopped");
        }
    });

    let app = build_router(state);
    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "drinks api listening");
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}
