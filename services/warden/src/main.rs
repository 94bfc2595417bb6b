//! Warden HTTP service entry point.
//!
//! # Purpose
//! Parses flags, initializes logging and metrics, loads configuration, builds
//! the enforcer and serves the API until Ctrl-C.
use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::future::Future;
use std::net::SocketAddr;
use warden::app::{build_router, build_state};
use warden::config::{AppConfig, Cli};
use warden::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let metrics_handle = observability::init_observability(cli.log_path.as_deref())?;
    observability::log_runtime_info();
    let config = AppConfig::load(cli.env_file.as_deref()).context("load configuration")?;
    run_with_shutdown(config, metrics_handle, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(
    config: AppConfig,
    metrics_handle: PrometheusHandle,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&config).await?;
    let metrics_task = config.metrics_port.map(|port| {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!(%addr, "metrics listening");
        tokio::spawn(observability::serve_metrics(metrics_handle, addr))
    });

    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, backend = %config.backend, "warden listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    if let Some(task) = metrics_task {
        task.abort();
    }
    tracing::info!("warden stopped");
    Ok(())
}
