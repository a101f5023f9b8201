//! Process entry point: loads configuration, builds the fleet and its
//! container driver, spawns the initial backends, starts the health
//! supervisor and the HTTP server, and shuts both down together on
//! `ctrl_c`.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cli::Config;
use fleet::{ContainerDriver, DockerDriver, DockerDriverConfig, Fleet};
use gateway::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::parse();

    let fleet = Fleet::new(config.ring_slots, config.virtual_replicas)
        .map_err(|e| anyhow::anyhow!("failed to construct ring: {e}"))?;

    let driver: Arc<dyn ContainerDriver> = Arc::new(DockerDriver::new(DockerDriverConfig {
        runtime: config.container_runtime.clone(),
        network_name: config.network_name.clone(),
        server_image: config.server_image.clone(),
        settle_delay: config.settle_delay,
        probe_timeout: config.health_timeout,
    }));

    spawn_initial_backends(&fleet, driver.as_ref(), config.initial_backends).await?;

    let supervisor = fleet::spawn_supervisor(fleet.clone(), driver.clone(), config.health_interval);

    let state = AppState {
        fleet: fleet.clone(),
        driver: driver.clone(),
        http: reqwest::Client::new(),
        proxy_timeout: config.proxy_timeout,
        ring_slots: config.ring_slots,
    };
    let app = gateway::build(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "load balancer listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    supervisor.shutdown().await;
    tracing::info!("shut down cleanly");
    Ok(())
}

/// Spawn the configured number of initial backends. If the very first
/// attempt fails, the container driver is considered unavailable and the
/// process exits non-zero rather than serving with zero backends.
async fn spawn_initial_backends(
    fleet: &Arc<Fleet>,
    driver: &dyn ContainerDriver,
    n: usize,
) -> anyhow::Result<()> {
    let mut spawned = 0usize;
    for _ in 0..n {
        let id = fleet::random_backend_id();
        match driver.spawn(id.as_str()).await {
            Ok(()) => {
                fleet.try_insert(id);
                spawned += 1;
            }
            Err(err) if spawned == 0 => {
                return Err(anyhow::anyhow!(
                    "container driver unavailable: {err}"
                ));
            }
            Err(err) => {
                tracing::warn!(error = %err, "initial backend spawn failed, continuing short");
            }
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
