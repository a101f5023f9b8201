//! Container driver abstraction (component C).
//!
//! The routing and fleet-management code never depends on *how* a backend
//! container is spawned, removed, or probed, only on this trait. That
//! makes it possible to drive a real orchestrator in production and a
//! fully in-memory fake in tests, which is what makes the replacement
//! protocol in [`crate::supervisor`] testable without ever starting a
//! container (see [`FakeDriver`]).

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::DriverError;

/// Result of a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Healthy,
    Unhealthy,
}

/// Spawn, remove, and probe backend containers.
///
/// All three operations are idempotent at the driver level: calling
/// `spawn` on a name that's already running, or `remove` on a name that's
/// already gone, must not panic or corrupt driver-local state.
#[async_trait]
pub trait ContainerDriver: Send + Sync {
    /// Start a container named `name`, reachable by that name on the
    /// configured network, with `SERVER_ID=name` in its environment.
    async fn spawn(&self, name: &str) -> Result<(), DriverError>;

    /// Stop and remove the named container. Best-effort: callers treat
    /// failures as "the container is probably already gone" rather than
    /// fatal.
    async fn remove(&self, name: &str) -> Result<(), DriverError>;

    /// Probe the named backend's heartbeat endpoint.
    async fn probe(&self, name: &str) -> ProbeResult;
}

/// Configuration for [`DockerDriver`].
#[derive(Debug, Clone)]
pub struct DockerDriverConfig {
    /// Container runtime CLI binary (e.g. `docker`, `podman`).
    pub runtime: String,
    /// Network every spawned backend joins.
    pub network_name: String,
    /// Image to run for each backend.
    pub server_image: String,
    /// Delay after a successful `run` before the backend is assumed
    /// reachable.
    pub settle_delay: Duration,
    /// Bounded timeout for the heartbeat probe.
    pub probe_timeout: Duration,
}

/// Drives a real container runtime CLI (docker/podman-compatible).
pub struct DockerDriver {
    config: DockerDriverConfig,
    http: reqwest::Client,
}

impl DockerDriver {
    pub fn new(config: DockerDriverConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn run_cli(&self, args: &[&str]) -> Result<std::process::Output, DriverError> {
        Command::new(&self.config.runtime)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DriverError::Failed {
                name: args.join(" "),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ContainerDriver for DockerDriver {
    #[tracing::instrument(level = "info", skip(self))]
    async fn spawn(&self, name: &str) -> Result<(), DriverError> {
        // Recover from a crash that leaked a container under this name.
        let _ = self.run_cli(&["rm", "-f", name]).await;

        let env = format!("SERVER_ID={name}");
        let output = self
            .run_cli(&[
                "run",
                "--name",
                name,
                "--network",
                &self.config.network_name,
                "--network-alias",
                name,
                "-e",
                &env,
                "-d",
                &self.config.server_image,
            ])
            .await?;

        if !output.status.success() {
            let reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DriverError::Failed {
                name: name.to_string(),
                reason,
            });
        }

        tokio::time::sleep(self.config.settle_delay).await;
        Ok(())
    }

    #[tracing::instrument(level = "info", skip(self))]
    async fn remove(&self, name: &str) -> Result<(), DriverError> {
        let output = self.run_cli(&["rm", "-f", name]).await?;
        if !output.status.success() {
            tracing::debug!(name, "container removal reported failure, ignoring");
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn probe(&self, name: &str) -> ProbeResult {
        let url = format!("http://{name}:5000/heartbeat");
        let result = self
            .http
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => ProbeResult::Healthy,
            Ok(resp) => {
                tracing::debug!(name, status = %resp.status(), "heartbeat returned non-200");
                ProbeResult::Unhealthy
            }
            Err(err) => {
                tracing::debug!(name, error = %err, "heartbeat probe failed");
                ProbeResult::Unhealthy
            }
        }
    }
}

/// In-memory driver for tests and embedders that want to exercise the
/// fleet supervisor and admin API without real containers.
///
/// Tracks spawned names and lets tests flip a backend's simulated health
/// externally with [`FakeDriver::set_healthy`].
pub mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeDriver {
        state: Mutex<HashMap<String, bool>>,
        fail_spawn: Mutex<std::collections::HashSet<String>>,
    }

    impl FakeDriver {
        pub fn new() -> Self {
            Self::default()
        }

        /// Simulate a health transition for an already-spawned backend.
        pub fn set_healthy(&self, name: &str, healthy: bool) {
            self.state.lock().unwrap().insert(name.to_string(), healthy);
        }

        /// Make the next `spawn` for `name` fail, simulating an
        /// orchestrator that accepted the request but the container never
        /// came up.
        pub fn fail_next_spawn(&self, name: &str) {
            self.fail_spawn.lock().unwrap().insert(name.to_string());
        }

        /// Names currently considered spawned.
        pub fn spawned(&self) -> Vec<String> {
            self.state.lock().unwrap().keys().cloned().collect()
        }
    }

    #[async_trait]
    impl ContainerDriver for FakeDriver {
        async fn spawn(&self, name: &str) -> Result<(), DriverError> {
            if self.fail_spawn.lock().unwrap().remove(name) {
                return Err(DriverError::Failed {
                    name: name.to_string(),
                    reason: "simulated spawn failure".to_string(),
                });
            }
            self.state.lock().unwrap().insert(name.to_string(), true);
            Ok(())
        }

        async fn remove(&self, name: &str) -> Result<(), DriverError> {
            self.state.lock().unwrap().remove(name);
            Ok(())
        }

        async fn probe(&self, name: &str) -> ProbeResult {
            match self.state.lock().unwrap().get(name) {
                Some(true) => ProbeResult::Healthy,
                _ => ProbeResult::Unhealthy,
            }
        }
    }
}

pub use fake::FakeDriver;
