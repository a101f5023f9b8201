//! Tunable configuration (spec §6), loaded from CLI flags or environment
//! variables via `clap`'s `env` feature.

use std::time::Duration;

use clap::Parser;

fn parse_seconds(s: &str) -> Result<Duration, std::num::ParseFloatError> {
    s.parse::<f64>().map(Duration::from_secs_f64)
}

#[derive(Debug, Clone, Parser)]
#[command(name = "hashring-lb", about = "Self-managing consistent-hash load balancer")]
pub struct Config {
    /// Ring capacity (number of slots).
    #[arg(long, env = "RING_SLOTS", default_value_t = 512)]
    pub ring_slots: usize,

    /// Virtual replicas per backend. The spec recommends >= 100 for
    /// fairness; the hard floor is 1.
    #[arg(long, env = "VIRTUAL_REPLICAS", default_value_t = 100)]
    pub virtual_replicas: usize,

    /// Container network every backend joins.
    #[arg(long, env = "NETWORK_NAME", default_value = "lb-net")]
    pub network_name: String,

    /// Image run for each spawned backend.
    #[arg(long, env = "SERVER_IMAGE", default_value = "lb-server:latest")]
    pub server_image: String,

    /// Container runtime CLI (docker, podman, ...).
    #[arg(long, env = "CONTAINER_RUNTIME", default_value = "docker")]
    pub container_runtime: String,

    /// Interval between health supervisor ticks.
    #[arg(long, env = "HEALTH_INTERVAL", value_parser = parse_seconds, default_value = "10")]
    pub health_interval: Duration,

    /// Bounded timeout for a single heartbeat probe.
    #[arg(long, env = "HEALTH_TIMEOUT", value_parser = parse_seconds, default_value = "5")]
    pub health_timeout: Duration,

    /// Bounded timeout for a single proxied upstream request.
    #[arg(long, env = "PROXY_TIMEOUT", value_parser = parse_seconds, default_value = "10")]
    pub proxy_timeout: Duration,

    /// Backends spawned at startup.
    #[arg(long, env = "INITIAL_BACKENDS", default_value_t = 3)]
    pub initial_backends: usize,

    /// Address the admin/routing HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Delay after a container `run` before it's assumed reachable.
    #[arg(long, env = "SETTLE_DELAY", value_parser = parse_seconds, default_value = "1")]
    pub settle_delay: Duration,
}
