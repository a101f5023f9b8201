//! Process entry point: configuration, wiring, and startup/shutdown for
//! the load balancer binary.

pub mod config;

pub use config::Config;
