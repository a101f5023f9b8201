//! Health supervisor (component D): a background task that periodically
//! probes every backend and replaces any that fail.
//!
//! Constructed explicitly after the [`Fleet`] it supervises is fully built,
//! and shut down explicitly on process exit via [`SupervisorHandle::shutdown`].
//! This avoids the "thread created in constructor" anti-pattern flagged in
//! the design notes, by making start and stop two separate calls rather
//! than something that happens implicitly inside `Fleet::new`.

use std::sync::Arc;
use std::time::Duration;

use ringcore::{AddOutcome, BackendId, RemoveOutcome};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::driver::{ContainerDriver, ProbeResult};
use crate::ids::random_backend_id;
use crate::state::Fleet;

/// A running health supervisor task.
pub struct SupervisorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SupervisorHandle {
    /// Signal the supervisor to stop and wait for its current tick (if any)
    /// to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// Spawn the health supervisor loop on the current tokio runtime.
///
/// Ticks every `health_interval`; each tick snapshots the registry,
/// probes every backend concurrently *without* holding the fleet lock
/// (probes are I/O), then re-acquires the lock only to act on backends
/// that are still present and came back unhealthy.
pub fn spawn(
    fleet: Arc<Fleet>,
    driver: Arc<dyn ContainerDriver>,
    health_interval: Duration,
) -> SupervisorHandle {
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(health_interval);
        // The first tick fires immediately; skip it so we don't probe a
        // fleet that was just spawned a moment ago and hasn't settled.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                _ = ticker.tick() => {
                    run_tick(&fleet, driver.as_ref()).await;
                }
            }
        }
    });

    SupervisorHandle { cancel, task }
}

#[tracing::instrument(level = "debug", skip_all)]
async fn run_tick(fleet: &Fleet, driver: &dyn ContainerDriver) {
    // Step 1: snapshot under the lock.
    let candidates = fleet.snapshot().replicas;

    // Step 2: probe concurrently, outside the lock.
    let probes = futures::future::join_all(
        candidates
            .iter()
            .map(|id| async move { (id.clone(), driver.probe(id.as_str()).await) }),
    )
    .await;

    // Step 3: act on failures, re-acquiring the lock per backend.
    for (id, result) in probes {
        if result == ProbeResult::Unhealthy && fleet.contains(&id) {
            replace_backend(fleet, driver, &id).await;
        }
    }
}

/// The replacement protocol from the design: remove the failed container
/// first, then purge it from ring and registry together, then try to
/// spawn and register a replacement.
#[tracing::instrument(level = "info", skip(fleet, driver))]
async fn replace_backend(fleet: &Fleet, driver: &dyn ContainerDriver, failed: &BackendId) {
    let _ = driver.remove(failed.as_str()).await;

    if fleet.remove_and_drop(failed) != RemoveOutcome::Removed {
        // Another admin mutation already removed it between the snapshot
        // and now; nothing left to replace.
        return;
    }

    let new_id = random_backend_id();
    match driver.spawn(new_id.as_str()).await {
        Ok(()) => match fleet.try_insert(new_id.clone()) {
            AddOutcome::Added(_) => {
                tracing::info!(failed = %failed, replacement = %new_id, "replaced unhealthy backend");
            }
            AddOutcome::RingFull => {
                tracing::warn!(replacement = %new_id, "ring full, replacement spawned but not routable");
            }
            AddOutcome::AlreadyPresent => unreachable!("freshly generated id cannot collide"),
        },
        Err(err) => {
            tracing::warn!(failed = %failed, error = %err, "replacement spawn failed, retrying next tick");
        }
    }
}
