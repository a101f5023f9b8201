//! The fleet lock: a single exclusive lock covering both the hash ring and
//! the backend registry.
//!
//! # Why `parking_lot::RwLock` and not `tokio::sync::RwLock`
//!
//! Every critical section taken through [`Fleet`] is pure in-memory work
//! (slot arithmetic, hash map lookups, `Vec` pushes). None of it ever
//! awaits. An async-aware lock would add overhead for no benefit, and
//! worse, its mere presence invites holding it across an `.await` "just
//! this once", exactly the mistake that would serialize all routing
//! behind a slow container spawn or HTTP probe. A synchronous
//! `parking_lot::RwLock` makes holding it across an await a
//! borrow-checker error instead of a latency incident.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use ringcore::{AddOutcome, BackendId, RemoveOutcome, Ring, RingError, Slot};

use crate::registry::RegistryEntry;

/// Snapshot of fleet membership, as reported by `GET /rep`.
#[derive(Debug, Clone)]
pub struct RepState {
    pub n: usize,
    pub replicas: Vec<BackendId>,
}

struct Inner {
    ring: Ring,
    registry: HashMap<BackendId, RegistryEntry>,
}

/// The fleet registry and hash ring, held behind one lock.
///
/// This is the "authoritative mapping of backend identity to container
/// handle to slot-set in the ring" from the data model: the registry owns
/// membership, the ring is its routing-optimized derived index, and both
/// change atomically from the perspective of a concurrent reader.
pub struct Fleet {
    inner: RwLock<Inner>,
}

impl Fleet {
    pub fn new(ring_slots: usize, virtual_replicas: usize) -> Result<Arc<Self>, RingError> {
        Ok(Arc::new(Self {
            inner: RwLock::new(Inner {
                ring: Ring::new(ring_slots, virtual_replicas)?,
                registry: HashMap::new(),
            }),
        }))
    }

    /// Route a fingerprint to its owning backend. Does not touch the
    /// registry; callers proxy outside this call, never holding the lock
    /// across the upstream request.
    pub fn lookup(&self, fingerprint: Slot) -> Option<BackendId> {
        self.inner.read().ring.lookup(fingerprint)
    }

    /// Current fleet membership, for `GET /rep` and the health
    /// supervisor's per-tick snapshot.
    pub fn snapshot(&self) -> RepState {
        let inner = self.inner.read();
        let replicas: Vec<BackendId> = inner.registry.keys().cloned().collect();
        RepState {
            n: replicas.len(),
            replicas,
        }
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: &BackendId) -> bool {
        self.inner.read().registry.contains_key(id)
    }

    /// Insert a backend that the driver has already confirmed spawned:
    /// claim its ring slots and record a registry entry in one critical
    /// section.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_insert(&self, id: BackendId) -> AddOutcome {
        let mut inner = self.inner.write();
        let outcome = inner.ring.add(id.clone());
        if let AddOutcome::Added(ref slots) = outcome {
            inner
                .registry
                .insert(id, RegistryEntry::new(slots.clone()));
        }
        outcome
    }

    /// Purge `id`'s ring slots and clear its registry entry's slot mirror,
    /// but keep the registry entry itself. Used by the admin `/rm` path,
    /// which removes the container only after this call and drops the
    /// entry only after that succeeds (purge ring, remove container, drop
    /// entry: the lifecycle order from the data model).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn purge_ring_slots(&self, id: &BackendId) -> RemoveOutcome {
        let mut inner = self.inner.write();
        let outcome = inner.ring.remove(id);
        if let RemoveOutcome::Removed = outcome {
            if let Some(entry) = inner.registry.get_mut(id) {
                entry.slots.clear();
            }
        }
        outcome
    }

    /// Drop `id`'s registry entry entirely. Call only after the driver has
    /// been asked to remove the corresponding container.
    pub fn drop_registry_entry(&self, id: &BackendId) -> bool {
        self.inner.write().registry.remove(id).is_some()
    }

    /// Purge ring slots and drop the registry entry together, in one
    /// critical section. Used by the health supervisor's replacement
    /// protocol, which removes the container *before* touching the
    /// registry (see `fleet::supervisor`), unlike the admin `/rm` path.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn remove_and_drop(&self, id: &BackendId) -> RemoveOutcome {
        let mut inner = self.inner.write();
        let outcome = inner.ring.remove(id);
        if let RemoveOutcome::Removed = outcome {
            inner.registry.remove(id);
        }
        outcome
    }

    /// Build the removal set for `/rm`: named hostnames that currently
    /// exist, topped up with a uniform-random sample of the remaining
    /// backends until `n` are chosen (or the fleet is exhausted).
    pub fn select_removal_set(&self, n: usize, hostnames: &[BackendId]) -> Vec<BackendId> {
        let inner = self.inner.read();

        let mut chosen: Vec<BackendId> = hostnames
            .iter()
            .filter(|h| inner.registry.contains_key(h))
            .cloned()
            .collect();
        chosen.truncate(n);

        if chosen.len() < n {
            let remaining: Vec<BackendId> = inner
                .registry
                .keys()
                .filter(|id| !chosen.contains(id))
                .cloned()
                .collect();
            let need = n - chosen.len();
            let mut rng = rand::rng();
            let sample: Vec<BackendId> = remaining
                .choose_multiple(&mut rng, need.min(remaining.len()))
                .cloned()
                .collect();
            chosen.extend(sample);
        }

        chosen
    }
}
