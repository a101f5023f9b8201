//! The consistent-hash ring: a fixed-capacity slot array populated by
//! virtual replicas of each backend.
//!
//! # Algorithm
//!
//! - **Placement**: `K` candidate slots per backend, one per replica index,
//!   computed by [`crate::hash::replica_hash`]. A colliding candidate is
//!   resolved by forward linear probing to the next empty slot. This keeps
//!   the replica count stable at exactly `K` unless the ring saturates,
//!   which matters for fairness (a backend that "gives up" on a colliding
//!   replica would be silently under-represented).
//! - **Lookup**: binary search over a sorted index of occupied slots for the
//!   smallest occupied slot `>= fingerprint`, wrapping to the first occupied
//!   slot if none exists. O(log S) where S is the number of occupied slots.
//! - **Index maintenance**: the sorted index is rebuilt from scratch on every
//!   mutation (O(M)). For the reference capacity (`M` ~= 512-4096) this is
//!   simpler than an incrementally-maintained balanced tree and no slower in
//!   practice (mutations are rare, operator- or health-driven; lookups are
//!   the hot path).
//!
//! # Thread safety
//!
//! `Ring` itself is not internally synchronized. It is meant to live
//! behind a single exclusive lock alongside the fleet registry (see the
//! `fleet` crate), so that ring and registry mutate atomically and a
//! concurrent lookup never observes a half-updated ring.

use std::collections::HashMap;
use std::fmt;

use crate::backend::BackendId;
use crate::error::{RingError, Result};
use crate::hash;

/// A position in the ring's slot space, `[0, capacity)`.
pub type Slot = u32;

/// Outcome of [`Ring::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The backend was placed; carries the slots it now occupies (length is
    /// `K` unless the ring is near saturation, see module docs).
    Added(Vec<Slot>),
    /// The backend id was already present; the ring is unchanged.
    AlreadyPresent,
    /// No empty slot could be found for one of the `K` replicas. Every slot
    /// claimed earlier in this call has been rolled back; ring state is
    /// exactly as it was before the call.
    RingFull,
}

/// Outcome of [`Ring::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The backend's slots were cleared.
    Removed,
    /// The backend id was not present; the ring is unchanged.
    NotPresent,
}

/// Fixed-capacity consistent-hash ring.
pub struct Ring {
    capacity: usize,
    replicas: usize,
    slots: Vec<Option<BackendId>>,
    /// Sorted positions of occupied slots; rebuilt after every mutation.
    occupied: Vec<Slot>,
    /// Slots owned by each backend, mirrored for O(1) removal.
    owners: HashMap<BackendId, Vec<Slot>>,
}

impl Ring {
    /// Construct an empty ring with capacity `M` and `K` virtual replicas
    /// per backend.
    pub fn new(capacity: usize, replicas: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RingError::InvalidConfig(
                "ring capacity (M) must be nonzero".to_string(),
            ));
        }
        if replicas == 0 {
            return Err(RingError::InvalidConfig(
                "virtual replica count (K) must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            capacity,
            replicas,
            slots: vec![None; capacity],
            occupied: Vec::new(),
            owners: HashMap::new(),
        })
    }

    /// Ring capacity (`M`).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Configured virtual replica count (`K`).
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Add `id` to the ring, claiming up to `K` slots.
    #[tracing::instrument(level = "debug", skip(self), fields(backend = %id))]
    pub fn add(&mut self, id: BackendId) -> AddOutcome {
        if self.owners.contains_key(&id) {
            return AddOutcome::AlreadyPresent;
        }

        let mut claimed = Vec::with_capacity(self.replicas);
        for j in 0..self.replicas as u32 {
            let start = hash::replica_hash(id.as_str(), j, self.capacity);
            match self.probe_from(start) {
                Some(slot) => {
                    self.slots[slot as usize] = Some(id.clone());
                    claimed.push(slot);
                }
                None => {
                    for slot in &claimed {
                        self.slots[*slot as usize] = None;
                    }
                    tracing::warn!(backend = %id, "ring full, rolled back partial placement");
                    return AddOutcome::RingFull;
                }
            }
        }

        self.owners.insert(id, claimed.clone());
        self.rebuild_index();
        AddOutcome::Added(claimed)
    }

    /// Remove `id` from the ring, clearing every slot it occupies.
    #[tracing::instrument(level = "debug", skip(self), fields(backend = %id))]
    pub fn remove(&mut self, id: &BackendId) -> RemoveOutcome {
        match self.owners.remove(id) {
            None => RemoveOutcome::NotPresent,
            Some(slots) => {
                for slot in slots {
                    self.slots[slot as usize] = None;
                }
                self.rebuild_index();
                RemoveOutcome::Removed
            }
        }
    }

    /// Find the backend owning `fingerprint`, or `None` if the ring is empty.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn lookup(&self, fingerprint: Slot) -> Option<BackendId> {
        if self.occupied.is_empty() {
            return None;
        }
        let slot = match self.occupied.binary_search(&fingerprint) {
            Ok(idx) => self.occupied[idx],
            Err(idx) if idx < self.occupied.len() => self.occupied[idx],
            Err(_) => self.occupied[0],
        };
        self.slots[slot as usize].clone()
    }

    /// All backend ids currently present in the ring.
    pub fn members(&self) -> Vec<BackendId> {
        self.owners.keys().cloned().collect()
    }

    /// Number of distinct backends in the ring.
    pub fn member_count(&self) -> usize {
        self.owners.len()
    }

    /// Number of occupied slots across all backends.
    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Slots currently owned by `id`, if present.
    pub fn slots_of(&self, id: &BackendId) -> Option<&[Slot]> {
        self.owners.get(id).map(Vec::as_slice)
    }

    fn probe_from(&self, start: Slot) -> Option<Slot> {
        for i in 0..self.capacity {
            let slot = (start as usize + i) % self.capacity;
            if self.slots[slot].is_none() {
                return Some(slot as Slot);
            }
        }
        None
    }

    fn rebuild_index(&mut self) {
        self.occupied = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, owner)| owner.is_some().then_some(slot as Slot))
            .collect();
    }
}

impl fmt::Debug for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &self.capacity)
            .field("replicas", &self.replicas)
            .field("members", &self.owners.len())
            .field("occupied", &self.occupied.len())
            .finish()
    }
}
