//! Consistent-hash ring for the load balancer's routing layer.
//!
//! This crate provides the fixed-capacity slot ring (component A of the
//! system): backend identity, the single strong-hash contract used for both
//! replica placement and fingerprint reduction, and the ring itself.
//!
//! It intentionally has no notion of containers, HTTP, or health. Those
//! live in the `fleet` and `gateway` crates, which treat `Ring` as a pure
//! in-memory data structure to be held behind their own lock.

pub mod backend;
pub mod error;
pub mod hash;
pub mod ring;

pub use backend::BackendId;
pub use error::{Result, RingError};
pub use ring::{AddOutcome, RemoveOutcome, Ring, Slot};
