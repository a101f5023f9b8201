//! Backend identity.

use std::fmt;

use crate::error::RingError;

/// Opaque, non-empty identifier for a backend instance.
///
/// Used both as the routing identity in the [`crate::Ring`] and as the
/// container name passed to the container driver (see the fleet crate).
/// The two are deliberately the same value so there is never a translation
/// step between "who owns this slot" and "what do I ask the orchestrator
/// to spawn/remove/probe".
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackendId(String);

impl BackendId {
    /// Construct a `BackendId`, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, RingError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RingError::InvalidBackendId(
                "backend id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackendId({:?})", self.0)
    }
}

impl AsRef<str> for BackendId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
