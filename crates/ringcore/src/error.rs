//! Error types for the hash ring.

/// Result type alias for ring operations.
pub type Result<T> = std::result::Result<T, RingError>;

/// Errors that can occur while mutating or constructing a [`crate::Ring`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RingError {
    /// `add` could not place `K` replicas for the backend anywhere on the
    /// ring. Recoverable: the caller may retry with fewer replicas or after
    /// another backend is removed. Existing ring state is untouched.
    #[error("ring is full: could not place all virtual replicas")]
    RingFull,

    /// `add` was called for a backend id already present in the ring.
    #[error("backend already present in ring")]
    AlreadyPresent,

    /// `remove` was called for a backend id not present in the ring.
    #[error("backend not present in ring")]
    NotPresent,

    /// A `BackendId` failed construction (empty string).
    #[error("invalid backend id: {0}")]
    InvalidBackendId(String),

    /// `Ring::new` was called with a degenerate configuration.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
}
