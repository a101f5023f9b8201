//! Error types for fleet management.

use ringcore::RingError;

/// Errors surfaced by container driver operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverError {
    /// The orchestrator command or API call failed.
    #[error("driver operation failed for {name}: {reason}")]
    Failed { name: String, reason: String },

    /// The outbound probe/spawn call exceeded its bounded timeout.
    #[error("driver operation timed out for {name}")]
    Timeout { name: String },
}

/// Errors surfaced by admin-mutation validation, independent of HTTP.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    /// `hostnames` longer than `n` in an `/add` or `/rm` request.
    #[error("<Error> Length of hostname list is more than {action} instances")]
    TooManyHostnames { action: &'static str },
}

/// Top-level error type for the fleet crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FleetError {
    #[error(transparent)]
    Ring(#[from] RingError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
