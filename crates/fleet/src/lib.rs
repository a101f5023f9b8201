//! Fleet management (components B, C, D): the registry of live backend
//! containers, the driver abstraction used to spawn/remove/probe them, and
//! the background health supervisor that keeps the fleet at full strength.
//!
//! [`state::Fleet`] is the single lock covering both the hash ring
//! (`ringcore`) and the registry; everything else in this crate either reads
//! through it or mutates it through one of its methods.

pub mod driver;
pub mod error;
pub mod ids;
pub mod registry;
pub mod state;
pub mod supervisor;

pub use driver::{ContainerDriver, DockerDriver, DockerDriverConfig, FakeDriver, ProbeResult};
pub use error::{DriverError, FleetError, ValidationError};
pub use ids::random_backend_id;
pub use registry::RegistryEntry;
pub use state::{Fleet, RepState};
pub use supervisor::{spawn as spawn_supervisor, SupervisorHandle};
