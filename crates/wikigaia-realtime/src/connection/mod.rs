//! Connection handles, the registry, and the periodic timers.

pub mod handle;
pub mod heartbeat;
pub mod registry;

pub use handle::ConnectionHandle;
pub use registry::ConnectionRegistry;
