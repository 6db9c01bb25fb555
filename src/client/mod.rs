mod fault;
mod geometry;
pub(crate) mod handshake;
mod registry;
mod shutdown;
mod state;
mod teardown;
mod window;

pub use fault::FaultLatch;
pub use geometry::{describe_states, presented_states, ToplevelGeometry};
pub use handshake::{ConfigureHandshake, ConfigureSink};
pub use registry::{Capability, GlobalRegistry};
pub use shutdown::ShutdownSignal;
pub use state::ClientState;
pub use teardown::{release_client, Release};
pub use window::WindowCore;
