//! Config surface seam: the management endpoint the roles service
//! cooperatively from their main loop, one request per poll.

/// Management request decoded by the surface on the endpoint's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Delete the persisted pairing; takes effect on the next boot.
    Reset,
}

/// The configuration server, seen from the core as a black box that must be
/// polled often enough to stay responsive.
pub trait ConfigSurface {
    /// Service at most one pending request, returning any command it carried
    /// for the endpoint.
    fn poll(&mut self) -> Option<ConfigCommand>;
}

/// Surface for hosts that expose no management endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConfig;

impl ConfigSurface for NullConfig {
    fn poll(&mut self) -> Option<ConfigCommand> {
        None
    }
}
