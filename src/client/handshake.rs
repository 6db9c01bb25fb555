use tracing::info;

use crate::error::Result;

/// Where the handshake sends its acknowledgement and commit.
pub trait ConfigureSink {
    fn ack_configure(&mut self, serial: u32) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    Idle,
    SurfaceConfigured,
    ToplevelConfigured,
    /// Only observable if acknowledging failed.
    BothConfigured,
    Acknowledged,
}

/// Waits for both the xdg_surface and the xdg_toplevel configure of a cycle,
/// in either order, then acknowledges the surface serial and commits once.
#[derive(Debug, Default)]
pub struct ConfigureHandshake {
    surface_configured: bool,
    toplevel_configured: bool,
    serial: u32,
    configured: bool,
    cycles: u64,
}

impl ConfigureHandshake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this notification completed the cycle.
    pub fn on_surface_configure<S: ConfigureSink>(&mut self, serial: u32, sink: &mut S) -> Result<bool> {
        self.serial = serial;
        self.surface_configured = true;
        self.advance(sink)
    }

    /// Returns `true` if this notification completed the cycle.
    pub fn on_toplevel_configure<S: ConfigureSink>(&mut self, sink: &mut S) -> Result<bool> {
        self.toplevel_configured = true;
        self.advance(sink)
    }

    fn advance<S: ConfigureSink>(&mut self, sink: &mut S) -> Result<bool> {
        if self.state() != HandshakeState::BothConfigured {
            return Ok(false);
        }
        self.finish(sink)?;
        Ok(true)
    }

    fn finish<S: ConfigureSink>(&mut self, sink: &mut S) -> Result<()> {
        info!("acknowledging configure");
        sink.ack_configure(self.serial)?;

        info!("committing surface");
        sink.commit()?;

        self.surface_configured = false;
        self.toplevel_configured = false;
        self.configured = true;
        self.cycles += 1;
        Ok(())
    }

    pub fn state(&self) -> HandshakeState {
        match (self.surface_configured, self.toplevel_configured) {
            (true, true) => HandshakeState::BothConfigured,
            (true, false) => HandshakeState::SurfaceConfigured,
            (false, true) => HandshakeState::ToplevelConfigured,
            (false, false) if self.cycles > 0 => HandshakeState::Acknowledged,
            (false, false) => HandshakeState::Idle,
        }
    }

    /// Set once the first cycle was acknowledged; never cleared.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn last_serial(&self) -> u32 {
        self.serial
    }

    pub fn completed_cycles(&self) -> u64 {
        self.cycles
    }
}
