use tracing::debug;

use super::{ConfigureHandshake, ConfigureSink, ShutdownSignal, ToplevelGeometry};
use crate::error::{ClientError, Result};
use crate::render::{GpuBackend, RenderSurfaceManager};

/// Protocol-independent state of the single window: configure handshake,
/// negotiated geometry, render surface and close request.
pub struct WindowCore<B: GpuBackend> {
    pub handshake: ConfigureHandshake,
    pub render: RenderSurfaceManager<B>,
    pub shutdown: ShutdownSignal,
    geometry: Option<ToplevelGeometry>,
    minimum_size: ToplevelGeometry,
}

impl<B: GpuBackend> WindowCore<B> {
    pub fn new(render: RenderSurfaceManager<B>, minimum_size: ToplevelGeometry) -> Self {
        Self {
            handshake: ConfigureHandshake::new(),
            render,
            shutdown: ShutdownSignal::default(),
            geometry: None,
            minimum_size,
        }
    }

    pub fn on_surface_configure<S: ConfigureSink>(&mut self, serial: u32, sink: &mut S) -> Result<()> {
        self.handshake.on_surface_configure(serial, sink)?;
        Ok(())
    }

    /// Resolves the proposed size, applies it to a live render surface right
    /// away, then feeds the handshake.
    pub fn on_toplevel_configure<S: ConfigureSink>(
        &mut self,
        width: i32,
        height: i32,
        sink: &mut S,
    ) -> Result<ToplevelGeometry> {
        let geometry = ToplevelGeometry::resolve(width, height);
        self.geometry = Some(geometry);

        if self.render.resize(geometry)? {
            debug!("render surface now {}", geometry);
        }

        self.handshake.on_toplevel_configure(sink)?;
        Ok(geometry)
    }

    pub fn on_close(&mut self) {
        self.shutdown.request();
    }

    /// Size the render surface is first created with.
    pub fn initial_size(&self) -> ToplevelGeometry {
        self.geometry.unwrap_or(self.minimum_size)
    }

    /// Creates the render surface for `target`. Only allowed once the first
    /// configure cycle was acknowledged.
    pub fn initialize_render(&mut self, target: &B::Target) -> Result<()> {
        if !self.handshake.is_configured() {
            return Err(ClientError::NotConfigured);
        }
        let size = self.initial_size();
        self.render.initialize(target, size)
    }
}
