use tracing::{debug, info};
use wayland_client::{
    protocol::{wl_compositor, wl_registry, wl_shm, wl_surface},
    Connection, Dispatch, Proxy, QueueHandle,
};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

use super::{
    describe_states, presented_states, release_client, Capability, ConfigureSink, FaultLatch,
    GlobalRegistry, Release, WindowCore,
};
use crate::config::WindowConfig;
use crate::error::{ClientError, Result};
use crate::render::{EglBackend, RenderSurfaceManager};

/// Proxy produced by binding one of the required globals.
pub enum BoundGlobal {
    Compositor(wl_compositor::WlCompositor),
    Shm(wl_shm::WlShm),
    WmBase(xdg_wm_base::XdgWmBase),
}

impl GlobalRegistry<BoundGlobal> {
    pub fn compositor(&self) -> Option<&wl_compositor::WlCompositor> {
        match self.get(Capability::Compositor).map(|b| &b.handle) {
            Some(BoundGlobal::Compositor(compositor)) => Some(compositor),
            _ => None,
        }
    }

    pub fn wm_base(&self) -> Option<&xdg_wm_base::XdgWmBase> {
        match self.get(Capability::WmBase).map(|b| &b.handle) {
            Some(BoundGlobal::WmBase(wm_base)) => Some(wm_base),
            _ => None,
        }
    }
}

/// The wl_surface with its xdg_surface and xdg_toplevel roles.
pub struct ShellWindow {
    pub surface: wl_surface::WlSurface,
    pub xdg_surface: xdg_surface::XdgSurface,
    pub toplevel: xdg_toplevel::XdgToplevel,
}

impl Release for ShellWindow {
    fn release(self) {
        self.toplevel.destroy();
        self.xdg_surface.destroy();
        self.surface.destroy();
    }
}

impl Release for BoundGlobal {
    fn release(self) {
        match self {
            BoundGlobal::WmBase(wm_base) => wm_base.destroy(),
            // wl_compositor and wl_shm v1 have no destructor request; dropping
            // the proxy is all there is.
            BoundGlobal::Shm(shm) => debug!("releasing {}", shm.id()),
            BoundGlobal::Compositor(compositor) => debug!("releasing {}", compositor.id()),
        }
    }
}

impl ConfigureSink for ShellWindow {
    fn ack_configure(&mut self, serial: u32) -> Result<()> {
        if !self.xdg_surface.is_alive() {
            return Err(ClientError::DeadObject("xdg_surface"));
        }
        self.xdg_surface.ack_configure(serial);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.surface.is_alive() {
            return Err(ClientError::DeadObject("wl_surface"));
        }
        self.surface.commit();
        Ok(())
    }
}

pub struct ClientState {
    pub config: WindowConfig,
    pub globals: GlobalRegistry<BoundGlobal>,
    pub shell: Option<ShellWindow>,
    pub window: WindowCore<EglBackend>,
    fault: FaultLatch,
}

impl ClientState {
    pub fn new(config: WindowConfig, backend: EglBackend) -> Self {
        let render = RenderSurfaceManager::new(backend, config.clear_color);
        let window = WindowCore::new(render, config.minimum_size);
        Self {
            config,
            globals: GlobalRegistry::new(),
            shell: None,
            window,
            fault: FaultLatch::new(),
        }
    }

    /// Surfaces a fault latched while dispatching the last batch.
    pub fn check(&mut self) -> Result<()> {
        self.fault.check()
    }

    pub fn is_closing(&self) -> bool {
        self.window.shutdown.is_closing()
    }

    /// Creates the surface and its shell roles, then commits once so the
    /// compositor sends the first configure.
    pub fn create_window(&mut self, qh: &QueueHandle<Self>) -> Result<()> {
        let compositor = self
            .globals
            .compositor()
            .ok_or(ClientError::MissingGlobal(Capability::Compositor.interface()))?;
        let wm_base = self
            .globals
            .wm_base()
            .ok_or(ClientError::MissingGlobal(Capability::WmBase.interface()))?;

        info!("creating surface");
        let surface = compositor.create_surface(qh, ());
        if !surface.is_alive() {
            return Err(ClientError::DeadObject("wl_surface"));
        }

        info!("creating xdg_surface");
        let xdg_surface = wm_base.get_xdg_surface(&surface, qh, ());
        if !xdg_surface.is_alive() {
            return Err(ClientError::DeadObject("xdg_surface"));
        }

        info!("creating xdg_toplevel");
        let toplevel = xdg_surface.get_toplevel(qh, ());
        if !toplevel.is_alive() {
            return Err(ClientError::DeadObject("xdg_toplevel"));
        }

        info!("setting xdg_toplevel properties");
        toplevel.set_app_id(self.config.app_id.clone());
        toplevel.set_title(self.config.title.clone());

        info!("committing surface to trigger configure events");
        surface.commit();

        self.shell = Some(ShellWindow {
            surface,
            xdg_surface,
            toplevel,
        });
        Ok(())
    }

    pub fn initialize_render(&mut self) -> Result<()> {
        let shell = self
            .shell
            .as_ref()
            .ok_or(ClientError::DeadObject("wl_surface"))?;
        self.window.initialize_render(&shell.surface)
    }

    /// Releases the render surface, the shell objects, then the globals.
    /// Safe to call more than once.
    pub fn teardown(&mut self) {
        info!("cleaning up");
        if self.window.render.is_initialized() {
            debug!("releasing render surface ({})", self.window.render.size());
        }
        release_client(&mut self.window, &mut self.shell, &mut self.globals);
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for ClientState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if state.fault.is_faulted() {
            return;
        }
        match event {
            wl_registry::Event::Global { name, interface, version } => {
                info!(target: "registry", "[+] id={:08x} {} v{}", name, interface, version);
                let globals = &mut state.globals;
                let bound = state.fault.run(|| {
                    globals.on_advertise(name, &interface, version, |capability, version| match capability {
                        Capability::Compositor => BoundGlobal::Compositor(registry.bind(name, version, qh, ())),
                        Capability::Shm => BoundGlobal::Shm(registry.bind(name, version, qh, ())),
                        Capability::WmBase => BoundGlobal::WmBase(registry.bind(name, version, qh, ())),
                    })
                });
                if let Some(binding) = bound.flatten().and_then(|capability| state.globals.get(capability)) {
                    debug!(target: "registry", "bound {} v{}", binding.interface, binding.version);
                }
            }
            wl_registry::Event::GlobalRemove { name } => {
                info!(target: "registry", "[-] id={:08x}", name);
                let result = state.globals.on_remove(name);
                state.fault.record(result);
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for ClientState {
    fn event(
        _: &mut Self,
        _: &wl_compositor::WlCompositor,
        _: wl_compositor::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_shm::WlShm, ()> for ClientState {
    fn event(
        _: &mut Self,
        _: &wl_shm::WlShm,
        event: wl_shm::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_shm::Event::Format { format } = event {
            debug!(target: "wl_shm", "format {:?}", format);
        }
    }
}

impl Dispatch<wl_surface::WlSurface, ()> for ClientState {
    fn event(
        _: &mut Self,
        _: &wl_surface::WlSurface,
        _: wl_surface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for ClientState {
    fn event(
        _: &mut Self,
        xdg_wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            info!(target: "xdg_wm_base", "ping {}", serial);
            xdg_wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, ()> for ClientState {
    fn event(
        state: &mut Self,
        _: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if state.fault.is_faulted() {
            return;
        }
        if let xdg_surface::Event::Configure { serial } = event {
            info!(target: "xdg_surface", "configure {}", serial);
            let Some(shell) = state.shell.as_mut() else {
                return;
            };
            let window = &mut state.window;
            state.fault.run(|| window.on_surface_configure(serial, shell));
            log_cycle(&state.window);
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for ClientState {
    fn event(
        state: &mut Self,
        _: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if state.fault.is_faulted() {
            return;
        }
        match event {
            xdg_toplevel::Event::Configure { width, height, states } => {
                info!(target: "xdg_toplevel", "configure width={}, height={}", width, height);
                info!(target: "xdg_toplevel", "states = {}", describe_states(&presented_states(&states)));
                let Some(shell) = state.shell.as_mut() else {
                    return;
                };
                let window = &mut state.window;
                state.fault.run(|| window.on_toplevel_configure(width, height, shell));
                log_cycle(&state.window);
            }
            xdg_toplevel::Event::Close => {
                info!(target: "xdg_toplevel", "close");
                info!("closing");
                state.window.on_close();
            }
            _ => {}
        }
    }
}

fn log_cycle(window: &WindowCore<EglBackend>) {
    debug!(
        "handshake {:?} after {} cycle(s), last serial {}",
        window.handshake.state(),
        window.handshake.completed_cycles(),
        window.handshake.last_serial()
    );
}
