use crate::error::{ClientError, Result};

/// The server globals this client cannot run without.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Compositor,
    Shm,
    WmBase,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Compositor, Capability::Shm, Capability::WmBase];

    pub fn from_interface(interface: &str) -> Option<Self> {
        match interface {
            "wl_compositor" => Some(Capability::Compositor),
            "wl_shm" => Some(Capability::Shm),
            "xdg_wm_base" => Some(Capability::WmBase),
            _ => None,
        }
    }

    pub fn interface(self) -> &'static str {
        match self {
            Capability::Compositor => "wl_compositor",
            Capability::Shm => "wl_shm",
            Capability::WmBase => "xdg_wm_base",
        }
    }

    /// Highest protocol version this client speaks for the interface.
    pub fn max_version(self) -> u32 {
        match self {
            Capability::Compositor => 4,
            Capability::Shm => 1,
            Capability::WmBase => 2,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug)]
pub struct CapabilityBinding<H> {
    pub id: u32,
    pub interface: &'static str,
    pub handle: H,
    pub version: u32,
}

/// Tracks at most one live binding per required interface.
///
/// `H` is whatever the bind step produces; the Wayland side stores proxies,
/// tests store plain values.
#[derive(Debug)]
pub struct GlobalRegistry<H> {
    bindings: [Option<CapabilityBinding<H>>; 3],
}

impl<H> Default for GlobalRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> GlobalRegistry<H> {
    pub fn new() -> Self {
        Self {
            bindings: [None, None, None],
        }
    }

    /// Handles a `global` advertisement. Untracked interfaces are ignored and
    /// yield `Ok(None)`; a second advertisement for a bound interface is fatal.
    pub fn on_advertise<F>(
        &mut self,
        id: u32,
        interface: &str,
        version: u32,
        bind: F,
    ) -> Result<Option<Capability>>
    where
        F: FnOnce(Capability, u32) -> H,
    {
        let Some(capability) = Capability::from_interface(interface) else {
            return Ok(None);
        };

        let slot = &mut self.bindings[capability.index()];
        if slot.is_some() {
            return Err(ClientError::DuplicateGlobal {
                interface: capability.interface(),
                id,
            });
        }

        let version = version.min(capability.max_version());
        *slot = Some(CapabilityBinding {
            id,
            interface: capability.interface(),
            handle: bind(capability, version),
            version,
        });
        Ok(Some(capability))
    }

    /// Handles a `global_remove`. Losing a tracked global is fatal; unknown
    /// ids are none of our business.
    pub fn on_remove(&self, id: u32) -> Result<()> {
        match self.bindings.iter().flatten().find(|binding| binding.id == id) {
            Some(binding) => Err(ClientError::GlobalRemoved {
                interface: binding.interface,
                id,
            }),
            None => Ok(()),
        }
    }

    /// Run after the initial round-trip: every required global must be bound.
    pub fn verify(&self) -> Result<()> {
        for capability in Capability::ALL {
            if self.get(capability).is_none() {
                return Err(ClientError::MissingGlobal(capability.interface()));
            }
        }
        Ok(())
    }

    pub fn get(&self, capability: Capability) -> Option<&CapabilityBinding<H>> {
        self.bindings[capability.index()].as_ref()
    }

    pub fn take(&mut self, capability: Capability) -> Option<CapabilityBinding<H>> {
        self.bindings[capability.index()].take()
    }
}
