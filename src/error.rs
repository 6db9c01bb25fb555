use thiserror::Error;

/// Every way the client can fail. All of them end the session.
#[derive(Debug, Error)]
pub enum ClientError {
    // Resolution faults
    #[error("wl_registry: duplicate {interface} (id={id:08x})")]
    DuplicateGlobal { interface: &'static str, id: u32 },
    #[error("wl_registry: no {0} found")]
    MissingGlobal(&'static str),
    #[error("wl_registry: {interface} disappeared (id={id:08x})")]
    GlobalRemoved { interface: &'static str, id: u32 },

    // Protocol faults
    #[error("wl_display: connect failed: {0}")]
    Connect(#[from] wayland_client::ConnectError),
    #[error("wl_display: dispatch failed: {0}")]
    Dispatch(#[from] wayland_client::DispatchError),
    #[error("{0}: object is no longer alive")]
    DeadObject(&'static str),
    #[error("xdg_surface: surface not configured")]
    NotConfigured,

    // GPU faults
    #[error("{step}: {reason}")]
    Gpu { step: &'static str, reason: String },
}

impl ClientError {
    pub fn gpu(step: &'static str, reason: impl ToString) -> Self {
        Self::Gpu {
            step,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
