use super::{Capability, GlobalRegistry, WindowCore};
use crate::render::GpuBackend;

/// A protocol object (or group of objects) destroyed during teardown.
pub trait Release {
    fn release(self);
}

/// Releases everything the client created, newest first: the render surface,
/// the shell window, then the bound globals in reverse bind order. Whatever was
/// already released, or never created, is skipped, so this can run twice.
pub fn release_client<B, S, H>(window: &mut WindowCore<B>, shell: &mut Option<S>, globals: &mut GlobalRegistry<H>)
where
    B: GpuBackend,
    S: Release,
    H: Release,
{
    window.render.teardown();

    if let Some(shell) = shell.take() {
        shell.release();
    }

    for capability in Capability::ALL.into_iter().rev() {
        if let Some(binding) = globals.take(capability) {
            binding.handle.release();
        }
    }
}
