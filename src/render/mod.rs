mod egl;
mod surface;

pub use egl::EglBackend;
pub use surface::{GpuBackend, RenderSurfaceManager};

#[cfg(test)]
pub(crate) use surface::tests;
