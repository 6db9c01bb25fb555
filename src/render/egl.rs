use std::ffi::c_void;

use glow::HasContext;
use khronos_egl as egl;
use tracing::warn;
use wayland_client::{protocol::wl_surface::WlSurface, Connection, Proxy};
use wayland_egl::WlEglSurface;

use super::surface::{ConfigRequest, GpuBackend};
use crate::client::ToplevelGeometry;
use crate::error::{ClientError, Result};

/// EGL on top of the client's own `wl_display`, with GLES2 entry points loaded
/// through `glow` once a context is current.
pub struct EglBackend {
    egl: egl::Instance<egl::Static>,
    native_display: *mut c_void,
    gl: Option<glow::Context>,
}

impl EglBackend {
    pub fn new(connection: &Connection) -> Self {
        Self {
            egl: egl::Instance::new(egl::Static),
            native_display: connection.backend().display_ptr() as *mut c_void,
            gl: None,
        }
    }

    fn load_gl(&mut self) {
        let egl = &self.egl;
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                egl.get_proc_address(name)
                    .map_or(std::ptr::null(), |f| f as *const c_void)
            })
        };
        self.gl = Some(gl);
    }
}

impl GpuBackend for EglBackend {
    type Display = egl::Display;
    type Config = egl::Config;
    type Context = egl::Context;
    type Surface = egl::Surface;
    type Window = WlEglSurface;
    type Target = WlSurface;

    fn get_display(&mut self) -> Result<egl::Display> {
        unsafe { self.egl.get_display(self.native_display as egl::NativeDisplayType) }
            .ok_or_else(|| ClientError::gpu("eglGetDisplay", "failed to create EGL display"))
    }

    fn initialize(&mut self, display: egl::Display) -> Result<(i32, i32)> {
        self.egl
            .initialize(display)
            .map_err(|e| ClientError::gpu("eglInitialize", format!("failed to initialize EGL display: {}", e)))
    }

    fn config_count(&mut self, display: egl::Display) -> Result<usize> {
        self.egl
            .get_config_count(display)
            .map_err(|e| ClientError::gpu("eglGetConfigs", format!("failed to get number of EGL configs: {}", e)))
    }

    fn choose_config(&mut self, display: egl::Display, request: &ConfigRequest) -> Result<egl::Config> {
        #[rustfmt::skip]
        let attribs = [
            egl::SURFACE_TYPE, egl::WINDOW_BIT,
            egl::RENDERABLE_TYPE, egl::OPENGL_ES2_BIT,
            egl::RED_SIZE, request.red_bits,
            egl::GREEN_SIZE, request.green_bits,
            egl::BLUE_SIZE, request.blue_bits,
            egl::NONE,
        ];
        self.egl
            .choose_first_config(display, &attribs)
            .map_err(|e| ClientError::gpu("eglChooseConfig", format!("failed to get EGL config: {}", e)))?
            .ok_or_else(|| ClientError::gpu("eglChooseConfig", "no matching EGL config"))
    }

    fn create_window(&mut self, target: &WlSurface, size: ToplevelGeometry) -> Result<WlEglSurface> {
        WlEglSurface::new(target.id(), size.width, size.height)
            .map_err(|e| ClientError::gpu("wl_egl_window", format!("failed to create EGL window: {:?}", e)))
    }

    fn create_surface(
        &mut self,
        display: egl::Display,
        config: egl::Config,
        window: &WlEglSurface,
    ) -> Result<egl::Surface> {
        unsafe {
            self.egl
                .create_window_surface(display, config, window.ptr() as egl::NativeWindowType, None)
        }
        .map_err(|e| ClientError::gpu("eglCreateWindowSurface", format!("failed to create EGL surface: {}", e)))
    }

    fn create_context(
        &mut self,
        display: egl::Display,
        config: egl::Config,
        client_version: i32,
    ) -> Result<egl::Context> {
        let attribs = [egl::CONTEXT_CLIENT_VERSION, client_version, egl::NONE];
        self.egl
            .create_context(display, config, None, &attribs)
            .map_err(|e| ClientError::gpu("eglCreateContext", format!("failed to create EGL context: {}", e)))
    }

    fn make_current(
        &mut self,
        display: egl::Display,
        surface: egl::Surface,
        context: egl::Context,
    ) -> Result<()> {
        self.egl
            .make_current(display, Some(surface), Some(surface), Some(context))
            .map_err(|e| ClientError::gpu("eglMakeCurrent", format!("failed to activate EGL context: {}", e)))?;
        self.load_gl();
        Ok(())
    }

    fn resize_window(&mut self, window: &WlEglSurface, size: ToplevelGeometry) {
        window.resize(size.width, size.height, 0, 0);
    }

    fn set_viewport(&mut self, size: ToplevelGeometry) {
        if let Some(gl) = &self.gl {
            unsafe { gl.viewport(0, 0, size.width, size.height) };
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        if let Some(gl) = &self.gl {
            let [r, g, b, a] = color;
            unsafe {
                gl.clear_color(r, g, b, a);
                gl.clear(glow::COLOR_BUFFER_BIT);
                gl.flush();
            }
        }
    }

    fn present(&mut self, display: egl::Display, surface: egl::Surface) -> Result<()> {
        self.egl
            .swap_buffers(display, surface)
            .map_err(|e| ClientError::gpu("eglSwapBuffers", format!("failed to swap buffers: {}", e)))
    }

    fn destroy_context(&mut self, display: egl::Display, context: egl::Context) {
        self.gl = None;
        if let Err(e) = self.egl.make_current(display, None, None, None) {
            warn!("eglMakeCurrent: failed to release EGL context: {}", e);
        }
        if let Err(e) = self.egl.destroy_context(display, context) {
            warn!("eglDestroyContext: {}", e);
        }
    }

    fn destroy_surface(&mut self, display: egl::Display, surface: egl::Surface) {
        if let Err(e) = self.egl.destroy_surface(display, surface) {
            warn!("eglDestroySurface: {}", e);
        }
    }

    fn destroy_window(&mut self, window: WlEglSurface) {
        drop(window);
    }

    fn terminate(&mut self, display: egl::Display) {
        if let Err(e) = self.egl.terminate(display) {
            warn!("eglTerminate: {}", e);
        }
    }
}
