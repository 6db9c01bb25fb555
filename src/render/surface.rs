use tracing::{debug, info};

use crate::client::ToplevelGeometry;
use crate::error::Result;

/// Framebuffer configuration the window surface is created with: window
/// drawable, GLES2 renderable, 8 bits per colour channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigRequest {
    pub red_bits: i32,
    pub green_bits: i32,
    pub blue_bits: i32,
}

impl ConfigRequest {
    pub const WINDOW_ES2_RGB888: ConfigRequest = ConfigRequest {
        red_bits: 8,
        green_bits: 8,
        blue_bits: 8,
    };
}

/// GLES client API version requested for the rendering context.
pub const CLIENT_API_VERSION: i32 = 2;

/// The display/config/surface/context calls the manager needs from the GPU
/// stack. Every fallible step reports which call failed.
pub trait GpuBackend {
    type Display: Copy;
    type Config: Copy;
    type Context: Copy;
    type Surface: Copy;
    /// Platform window binding; released by value.
    type Window;
    /// Native object the window binding is created for.
    type Target: ?Sized;

    fn get_display(&mut self) -> Result<Self::Display>;
    fn initialize(&mut self, display: Self::Display) -> Result<(i32, i32)>;
    fn config_count(&mut self, display: Self::Display) -> Result<usize>;
    fn choose_config(&mut self, display: Self::Display, request: &ConfigRequest) -> Result<Self::Config>;
    fn create_window(&mut self, target: &Self::Target, size: ToplevelGeometry) -> Result<Self::Window>;
    fn create_surface(
        &mut self,
        display: Self::Display,
        config: Self::Config,
        window: &Self::Window,
    ) -> Result<Self::Surface>;
    fn create_context(
        &mut self,
        display: Self::Display,
        config: Self::Config,
        client_version: i32,
    ) -> Result<Self::Context>;
    fn make_current(
        &mut self,
        display: Self::Display,
        surface: Self::Surface,
        context: Self::Context,
    ) -> Result<()>;

    fn resize_window(&mut self, window: &Self::Window, size: ToplevelGeometry);
    fn set_viewport(&mut self, size: ToplevelGeometry);
    /// Clear colour, clear the colour buffer, flush.
    fn clear(&mut self, color: [f32; 4]);
    fn present(&mut self, display: Self::Display, surface: Self::Surface) -> Result<()>;

    fn destroy_context(&mut self, display: Self::Display, context: Self::Context);
    fn destroy_surface(&mut self, display: Self::Display, surface: Self::Surface);
    fn destroy_window(&mut self, window: Self::Window);
    fn terminate(&mut self, display: Self::Display);
}

/// Owns the GPU display, context, drawable surface and platform window binding
/// of the one window. Created once after the first configure handshake,
/// resized in place, released in reverse creation order.
pub struct RenderSurfaceManager<B: GpuBackend> {
    backend: B,
    clear_color: [f32; 4],
    display: Option<B::Display>,
    window: Option<B::Window>,
    surface: Option<B::Surface>,
    context: Option<B::Context>,
    width: i32,
    height: i32,
    initialized: bool,
}

impl<B: GpuBackend> RenderSurfaceManager<B> {
    pub fn new(backend: B, clear_color: [f32; 4]) -> Self {
        Self {
            backend,
            clear_color,
            display: None,
            window: None,
            surface: None,
            context: None,
            width: 0,
            height: 0,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn size(&self) -> ToplevelGeometry {
        ToplevelGeometry {
            width: self.width,
            height: self.height,
        }
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// Brings up the GPU side for `target` and presents one probe frame.
    ///
    /// Handles acquired before a failing step stay owned by the manager, so a
    /// later [`teardown`](Self::teardown) releases exactly what exists. A retry
    /// after such a failure releases the leftovers before starting over.
    pub fn initialize(&mut self, target: &B::Target, size: ToplevelGeometry) -> Result<()> {
        if self.initialized {
            debug!("render surface already initialized");
            return Ok(());
        }
        if self.display.is_some() || self.window.is_some() {
            debug!("releasing partially initialized render surface");
            self.teardown();
        }

        info!("creating EGL display");
        let display = self.backend.get_display()?;
        self.display = Some(display);

        info!("initializing EGL display");
        let (major, minor) = self.backend.initialize(display)?;
        info!("initialized EGL {}.{}", major, minor);

        info!("getting number of EGL configs");
        let count = self.backend.config_count(display)?;
        debug!("{} EGL configs available", count);

        info!("getting EGL config");
        let config = self
            .backend
            .choose_config(display, &ConfigRequest::WINDOW_ES2_RGB888)?;

        info!("creating EGL window ({})", size);
        let window = self.backend.create_window(target, size)?;
        let window = self.window.insert(window);
        self.width = size.width;
        self.height = size.height;

        info!("creating EGL surface");
        let surface = self.backend.create_surface(display, config, window)?;
        self.surface = Some(surface);

        info!("creating EGL context");
        let context = self.backend.create_context(display, config, CLIENT_API_VERSION)?;
        self.context = Some(context);

        info!("activating EGL context");
        self.backend.make_current(display, surface, context)?;

        self.draw_frame(display, surface)?;
        self.initialized = true;
        Ok(())
    }

    /// Follows a new toplevel size. Returns `false` without touching the GPU
    /// when not yet initialized or when the size did not change.
    pub fn resize(&mut self, size: ToplevelGeometry) -> Result<bool> {
        if !self.initialized || size == self.size() {
            return Ok(false);
        }
        let (Some(display), Some(surface), Some(window)) = (self.display, self.surface, self.window.as_ref())
        else {
            return Ok(false);
        };

        info!("resizing EGL window to {}", size);
        self.backend.resize_window(window, size);
        self.backend.set_viewport(size);
        self.width = size.width;
        self.height = size.height;

        self.draw_frame(display, surface)?;
        Ok(true)
    }

    fn draw_frame(&mut self, display: B::Display, surface: B::Surface) -> Result<()> {
        info!("clearing frame");
        self.backend.clear(self.clear_color);
        self.backend.present(display, surface)
    }

    /// Releases context, drawable surface, window binding, then the display.
    /// Safe to call repeatedly and after a partial [`initialize`](Self::initialize).
    pub fn teardown(&mut self) {
        self.initialized = false;

        if let Some(display) = self.display {
            if let Some(context) = self.context.take() {
                self.backend.destroy_context(display, context);
            }
            if let Some(surface) = self.surface.take() {
                self.backend.destroy_surface(display, surface);
            }
        }
        if let Some(window) = self.window.take() {
            self.backend.destroy_window(window);
        }
        if let Some(display) = self.display.take() {
            self.backend.terminate(display);
        }
    }
}

impl<B: GpuBackend> Drop for RenderSurfaceManager<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::ClientError;

    /// Release log shared between fakes of different layers.
    pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum GpuCall {
        GetDisplay,
        Initialize,
        ConfigCount,
        ChooseConfig(ConfigRequest),
        CreateWindow(ToplevelGeometry),
        CreateSurface,
        CreateContext(i32),
        MakeCurrent,
        ResizeWindow(ToplevelGeometry),
        Viewport(ToplevelGeometry),
        Clear([f32; 4]),
        Present,
        DestroyContext,
        DestroySurface,
        DestroyWindow,
        Terminate,
    }

    pub(crate) struct FakeWindow;

    /// Records every call; fails the call named in `fail_at`. Calls are also
    /// appended to `journal` when one is attached.
    #[derive(Default)]
    pub(crate) struct RecordingGpu {
        pub calls: Vec<GpuCall>,
        pub fail_at: Option<&'static str>,
        pub journal: Option<Journal>,
    }

    impl RecordingGpu {
        pub fn failing_at(step: &'static str) -> Self {
            Self {
                fail_at: Some(step),
                ..Self::default()
            }
        }

        pub fn journaling(journal: &Journal) -> Self {
            Self {
                journal: Some(Rc::clone(journal)),
                ..Self::default()
            }
        }

        fn push(&mut self, call: GpuCall) {
            if let Some(journal) = &self.journal {
                journal.borrow_mut().push(format!("{:?}", call));
            }
            self.calls.push(call);
        }

        fn step(&mut self, name: &'static str, call: GpuCall) -> Result<()> {
            self.push(call);
            if self.fail_at == Some(name) {
                return Err(ClientError::gpu(name, "injected failure"));
            }
            Ok(())
        }

        pub fn count(&self, wanted: &GpuCall) -> usize {
            self.calls.iter().filter(|c| *c == wanted).count()
        }
    }

    impl GpuBackend for RecordingGpu {
        type Display = u8;
        type Config = u8;
        type Context = u8;
        type Surface = u8;
        type Window = FakeWindow;
        type Target = ();

        fn get_display(&mut self) -> Result<u8> {
            self.step("eglGetDisplay", GpuCall::GetDisplay).map(|_| 1)
        }

        fn initialize(&mut self, _: u8) -> Result<(i32, i32)> {
            self.step("eglInitialize", GpuCall::Initialize).map(|_| (1, 5))
        }

        fn config_count(&mut self, _: u8) -> Result<usize> {
            self.step("eglGetConfigs", GpuCall::ConfigCount).map(|_| 4)
        }

        fn choose_config(&mut self, _: u8, request: &ConfigRequest) -> Result<u8> {
            self.step("eglChooseConfig", GpuCall::ChooseConfig(*request)).map(|_| 2)
        }

        fn create_window(&mut self, _: &(), size: ToplevelGeometry) -> Result<FakeWindow> {
            self.step("wl_egl_window", GpuCall::CreateWindow(size)).map(|_| FakeWindow)
        }

        fn create_surface(&mut self, _: u8, _: u8, _: &FakeWindow) -> Result<u8> {
            self.step("eglCreateWindowSurface", GpuCall::CreateSurface).map(|_| 3)
        }

        fn create_context(&mut self, _: u8, _: u8, client_version: i32) -> Result<u8> {
            self.step("eglCreateContext", GpuCall::CreateContext(client_version)).map(|_| 4)
        }

        fn make_current(&mut self, _: u8, _: u8, _: u8) -> Result<()> {
            self.step("eglMakeCurrent", GpuCall::MakeCurrent)
        }

        fn resize_window(&mut self, _: &FakeWindow, size: ToplevelGeometry) {
            self.push(GpuCall::ResizeWindow(size));
        }

        fn set_viewport(&mut self, size: ToplevelGeometry) {
            self.push(GpuCall::Viewport(size));
        }

        fn clear(&mut self, color: [f32; 4]) {
            self.push(GpuCall::Clear(color));
        }

        fn present(&mut self, _: u8, _: u8) -> Result<()> {
            self.step("eglSwapBuffers", GpuCall::Present)
        }

        fn destroy_context(&mut self, _: u8, _: u8) {
            self.push(GpuCall::DestroyContext);
        }

        fn destroy_surface(&mut self, _: u8, _: u8) {
            self.push(GpuCall::DestroySurface);
        }

        fn destroy_window(&mut self, _: FakeWindow) {
            self.push(GpuCall::DestroyWindow);
        }

        fn terminate(&mut self, _: u8) {
            self.push(GpuCall::Terminate);
        }
    }

    const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

    fn geometry(width: i32, height: i32) -> ToplevelGeometry {
        ToplevelGeometry { width, height }
    }

    fn initialized(size: ToplevelGeometry) -> RenderSurfaceManager<RecordingGpu> {
        let mut manager = RenderSurfaceManager::new(RecordingGpu::default(), YELLOW);
        manager.initialize(&(), size).unwrap();
        manager.backend.calls.clear();
        manager
    }

    #[test]
    fn initialize_runs_every_step_in_order() -> anyhow::Result<()> {
        let mut manager = RenderSurfaceManager::new(RecordingGpu::default(), YELLOW);
        manager.initialize(&(), geometry(300, 200))?;

        assert!(manager.is_initialized());
        assert_eq!(manager.size(), geometry(300, 200));
        assert_eq!(
            manager.backend().calls,
            vec![
                GpuCall::GetDisplay,
                GpuCall::Initialize,
                GpuCall::ConfigCount,
                GpuCall::ChooseConfig(ConfigRequest::WINDOW_ES2_RGB888),
                GpuCall::CreateWindow(geometry(300, 200)),
                GpuCall::CreateSurface,
                GpuCall::CreateContext(2),
                GpuCall::MakeCurrent,
                GpuCall::Clear(YELLOW),
                GpuCall::Present,
            ]
        );
        Ok(())
    }

    #[test]
    fn second_initialize_is_ignored() -> anyhow::Result<()> {
        let mut manager = initialized(geometry(10, 10));
        manager.initialize(&(), geometry(20, 20))?;
        assert!(manager.backend().calls.is_empty());
        assert_eq!(manager.size(), geometry(10, 10));
        Ok(())
    }

    #[test]
    fn failed_probe_frame_is_fatal() {
        let mut manager = RenderSurfaceManager::new(RecordingGpu::failing_at("eglSwapBuffers"), YELLOW);
        let err = manager.initialize(&(), geometry(100, 100)).unwrap_err();

        assert!(matches!(err, ClientError::Gpu { step: "eglSwapBuffers", .. }));
        assert!(!manager.is_initialized());
    }

    #[test]
    fn resize_before_initialize_is_a_no_op() -> anyhow::Result<()> {
        let mut manager = RenderSurfaceManager::new(RecordingGpu::default(), YELLOW);
        assert!(!manager.resize(geometry(640, 480))?);
        assert!(manager.backend().calls.is_empty());
        Ok(())
    }

    #[test]
    fn resize_to_same_size_is_a_no_op() -> anyhow::Result<()> {
        let mut manager = initialized(geometry(300, 200));
        assert!(!manager.resize(geometry(300, 200))?);
        assert!(manager.backend().calls.is_empty());
        Ok(())
    }

    #[test]
    fn resize_presents_exactly_one_frame() -> anyhow::Result<()> {
        let mut manager = initialized(geometry(300, 200));
        assert!(manager.resize(geometry(640, 480))?);

        assert_eq!(
            manager.backend().calls,
            vec![
                GpuCall::ResizeWindow(geometry(640, 480)),
                GpuCall::Viewport(geometry(640, 480)),
                GpuCall::Clear(YELLOW),
                GpuCall::Present,
            ]
        );
        assert_eq!(manager.backend().count(&GpuCall::Present), 1);
        assert_eq!(manager.size(), geometry(640, 480));
        Ok(())
    }

    #[test]
    fn failed_resize_presentation_is_fatal() {
        let mut manager = initialized(geometry(300, 200));
        manager.backend.fail_at = Some("eglSwapBuffers");
        let err = manager.resize(geometry(301, 200)).unwrap_err();
        assert!(matches!(err, ClientError::Gpu { step: "eglSwapBuffers", .. }));
    }

    #[test]
    fn teardown_releases_in_reverse_creation_order() {
        let mut manager = initialized(geometry(300, 200));
        manager.teardown();

        assert_eq!(
            manager.backend().calls,
            vec![
                GpuCall::DestroyContext,
                GpuCall::DestroySurface,
                GpuCall::DestroyWindow,
                GpuCall::Terminate,
            ]
        );
        assert!(!manager.is_initialized());
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut manager = initialized(geometry(300, 200));
        manager.teardown();
        manager.teardown();
        assert_eq!(manager.backend().count(&GpuCall::Terminate), 1);
        assert_eq!(manager.backend().count(&GpuCall::DestroyContext), 1);
    }

    #[test]
    fn teardown_after_display_failure_releases_nothing_else() {
        let mut manager = RenderSurfaceManager::new(RecordingGpu::failing_at("eglInitialize"), YELLOW);
        assert!(manager.initialize(&(), geometry(1, 1)).is_err());
        manager.backend.calls.clear();

        manager.teardown();
        assert_eq!(manager.backend().calls, vec![GpuCall::Terminate]);
    }

    #[test]
    fn teardown_after_context_failure_skips_missing_context() {
        let mut manager = RenderSurfaceManager::new(RecordingGpu::failing_at("eglCreateContext"), YELLOW);
        assert!(manager.initialize(&(), geometry(1, 1)).is_err());
        manager.backend.calls.clear();

        manager.teardown();
        assert_eq!(
            manager.backend().calls,
            vec![GpuCall::DestroySurface, GpuCall::DestroyWindow, GpuCall::Terminate]
        );
    }

    #[test]
    fn retry_after_partial_failure_releases_leftovers_first() -> anyhow::Result<()> {
        let mut manager = RenderSurfaceManager::new(RecordingGpu::failing_at("eglCreateContext"), YELLOW);
        assert!(manager.initialize(&(), geometry(1, 1)).is_err());
        manager.backend.calls.clear();
        manager.backend.fail_at = None;

        manager.initialize(&(), geometry(50, 40))?;

        let calls = &manager.backend().calls;
        assert_eq!(
            calls[..4],
            [
                GpuCall::DestroySurface,
                GpuCall::DestroyWindow,
                GpuCall::Terminate,
                GpuCall::GetDisplay,
            ]
        );
        assert_eq!(manager.backend().count(&GpuCall::CreateWindow(geometry(50, 40))), 1);
        assert!(manager.is_initialized());

        manager.teardown();
        assert_eq!(manager.backend().count(&GpuCall::Terminate), 2);
        assert_eq!(manager.backend().count(&GpuCall::DestroyWindow), 2);
        Ok(())
    }

    #[test]
    fn teardown_without_initialize_does_nothing() {
        let mut manager = RenderSurfaceManager::new(RecordingGpu::default(), YELLOW);
        manager.teardown();
        assert!(manager.backend().calls.is_empty());
    }
}
