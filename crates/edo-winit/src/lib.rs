//! Surface-blit driver for edo.
//!
//! Renders each frame into a CPU pixel buffer and blits it to a native
//! window using:
//! - [`winit`] for window creation and input events
//! - [`softbuffer`] for CPU-based pixel presentation
//!
//! # Usage
//!
//! ```rust,no_run
//! use edo_winit::{WinitConfig, WinitDriver};
//! use edo_core::app::{AppRunner, EventLoopDriver};
//!
//! let config = WinitConfig::default();
//! let driver = WinitDriver::new(config);
//! // let runner = AppRunner::new(Box::new(my_model), 640, 480, background);
//! // driver.run(runner).unwrap();
//! ```

mod input;
mod renderer;

use std::num::NonZeroU32;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use edo_assets::Assets;
use edo_core::{
    app::{AppRunner, EventLoopDriver},
    Msg,
};

use renderer::FrameRenderer;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the winit driver.
pub struct WinitConfig {
    /// Window title.
    pub title: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Resources loaded at startup; the driver takes exclusive ownership.
    pub assets: Assets,
}

impl Default for WinitConfig {
    fn default() -> Self {
        Self {
            title: "edo".into(),
            width: 640,
            height: 480,
            assets: Assets::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// WinitDriver
// ---------------------------------------------------------------------------

/// CPU-rendering driver for edo.
///
/// Implements [`EventLoopDriver`] — it owns the main-thread event loop
/// and drives an [`AppRunner`].
pub struct WinitDriver {
    config: WinitConfig,
}

impl WinitDriver {
    pub fn new(config: WinitConfig) -> Self {
        Self { config }
    }
}

impl EventLoopDriver for WinitDriver {
    fn run(self, runner: AppRunner) -> Result<(), Box<dyn std::error::Error>> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let mut app = WinitApp::new(self.config, runner);
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WinitApp — ApplicationHandler
// ---------------------------------------------------------------------------

struct WinitApp {
    config: WinitConfig,
    runner: AppRunner,
    state: Option<WinitState>,
}

/// Scoped guard for the window and its surface: acquired in `resumed`,
/// released by drop when the event loop exits.
struct WinitState {
    window: Arc<Window>,
    surface: softbuffer::Surface<Arc<Window>, Arc<Window>>,
    renderer: FrameRenderer,
    pixel_width: u32,
    pixel_height: u32,
}

impl WinitApp {
    fn new(config: WinitConfig, runner: AppRunner) -> Self {
        Self {
            config,
            runner,
            state: None,
        }
    }

    fn render(&mut self) {
        if self.runner.should_quit() {
            return;
        }

        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        // One full frame per iteration, idle or not.
        let scene = self.runner.draw_frame();
        state.renderer.render_scene(scene);

        let width = state.pixel_width;
        let height = state.pixel_height;
        if width == 0 || height == 0 {
            return;
        }

        let mut buf = match state.surface.buffer_mut() {
            Ok(b) => b,
            Err(_) => return,
        };

        state
            .renderer
            .blit_to_buffer(&mut buf, width as usize, height as usize);

        buf.present().ok();
    }
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return; // already initialized
        }

        let width = self.config.width;
        let height = self.config.height;

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(false);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("failed to create window"),
        );

        let context =
            softbuffer::Context::new(window.clone()).expect("failed to create softbuffer context");
        let mut surface = softbuffer::Surface::new(&context, window.clone())
            .expect("failed to create softbuffer surface");

        let size = window.inner_size();
        let pixel_width = if size.width == 0 { width } else { size.width };
        let pixel_height = if size.height == 0 { height } else { size.height };

        surface
            .resize(
                NonZeroU32::new(pixel_width).unwrap_or(NonZeroU32::new(1).unwrap()),
                NonZeroU32::new(pixel_height).unwrap_or(NonZeroU32::new(1).unwrap()),
            )
            .ok();

        log::info!("opened {width}x{height} window");

        let assets = std::mem::take(&mut self.config.assets);
        self.state = Some(WinitState {
            window,
            surface,
            renderer: FrameRenderer::new(width as usize, height as usize, assets),
            pixel_width,
            pixel_height,
        });

        // Resources acquired; enter the loop and send Init to the model.
        self.runner.init();
        self.runner.start();
        self.render();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.runner.handle_msg(Msg::Quit);
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(state) = self.state.as_mut() {
                    state.pixel_width = width;
                    state.pixel_height = height;
                    state
                        .surface
                        .resize(
                            NonZeroU32::new(width).unwrap_or(NonZeroU32::new(1).unwrap()),
                            NonZeroU32::new(height).unwrap_or(NonZeroU32::new(1).unwrap()),
                        )
                        .ok();
                }
                self.render();
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(msg) = input::translate_keyboard(&event) {
                    self.runner.handle_msg(msg);
                    if self.runner.should_quit() {
                        event_loop.exit();
                        return;
                    }
                    self.render();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Busy poll: request the next frame immediately.
        if let Some(state) = self.state.as_ref() {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release the renderer, surface and window in reverse order.
        self.state = None;
    }
}
