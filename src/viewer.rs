//! Standalone demo window backed by winit.
//!
//! ```no_run
//! # use voro::Viewer;
//! Viewer::builder()
//!     .with_title("Voronoi")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```
//!
//! Keys: `Space` pauses the anchors, `V` switches between the base and
//! post-process pipelines, `Escape` closes the window.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::engine::VoronoiEngine;
use crate::error::VoroError;
use crate::options::{Options, Variant};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            title: "Voro".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window showing the animated Voronoi diagram.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::Viewer`] if the event loop cannot start or
    /// exits abnormally, and the engine's setup error if it fails to
    /// initialize.
    pub fn run(self) -> Result<(), VoroError> {
        let event_loop =
            EventLoop::new().map_err(|e| VoroError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            last_frame_time: Instant::now(),
            options: Some(self.options),
            title: self.title,
            failure: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| VoroError::Viewer(e.to_string()))?;
        app.failure.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<VoronoiEngine>,
    last_frame_time: Instant,
    options: Option<Options>,
    title: String,
    /// Fatal error that ended the event loop.
    failure: Option<VoroError>,
}

fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: VoroError) {
        log::error!("{error}");
        self.failure = Some(error);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        let mut options = engine.options().clone();
        match code {
            KeyCode::Escape => {
                engine.release();
                event_loop.exit();
                return;
            }
            KeyCode::Space => {
                options.motion.enabled = !options.motion.enabled;
            }
            KeyCode::KeyV => {
                options.pipeline.variant = match options.pipeline.variant {
                    Variant::Base => Variant::PostProcess,
                    Variant::PostProcess => Variant::Base,
                };
                log::info!("switching to {:?}", options.pipeline.variant);
            }
            _ => return,
        }
        if let Err(e) = engine.set_options(options) {
            log::error!("options rejected: {e}");
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };
        if let Err(e) = engine.update(dt) {
            self.fail(event_loop, e);
            return;
        }
        match engine.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                let (vp_w, vp_h) = viewport_size(window.inner_size());
                if let Err(e) = engine.recover_surface(vp_w, vp_h) {
                    self.fail(event_loop, e);
                    return;
                }
            }
            Err(e) => {
                log::error!("render error: {e:?}");
            }
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, VoroError::Viewer(e.to_string()));
                return;
            }
        };

        let size = viewport_size(window.inner_size());
        let options = self.options.take().unwrap_or_default();
        let engine = match pollster::block_on(VoronoiEngine::new(
            window.clone(),
            size,
            options,
        )) {
            Ok(engine) => engine,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            if let Some(engine) = &mut self.engine {
                engine.release();
            }
            event_loop.exit();
            return;
        }

        // Guard: both window and engine must be initialised.
        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(event_size) => {
                let (vp_w, vp_h) = viewport_size(event_size);
                if let Some(engine) = &mut self.engine {
                    if let Err(e) = engine.resize(vp_w, vp_h) {
                        self.fail(event_loop, e);
                    }
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let inner = self.window.as_ref().map(|w| w.inner_size());
                if let (Some(engine), Some(inner)) = (&mut self.engine, inner) {
                    let (vp_w, vp_h) = viewport_size(inner);
                    if let Err(e) = engine.resize(vp_w, vp_h) {
                        self.fail(event_loop, e);
                    }
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(event_loop, code);
                }
            }

            _ => (),
        }
    }
}
