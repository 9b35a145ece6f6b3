//! Per-frame driver tying the site scene to the GPU stage.
//!
//! The engine owns the [`RenderContext`], the [`VoronoiStage`] and the host
//! scene. Each tick runs an update phase (motion, change polling, at most
//! one upload and dispatch) followed by a render phase (tint, composite,
//! present).

mod construction;
/// Per-tick recompute scheduling.
pub mod frame;

use construction::build_scene;
pub use frame::{FrameGate, FrameOrchestrator, FrameState};

use crate::camera::Camera;
use crate::error::VoroError;
use crate::gpu::render_context::RenderContext;
use crate::options::Options;
use crate::renderer::VoronoiStage;
use crate::sites::motion::SiteMotion;
use crate::sites::SiteStore;
use crate::util::frame_timing::FrameTiming;

/// The core rendering engine for the Voronoi demo.
pub struct VoronoiEngine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    stage: VoronoiStage,
    store: SiteStore,
    motion: SiteMotion,
    camera: Camera,
    frames: FrameOrchestrator,
    frame_timing: FrameTiming,
    options: Options,
    elapsed: f32,
    released: bool,
}

impl VoronoiEngine {
    /// Create an engine drawing into `window`.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::Gpu`] if the GPU context cannot be created, and
    /// any error of [`from_context`](Self::from_context).
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, VoroError> {
        let context = RenderContext::new(window, size).await?;
        Self::from_context(context, options)
    }

    /// Create an engine without a presentation surface. Use
    /// [`render_to_view`](Self::render_to_view) to draw.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub async fn new_headless(
        width: u32,
        height: u32,
        options: Options,
    ) -> Result<Self, VoroError> {
        let context = RenderContext::new_headless(width, height).await?;
        Self::from_context(context, options)
    }

    /// Build the scene and the stage on an existing context.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::InvalidOptions`] for out-of-range options and
    /// any error of [`VoronoiStage::new`].
    pub fn from_context(
        context: RenderContext,
        options: Options,
    ) -> Result<Self, VoroError> {
        options.validate()?;
        let stage = VoronoiStage::new(&context, &options)?;
        let scene = build_scene(&options, context.size());
        Ok(Self {
            stage,
            store: scene.store,
            motion: scene.motion,
            camera: scene.camera,
            frames: FrameOrchestrator::new(options.pipeline.recompute),
            frame_timing: FrameTiming::new(0),
            options,
            elapsed: 0.0,
            released: false,
            context,
        })
    }

    /// Update phase of one tick: move the anchors, poll their change flags
    /// and recompute the diagram at most once.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if the site array no longer
    /// fits the device.
    pub fn update(&mut self, dt: f32) -> Result<(), VoroError> {
        if self.released {
            return Ok(());
        }
        self.frames.begin_tick();
        self.elapsed += dt;
        self.motion.step(&mut self.store, dt);

        for _ in self.store.poll_changes() {
            if self.frames.notify_site_changed() {
                self.recompute()?;
            }
        }
        if self.frames.finish_update() {
            self.recompute()?;
        }
        Ok(())
    }

    /// Rebuild the packed array, upload it and dispatch the kernel.
    fn recompute(&mut self) -> Result<(), VoroError> {
        let records = self.store.packed_array(&self.camera, self.context.size());
        let _ = self.stage.sync_sites(&self.context, &records)?;
        if self.stage.dispatch(&self.context) {
            log::debug!(
                "voronoi dispatch #{} over {} sites",
                self.frames.dispatch_count(),
                records.len()
            );
        }
        Ok(())
    }

    /// Render phase of one tick: draw into the next surface texture and
    /// present it. Skipped while the frame limiter holds the frame back.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the surface texture cannot be
    /// acquired.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.frame_timing.should_render() {
            return Ok(());
        }
        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to_view(&view);
        frame.present();
        let _ = self.frame_timing.end_frame();
        Ok(())
    }

    /// Draw the current result into `view` without presenting.
    pub fn render_to_view(&mut self, view: &wgpu::TextureView) {
        self.stage.render(&self.context, view, self.elapsed);
    }

    /// Follow a new output size: reconfigure the surface, refit the camera,
    /// reallocate the targets and schedule a recompute.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if the new size exceeds the
    /// device's texture limit.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), VoroError> {
        if !self.context.resize(width, height) {
            return Ok(());
        }
        self.follow_resize()
    }

    /// Recover from a lost or outdated surface. The surface is configured
    /// again even when `width x height` is the size it already has.
    ///
    /// # Errors
    ///
    /// Same as [`resize`](Self::resize).
    pub fn recover_surface(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<(), VoroError> {
        if self.context.resize(width, height) {
            return self.follow_resize();
        }
        log::info!("reconfiguring surface at {:?}", self.context.size());
        self.context.reconfigure();
        Ok(())
    }

    fn follow_resize(&mut self) -> Result<(), VoroError> {
        let size = self.context.size();
        self.camera.set_viewport(size);
        if !self.released {
            let _ = self.stage.resize(&self.context, size)?;
        }
        self.frames.invalidate();
        Ok(())
    }

    /// Replace the options.
    ///
    /// A new variant or shader override rebuilds the stage and a new site
    /// count or seed rebuilds the scene. Anything else is pushed to the
    /// running passes. A recompute is scheduled in every case.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::InvalidOptions`] for out-of-range options and
    /// any error of [`VoronoiStage::compose`]; the old options and stage
    /// stay in effect then. If the new stage's targets cannot be allocated
    /// after the old ones were released, the engine is left released.
    pub fn set_options(&mut self, options: Options) -> Result<(), VoroError> {
        options.validate()?;
        let rebuild_stage = options.pipeline.variant != self.options.pipeline.variant
            || options.assets != self.options.assets;
        let rebuild_scene = options.sites != self.options.sites
            || options.camera != self.options.camera;

        if rebuild_stage {
            let mut stage = VoronoiStage::compose(&self.context, &options)?;
            if let Err(e) = stage.take_over(&mut self.stage, &self.context) {
                self.released = true;
                return Err(e);
            }
            self.stage = stage;
            self.released = false;
        } else {
            self.stage.apply_options(&self.context.queue, &options);
        }

        if rebuild_scene {
            let scene = build_scene(&options, self.context.size());
            self.store = scene.store;
            self.motion = scene.motion;
            self.camera = scene.camera;
        } else {
            self.motion.set_options(options.motion);
        }

        self.frames.set_policy(options.pipeline.recompute);
        self.frames.invalidate();
        self.options = options;
        Ok(())
    }

    /// Release the site buffer and render targets. Later updates do
    /// nothing. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.stage.release(&self.context);
        self.released = true;
    }

    /// Whether [`release`](Self::release) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The GPU stage.
    #[must_use]
    pub fn stage(&self) -> &VoronoiStage {
        &self.stage
    }

    /// The host-side sites.
    #[must_use]
    pub fn store(&self) -> &SiteStore {
        &self.store
    }

    /// The camera the sites are projected through.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Dispatches granted since startup.
    #[must_use]
    pub fn dispatch_count(&self) -> u64 {
        self.frames.dispatch_count()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }
}
