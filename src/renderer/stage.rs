//! One Voronoi pipeline instance: resources plus the passes that use them.

use super::postprocess::backdrop::BackdropPass;
use super::postprocess::composite::CompositePass;
use super::postprocess::screen_pass::ScreenPass;
use super::tint::TintPass;
use super::voronoi::VoronoiPass;
use crate::error::VoroError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer, ShaderSource};
use crate::gpu::site_buffer::SiteBuffer;
use crate::gpu::targets::RenderTargets;
use crate::gpu::texture::StorageTarget;
use crate::options::{Options, Variant};
use crate::sites::PackedSite;

/// Owns the site buffer, the render targets, and every pass of one
/// pipeline variant.
///
/// The stage never decides *when* to recompute; the engine's frame
/// orchestrator does. It only knows how to upload, dispatch, and draw.
pub struct VoronoiStage {
    variant: Variant,
    sites: SiteBuffer<wgpu::Buffer>,
    targets: RenderTargets<StorageTarget>,
    voronoi: VoronoiPass,
    tint: Option<TintPass>,
    backdrop: Option<BackdropPass>,
    composite: CompositePass,
}

fn load_source(
    shader: Shader,
    path: Option<&std::path::Path>,
) -> Result<ShaderSource<'static>, VoroError> {
    match path {
        Some(path) => ShaderSource::from_file(shader, path),
        None => Ok(ShaderSource::bundled(shader)),
    }
}

impl VoronoiStage {
    /// Build the passes for `options.pipeline.variant` and allocate targets
    /// at the context's current size. No site buffer exists until the first
    /// [`sync_sites`](Self::sync_sites).
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::Io`] if a shader override cannot be read,
    /// [`VoroError::ShaderCompose`] if a shader fails to compose, and
    /// [`VoroError::ResourceLimit`] if the targets exceed device limits.
    pub fn new(
        context: &RenderContext,
        options: &Options,
    ) -> Result<Self, VoroError> {
        let mut stage = Self::compose(context, options)?;
        let _ = stage.resize(context, context.size())?;
        Ok(stage)
    }

    /// Build the passes for `options.pipeline.variant` without allocating
    /// any target. [`resize`](Self::resize) or
    /// [`take_over`](Self::take_over) allocates them.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new), apart from the resource limit.
    pub fn compose(
        context: &RenderContext,
        options: &Options,
    ) -> Result<Self, VoroError> {
        let variant = options.pipeline.variant;
        let with_owner_ids = variant.uses_owner_ids();
        let mut composer = ShaderComposer::new()?;

        let kernel =
            load_source(Shader::Voronoi, options.assets.voronoi_kernel.as_deref())?;
        let voronoi = VoronoiPass::new(
            &context.device,
            &mut composer,
            &kernel,
            with_owner_ids,
            options.pipeline.clear_color,
        )?;

        let composite_source = load_source(
            Shader::Composite,
            options.assets.composite_shader.as_deref(),
        )?;
        let composite = CompositePass::new(
            &context.device,
            &mut composer,
            &composite_source,
            context.format(),
            &options.composite,
        )?;

        let (tint, backdrop) = if with_owner_ids {
            (
                Some(TintPass::new(
                    &context.device,
                    &mut composer,
                    &options.post_processing,
                )?),
                Some(BackdropPass::new(&context.device, &mut composer)?),
            )
        } else {
            (None, None)
        };
        log::info!("voronoi stage composed ({variant:?})");

        Ok(Self {
            variant,
            sites: SiteBuffer::new(),
            targets: RenderTargets::new(with_owner_ids),
            voronoi,
            tint,
            backdrop,
            composite,
        })
    }

    /// Replace `previous` as the live stage: release every resource it
    /// holds, then allocate this stage's targets at the context's size, so
    /// that only one generation of targets is ever live.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if the new targets exceed
    /// device limits. `previous` is released either way.
    pub fn take_over(
        &mut self,
        previous: &mut Self,
        context: &RenderContext,
    ) -> Result<(), VoroError> {
        let (width, height) = context.size();
        {
            let mut alloc = context.allocator();
            previous.sites.release(&mut alloc);
            if let Some(backdrop) = &mut previous.backdrop {
                backdrop.release();
            }
            let _ = self.targets.take_over(
                &mut previous.targets,
                &mut alloc,
                width,
                height,
            )?;
        }
        if let Some(backdrop) = &mut self.backdrop {
            backdrop.resize(&context.device, self.targets.size());
        }
        log::info!(
            "voronoi stage switched {:?} -> {:?} at {width}x{height}",
            previous.variant,
            self.variant
        );
        Ok(())
    }

    /// The pipeline variant this stage was built for.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Number of sites on the device.
    #[must_use]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// The kernel's output targets.
    #[must_use]
    pub fn targets(&self) -> &RenderTargets<StorageTarget> {
        &self.targets
    }

    /// Upload `records`, reallocating the buffer when the count changed.
    /// Returns whether a reallocation happened.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if the array exceeds the
    /// device's storage binding size.
    pub fn sync_sites(
        &mut self,
        context: &RenderContext,
        records: &[PackedSite],
    ) -> Result<bool, VoroError> {
        if records.is_empty() && !self.sites.is_empty() {
            log::warn!("site set is empty; the next dispatch clears the result");
        }
        let reallocated = self.sites.sync(&mut context.allocator(), records)?;
        if reallocated {
            log::info!("site buffer recreated for {} sites", records.len());
        }
        Ok(reallocated)
    }

    /// Reallocate targets (and the backdrop frame) for a new output size.
    /// Returns whether the targets were reallocated.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if the size exceeds the device's
    /// texture limit.
    pub fn resize(
        &mut self,
        context: &RenderContext,
        size: (u32, u32),
    ) -> Result<bool, VoroError> {
        let resized =
            self.targets.ensure(&mut context.allocator(), size.0, size.1)?;
        if let Some(backdrop) = &mut self.backdrop {
            backdrop.resize(&context.device, self.targets.size());
        }
        if resized {
            log::info!("render targets reallocated at {}x{}", size.0, size.1);
        }
        Ok(resized)
    }

    /// Record and submit one Voronoi dispatch in its own command buffer.
    /// Returns `false` if there is nothing to dispatch against yet.
    pub fn dispatch(&mut self, context: &RenderContext) -> bool {
        self.voronoi.rebind(&context.device, &self.sites, &self.targets);
        let mut encoder = context.create_encoder("Voronoi Encoder");
        let recorded = self.voronoi.dispatch(
            &context.queue,
            &mut encoder,
            self.sites.len(),
            self.targets.size(),
        );
        if recorded {
            context.submit(encoder);
        }
        recorded
    }

    /// Draw the frame: in the post-process variant render the backdrop and
    /// run the tint kernel over it, then blit Result onto `output`.
    ///
    /// Runs every displayed frame, whether or not a dispatch happened.
    pub fn render(
        &mut self,
        context: &RenderContext,
        output: &wgpu::TextureView,
        time: f32,
    ) {
        let mut encoder = context.create_encoder("Frame Encoder");

        if let (Some(backdrop), Some(tint)) = (&mut self.backdrop, &mut self.tint) {
            backdrop.update(&context.queue, time);
            // No frame texture after release.
            if let Some(frame) = backdrop.view() {
                let _ = backdrop.render_frame(&mut encoder);
                tint.rebind(
                    &context.device,
                    &self.sites,
                    &self.targets,
                    frame,
                    backdrop.generation(),
                );
                let _ = tint.dispatch(
                    &context.queue,
                    &mut encoder,
                    self.sites.len(),
                    self.targets.size(),
                );
            }
        }

        self.composite.rebind(&context.device, &self.targets);
        self.composite.render(&mut encoder, output);
        context.submit(encoder);
    }

    /// Push tunable options to the passes. Variant, shader and count
    /// changes need a new stage.
    pub fn apply_options(&mut self, queue: &wgpu::Queue, options: &Options) {
        self.voronoi.clear_color = options.pipeline.clear_color;
        if let Some(tint) = &mut self.tint {
            tint.apply_options(&options.post_processing);
        }
        self.composite.apply_options(queue, &options.composite);
    }

    /// Release the site buffer and every target. Safe to call more than
    /// once; later dispatches and renders become no-ops apart from clearing
    /// the output.
    pub fn release(&mut self, context: &RenderContext) {
        let mut alloc = context.allocator();
        self.sites.release(&mut alloc);
        self.targets.release(&mut alloc);
        if let Some(backdrop) = &mut self.backdrop {
            backdrop.release();
        }
        log::info!("voronoi stage released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::cpu::{self, NO_OWNER};

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

    fn headless(size: u32) -> Option<RenderContext> {
        match pollster::block_on(RenderContext::new_headless(size, size)) {
            Ok(context) => Some(context),
            Err(e) => {
                log::warn!("skipping GPU test: {e}");
                None
            }
        }
    }

    /// Copy a 4-byte-per-texel target into host memory.
    fn read_back(context: &RenderContext, target: &StorageTarget) -> Vec<u8> {
        read_texture(context, &target.texture, target.width, target.height)
    }

    fn read_texture(
        context: &RenderContext,
        texture: &wgpu::Texture,
        width: u32,
        height: u32,
    ) -> Vec<u8> {
        let row = width * 4;
        let padded = row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let staging = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback"),
            size: u64::from(padded * height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = context.create_encoder("Readback Encoder");
        encoder.copy_texture_to_buffer(
            texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        context.submit(encoder);

        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        let _ = context.device.poll(wgpu::PollType::Wait);
        let mapped = slice.get_mapped_range();
        let mut bytes = Vec::with_capacity((row * height) as usize);
        for y in 0..height {
            let start = (y * padded) as usize;
            bytes.extend_from_slice(&mapped[start..start + row as usize]);
        }
        bytes
    }

    fn owners(bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    /// Offscreen stand-in for the surface texture.
    fn output_texture(context: &RenderContext) -> wgpu::Texture {
        let (width, height) = context.size();
        context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Test Output"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: context.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    fn to_rgba8(color: [f32; 4]) -> [u8; 4] {
        color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    fn corner_sites(size: f32) -> Vec<PackedSite> {
        vec![
            PackedSite::new([2.0, 2.0], RED),
            PackedSite::new([size - 3.0, 4.0], GREEN),
            PackedSite::new([4.0, size - 3.0], BLUE),
        ]
    }

    /// Full tint, no border: the result is exactly the cell colors.
    fn solid_tint_options() -> Options {
        let mut options = post_process_options();
        options.post_processing.tint_strength = 1.0;
        options.post_processing.border_strength = 0.0;
        options
    }

    fn post_process_options() -> Options {
        let mut options = Options::default();
        options.pipeline.variant = Variant::PostProcess;
        options
    }

    #[test]
    fn gpu_kernel_matches_the_cpu_rasterizer() {
        let Some(context) = headless(512) else {
            return;
        };
        let mut stage = VoronoiStage::new(&context, &post_process_options()).unwrap();
        let sites = vec![
            PackedSite::new([10.0, 10.0], RED),
            PackedSite::new([500.0, 10.0], GREEN),
            PackedSite::new([10.0, 500.0], BLUE),
        ];
        let _ = stage.sync_sites(&context, &sites).unwrap();
        assert!(stage.dispatch(&context));

        let ids = owners(&read_back(&context, stage.targets().owner_ids().unwrap()));
        let expected = cpu::rasterize(&sites, 512, 512, [0.0; 4]);
        assert_eq!(ids, expected.owners);
        assert_eq!(ids[0], 0);
        assert_eq!(ids[511], 1);
        assert_eq!(ids[511 * 512], 2);
        assert_eq!(ids[255 * 512 + 255], 0);

        let colors = read_back(&context, stage.targets().result().unwrap());
        assert_eq!(&colors[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn gpu_dispatch_is_idempotent() {
        let Some(context) = headless(96) else {
            return;
        };
        let mut stage = VoronoiStage::new(&context, &post_process_options()).unwrap();
        let sites = vec![
            PackedSite::new([3.0, 70.0], RED),
            PackedSite::new([50.5, 12.25], GREEN),
            PackedSite::new([90.0, 90.0], BLUE),
        ];
        let _ = stage.sync_sites(&context, &sites).unwrap();

        assert!(stage.dispatch(&context));
        let first = read_back(&context, stage.targets().owner_ids().unwrap());
        let first_color = read_back(&context, stage.targets().result().unwrap());
        assert!(stage.dispatch(&context));
        let second = read_back(&context, stage.targets().owner_ids().unwrap());
        let second_color = read_back(&context, stage.targets().result().unwrap());
        assert_eq!(first, second);
        assert_eq!(first_color, second_color);
    }

    #[test]
    fn gpu_zero_sites_clear_the_result() {
        let Some(context) = headless(40) else {
            return;
        };
        let mut options = post_process_options();
        options.pipeline.clear_color = [0.0, 0.0, 1.0, 1.0];
        let mut stage = VoronoiStage::new(&context, &options).unwrap();
        let _ = stage.sync_sites(&context, &[]).unwrap();
        assert!(stage.dispatch(&context));

        let ids = owners(&read_back(&context, stage.targets().owner_ids().unwrap()));
        assert!(ids.iter().all(|&id| id == NO_OWNER));
        let colors = read_back(&context, stage.targets().result().unwrap());
        assert!(colors.chunks_exact(4).all(|c| c == [0, 0, 255, 255]));
    }

    #[test]
    fn gpu_stage_survives_resize_and_release() {
        let Some(context) = headless(64) else {
            return;
        };
        let mut stage = VoronoiStage::new(&context, &Options::default()).unwrap();
        let _ = stage
            .sync_sites(&context, &[PackedSite::new([1.0, 1.0], RED)])
            .unwrap();
        assert!(stage.resize(&context, (80, 48)).unwrap());
        assert!(!stage.resize(&context, (80, 48)).unwrap());
        assert!(stage.dispatch(&context));
        assert_eq!(stage.targets().result().unwrap().width, 80);

        stage.release(&context);
        assert!(!stage.dispatch(&context));
        stage.release(&context);
    }

    #[test]
    fn gpu_tint_matches_the_cpu_reference() {
        let Some(context) = headless(64) else {
            return;
        };
        let options = solid_tint_options();
        let mut stage = VoronoiStage::new(&context, &options).unwrap();
        let sites = corner_sites(64.0);
        let _ = stage.sync_sites(&context, &sites).unwrap();
        assert!(stage.dispatch(&context));

        let output = output_texture(&context);
        let view = output.create_view(&wgpu::TextureViewDescriptor::default());
        stage.render(&context, &view, 0.0);

        let image = cpu::rasterize(&sites, 64, 64, [0.0; 4]);
        let frame = vec![[0.5, 0.25, 0.75, 1.0]; 64 * 64];
        let expected: Vec<u8> =
            cpu::tint(&image, &sites, &frame, &options.post_processing)
                .into_iter()
                .flat_map(to_rgba8)
                .collect();
        assert_eq!(read_back(&context, stage.targets().result().unwrap()), expected);

        let shown = read_texture(&context, &output, 64, 64);
        assert_eq!(&shown[..4], &[255, 0, 0, 255]);
        let last = shown.len() - 4;
        assert_eq!(&shown[last..], &[0, 0, 255, 255]);
    }

    #[test]
    fn gpu_tint_runs_on_frames_without_a_dispatch() {
        let Some(context) = headless(32) else {
            return;
        };
        let mut options = solid_tint_options();
        let mut stage = VoronoiStage::new(&context, &options).unwrap();
        let _ = stage.sync_sites(&context, &corner_sites(32.0)).unwrap();
        assert!(stage.dispatch(&context));

        let output = output_texture(&context);
        let view = output.create_view(&wgpu::TextureViewDescriptor::default());
        stage.render(&context, &view, 0.0);
        let tinted = read_back(&context, stage.targets().result().unwrap());
        assert_eq!(&tinted[..4], &[255, 0, 0, 255]);

        // Only the frame shows through now; no dispatch in between.
        options.post_processing.tint_strength = 0.0;
        stage.apply_options(&context.queue, &options);
        stage.render(&context, &view, 0.5);
        let untinted = read_back(&context, stage.targets().result().unwrap());
        assert_ne!(tinted, untinted);
        assert_ne!(&untinted[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn gpu_render_after_release_only_clears_the_output() {
        let Some(context) = headless(24) else {
            return;
        };
        let mut stage = VoronoiStage::new(&context, &post_process_options()).unwrap();
        let _ = stage.sync_sites(&context, &corner_sites(24.0)).unwrap();
        assert!(stage.dispatch(&context));

        let output = output_texture(&context);
        let view = output.create_view(&wgpu::TextureViewDescriptor::default());
        stage.render(&context, &view, 0.0);
        stage.release(&context);
        stage.render(&context, &view, 0.1);
        stage.render(&context, &view, 0.2);

        let shown = read_texture(&context, &output, 24, 24);
        assert!(shown.chunks_exact(4).all(|c| c == [0, 0, 0, 255]));
    }

    #[test]
    fn gpu_stage_takes_over_another_variant() {
        let Some(context) = headless(48) else {
            return;
        };
        let mut base = VoronoiStage::new(&context, &Options::default()).unwrap();
        let _ = base.sync_sites(&context, &corner_sites(48.0)).unwrap();
        assert!(base.dispatch(&context));

        let mut post = VoronoiStage::compose(&context, &post_process_options()).unwrap();
        assert!(post.targets().result().is_none());
        post.take_over(&mut base, &context).unwrap();

        assert!(base.targets().result().is_none());
        assert_eq!(base.site_count(), 0);
        assert!(!base.dispatch(&context));
        assert_eq!(post.targets().size(), (48, 48));
        assert!(post.targets().owner_ids().is_some());

        let _ = post.sync_sites(&context, &corner_sites(48.0)).unwrap();
        assert!(post.dispatch(&context));
        let ids = owners(&read_back(&context, post.targets().owner_ids().unwrap()));
        assert_eq!(ids[0], 0);
    }
}
