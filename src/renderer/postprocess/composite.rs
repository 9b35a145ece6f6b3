//! Composite pass - blits the Voronoi Result onto the output surface.
//!
//! The Result target is sampled with a nearest sampler so cell edges stay
//! crisp, scaled by the configured opacity and decoded from sRGB when the
//! surface re-encodes on write.

use super::screen_pass::{draw_fullscreen, ScreenPass};
use crate::error::VoroError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, nearest_sampler, non_filtering_sampler,
    texture_2d, uniform_buffer, uniform_buffer_init,
};
use crate::gpu::shader_composer::{ShaderComposer, ShaderSource};
use crate::gpu::targets::RenderTargets;
use crate::gpu::texture::StorageTarget;
use crate::options::CompositeOptions;

/// Parameters for the composite shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeParams {
    /// Multiplier applied to the Result color.
    pub opacity: f32,
    /// Non-zero when the output format is sRGB.
    pub decode_srgb: u32,
    /// Padding for GPU alignment.
    pub _pad: [f32; 2],
}

impl CompositeParams {
    fn new(options: &CompositeOptions, format: wgpu::TextureFormat) -> Self {
        Self {
            opacity: options.opacity,
            decode_srgb: u32::from(format.is_srgb()),
            _pad: [0.0; 2],
        }
    }
}

/// Composite pass renderer
pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    bound_generation: Option<u64>,
    sampler: wgpu::Sampler,
    format: wgpu::TextureFormat,

    /// Current shader parameters.
    pub params: CompositeParams,
    params_buffer: wgpu::Buffer,
}

impl CompositePass {
    /// Build the blit pipeline for an output of `format`.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ShaderCompose`] if the composite shader does not
    /// compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        source: &ShaderSource<'_>,
        format: wgpu::TextureFormat,
        options: &CompositeOptions,
    ) -> Result<Self, VoroError> {
        let shader = composer.compose(device, source, &[])?;
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Composite Bind Group Layout"),
                entries: &[
                    texture_2d(0),
                    non_filtering_sampler(1),
                    uniform_buffer(2, wgpu::ShaderStages::FRAGMENT),
                ],
            });
        let pipeline = create_screen_space_pipeline(
            device,
            "Composite",
            &shader,
            format,
            None,
            &[&bind_group_layout],
        );

        let params = CompositeParams::new(options, format);
        let params_buffer =
            uniform_buffer_init(device, "Composite Params Buffer", &params);

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            bound_generation: None,
            sampler: nearest_sampler(device, "Composite Sampler"),
            format,
            params,
            params_buffer,
        })
    }

    /// Push new composite options to the GPU.
    pub fn apply_options(&mut self, queue: &wgpu::Queue, options: &CompositeOptions) {
        self.params = CompositeParams::new(options, self.format);
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&self.params));
    }

    /// Point the blit at the current Result target, rebuilding the bind group
    /// only when the targets were reallocated.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        targets: &RenderTargets<StorageTarget>,
    ) {
        let Some(result) = targets.result() else {
            self.bind_group = None;
            self.bound_generation = None;
            return;
        };
        if self.bound_generation == Some(targets.generation()) {
            return;
        }
        self.bind_group =
            Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Composite Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(
                            &result.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: self.params_buffer.as_entire_binding(),
                    },
                ],
            }));
        self.bound_generation = Some(targets.generation());
    }
}

impl ScreenPass for CompositePass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        draw_fullscreen(
            encoder,
            "Composite Pass",
            output,
            &self.pipeline,
            self.bind_group.as_ref(),
        );
    }
}
