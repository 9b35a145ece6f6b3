//! The `voronoi_post_process` compute pass.

use super::bindings::BindingKey;
use super::voronoi::workgroup_count;
use crate::error::VoroError;
use crate::gpu::pipeline_helpers::{
    create_compute_pipeline, loaded_texture_2d, storage_buffer_read,
    storage_texture_write, uniform_buffer, uniform_buffer_init,
};
use crate::gpu::shader_composer::{Shader, ShaderComposer, ShaderSource};
use crate::gpu::site_buffer::SiteBuffer;
use crate::gpu::targets::{RenderTargets, RESULT_FORMAT};
use crate::gpu::texture::StorageTarget;
use crate::options::PostProcessingOptions;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct TintParams {
    site_count: u32,
    width: u32,
    height: u32,
    _pad: u32,
    border_color: [f32; 4],
    tint_strength: f32,
    border_strength: f32,
    _pad2: [f32; 2],
}

/// Blends the displayed frame with the cell colors, writing into Result.
///
/// Reads Owner-Id, so it only exists for the post-process variant.
pub struct TintPass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    bound: Option<BindingKey>,
    params_buffer: wgpu::Buffer,
    params: TintParams,
}

impl TintPass {
    /// Compose the tint kernel and build its pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ShaderCompose`] if the kernel does not compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        options: &PostProcessingOptions,
    ) -> Result<Self, VoroError> {
        let shader = composer.compose(
            device,
            &ShaderSource::bundled(Shader::VoronoiTint),
            &[],
        )?;
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Tint Bind Group Layout"),
                entries: &[
                    uniform_buffer(0, wgpu::ShaderStages::COMPUTE),
                    storage_buffer_read(1),
                    storage_texture_write(2, RESULT_FORMAT),
                    loaded_texture_2d(3, wgpu::TextureSampleType::Uint),
                    loaded_texture_2d(
                        4,
                        wgpu::TextureSampleType::Float { filterable: false },
                    ),
                ],
            });
        let pipeline = create_compute_pipeline(
            device,
            "Voronoi Tint",
            &shader,
            "voronoi_post_process",
            &[&bind_group_layout],
        );

        let mut params = TintParams::zeroed();
        params.apply(options);
        let params_buffer = uniform_buffer_init(device, "Tint Params", &params);

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            bound: None,
            params_buffer,
            params,
        })
    }

    /// Pick up new tint parameters; uploaded on the next dispatch.
    pub fn apply_options(&mut self, options: &PostProcessingOptions) {
        self.params.apply(options);
    }

    /// Rebuild the bind group if any input was reallocated.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        sites: &SiteBuffer<wgpu::Buffer>,
        targets: &RenderTargets<StorageTarget>,
        frame: &wgpu::TextureView,
        frame_generation: u64,
    ) {
        let (Some(buffer), Some(result), Some(owner_ids)) =
            (sites.buffer(), targets.result(), targets.owner_ids())
        else {
            self.bind_group = None;
            self.bound = None;
            return;
        };
        let key = BindingKey::new(sites, targets).with_frame(frame_generation);
        if self.bound == Some(key) {
            return;
        }

        self.bind_group =
            Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Tint Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(
                            &result.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(
                            &owner_ids.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::TextureView(frame),
                    },
                ],
            }));
        self.bound = Some(key);
    }

    /// Record the tint dispatch. Returns `false` if nothing is bound yet.
    pub fn dispatch(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        site_count: usize,
        size: (u32, u32),
    ) -> bool {
        let Some(bind_group) = &self.bind_group else {
            return false;
        };
        self.params.site_count = site_count as u32;
        self.params.width = size.0;
        self.params.height = size.1;
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::bytes_of(&self.params),
        );

        let (groups_x, groups_y) = workgroup_count(size.0, size.1);
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Voronoi Tint Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(groups_x, groups_y, 1);
        true
    }
}

impl TintParams {
    fn zeroed() -> Self {
        bytemuck::Zeroable::zeroed()
    }

    fn apply(&mut self, options: &PostProcessingOptions) {
        self.tint_strength = options.tint_strength;
        self.border_strength = options.border_strength;
        self.border_color = options.border_color;
    }
}
