//! The `generate_voronoi` compute pass.

use super::bindings::BindingKey;
use crate::error::VoroError;
use crate::gpu::pipeline_helpers::{
    create_compute_pipeline, storage_buffer_read, storage_texture_write,
    uniform_buffer, uniform_buffer_init,
};
use crate::gpu::shader_composer::{ShaderComposer, ShaderSource, OWNER_IDS_DEF};
use crate::gpu::site_buffer::SiteBuffer;
use crate::gpu::targets::{RenderTargets, OWNER_ID_FORMAT, RESULT_FORMAT};
use crate::gpu::texture::StorageTarget;

/// Side length of the kernel's square workgroup.
pub const WORKGROUP_SIZE: u32 = 8;

/// Workgroups needed to cover a `width x height` target.
#[must_use]
pub fn workgroup_count(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(WORKGROUP_SIZE), height.div_ceil(WORKGROUP_SIZE))
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct VoronoiParams {
    site_count: u32,
    width: u32,
    height: u32,
    _pad: u32,
    clear_color: [f32; 4],
}

/// Compute pipeline plus the bind group over the site buffer and targets.
pub struct VoronoiPass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    bound: Option<BindingKey>,
    params_buffer: wgpu::Buffer,
    with_owner_ids: bool,
    /// Written to every pixel when there are no sites.
    pub clear_color: [f32; 4],
}

impl VoronoiPass {
    /// Compose the kernel (with the Owner-Id output when `with_owner_ids`)
    /// and build its pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ShaderCompose`] if the kernel source does not
    /// compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        source: &ShaderSource<'_>,
        with_owner_ids: bool,
        clear_color: [f32; 4],
    ) -> Result<Self, VoroError> {
        let defs: &[&str] = if with_owner_ids { &[OWNER_IDS_DEF] } else { &[] };
        let shader = composer.compose(device, source, defs)?;

        let mut entries = vec![
            uniform_buffer(0, wgpu::ShaderStages::COMPUTE),
            storage_buffer_read(1),
            storage_texture_write(2, RESULT_FORMAT),
        ];
        if with_owner_ids {
            entries.push(storage_texture_write(3, OWNER_ID_FORMAT));
        }
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Voronoi Bind Group Layout"),
                entries: &entries,
            });
        let pipeline = create_compute_pipeline(
            device,
            "Voronoi",
            &shader,
            "generate_voronoi",
            &[&bind_group_layout],
        );
        let params_buffer = uniform_buffer_init(
            device,
            "Voronoi Params",
            &VoronoiParams::zeroed_with(clear_color),
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            bound: None,
            params_buffer,
            with_owner_ids,
            clear_color,
        })
    }

    /// Rebuild the bind group if the site buffer or targets were
    /// reallocated since it was last built.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        sites: &SiteBuffer<wgpu::Buffer>,
        targets: &RenderTargets<StorageTarget>,
    ) {
        let (Some(buffer), Some(result)) = (sites.buffer(), targets.result())
        else {
            self.bind_group = None;
            self.bound = None;
            return;
        };
        let key = BindingKey::new(sites, targets);
        if self.bound == Some(key) {
            return;
        }

        let mut entries = vec![
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
                resource: wgpu::BindingResource::TextureView(&result.view),
            },
        ];
        if self.with_owner_ids {
            let Some(owner_ids) = targets.owner_ids() else {
                self.bind_group = None;
                self.bound = None;
                return;
            };
            entries.push(wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&owner_ids.view),
            });
        }
        self.bind_group =
            Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Voronoi Bind Group"),
                layout: &self.bind_group_layout,
                entries: &entries,
            }));
        self.bound = Some(key);
    }

    /// Record one dispatch covering `size`. Returns `false` without
    /// recording anything if nothing is bound yet.
    pub fn dispatch(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        site_count: usize,
        size: (u32, u32),
    ) -> bool {
        let Some(bind_group) = &self.bind_group else {
            return false;
        };
        let params = VoronoiParams {
            site_count: site_count as u32,
            width: size.0,
            height: size.1,
            _pad: 0,
            clear_color: self.clear_color,
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));

        let (groups_x, groups_y) = workgroup_count(size.0, size.1);
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Voronoi Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(groups_x, groups_y, 1);
        log::debug!(
            "voronoi dispatch: {site_count} sites, {groups_x}x{groups_y} workgroups"
        );
        true
    }
}

impl VoronoiParams {
    fn zeroed_with(clear_color: [f32; 4]) -> Self {
        Self {
            site_count: 0,
            width: 0,
            height: 0,
            _pad: 0,
            clear_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_round_up() {
        assert_eq!(workgroup_count(512, 512), (64, 64));
        assert_eq!(workgroup_count(1024, 768), (128, 96));
        assert_eq!(workgroup_count(13, 9), (2, 2));
        assert_eq!(workgroup_count(1, 1), (1, 1));
    }

    #[test]
    fn params_match_the_wgsl_uniform_layout() {
        assert_eq!(std::mem::size_of::<VoronoiParams>(), 32);
    }
}
