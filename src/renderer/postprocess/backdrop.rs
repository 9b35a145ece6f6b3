//! The frame the post-process variant tints.

use super::screen_pass::{draw_fullscreen, ScreenPass};
use crate::error::VoroError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, uniform_buffer, uniform_buffer_init,
};
use crate::gpu::shader_composer::{Shader, ShaderComposer, ShaderSource};

/// Texel format of the frame texture.
pub const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct BackdropParams {
    resolution: [f32; 2],
    time: f32,
    _pad: f32,
}

struct FrameTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Renders a procedural scene into an off-screen frame texture, standing in
/// for the camera image the tint pass reads.
///
/// The frame texture exists between the first [`resize`](Self::resize) and
/// [`release`](Self::release); without it nothing is drawn.
pub struct BackdropPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    params: BackdropParams,
    frame: Option<FrameTexture>,
    size: (u32, u32),
    generation: u64,
}

impl BackdropPass {
    /// Build the pipeline. The frame texture is allocated by the first
    /// [`resize`](Self::resize).
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ShaderCompose`] if the shader does not compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
    ) -> Result<Self, VoroError> {
        let shader = composer.compose(
            device,
            &ShaderSource::bundled(Shader::Backdrop),
            &[],
        )?;
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Backdrop Bind Group Layout"),
                entries: &[uniform_buffer(0, wgpu::ShaderStages::FRAGMENT)],
            });
        let pipeline = create_screen_space_pipeline(
            device,
            "Backdrop",
            &shader,
            FRAME_FORMAT,
            None,
            &[&layout],
        );

        let params = BackdropParams {
            resolution: [1.0, 1.0],
            time: 0.0,
            _pad: 0.0,
        };
        let params_buffer =
            uniform_buffer_init(device, "Backdrop Params", &params);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Backdrop Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            bind_group,
            params_buffer,
            params,
            frame: None,
            size: (0, 0),
            generation: 0,
        })
    }

    fn create_frame_texture(
        device: &wgpu::Device,
        size: (u32, u32),
    ) -> FrameTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Color Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        FrameTexture { texture, view }
    }

    /// Allocate the frame texture at `size`, replacing one of another size.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        let size = (size.0.max(1), size.1.max(1));
        if self.frame.is_some() && size == self.size {
            return;
        }
        self.release();
        self.frame = Some(Self::create_frame_texture(device, size));
        self.size = size;
        self.generation += 1;
        self.params.resolution = [size.0 as f32, size.1 as f32];
    }

    /// Advance the scene clock and upload the params.
    pub fn update(&mut self, queue: &wgpu::Queue, time: f32) {
        self.params.time = time;
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&self.params));
    }

    /// Render the scene into the frame texture. Returns `false` when there
    /// is no frame texture to render into.
    pub fn render_frame(&self, encoder: &mut wgpu::CommandEncoder) -> bool {
        let Some(frame) = &self.frame else {
            return false;
        };
        self.render(encoder, &frame.view);
        true
    }

    /// The frame texture, if allocated.
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.frame.as_ref().map(|frame| &frame.view)
    }

    /// Bumped whenever the frame texture is recreated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Free the frame texture. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.texture.destroy();
        }
    }
}

impl ScreenPass for BackdropPass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        draw_fullscreen(
            encoder,
            "Backdrop Pass",
            output,
            &self.pipeline,
            Some(&self.bind_group),
        );
    }
}
