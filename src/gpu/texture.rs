//! Storage-capable render-target texture.

/// A GPU texture the compute kernels write through storage bindings and the
/// screen passes read through sampled bindings.
///
/// Created with `STORAGE_BINDING | TEXTURE_BINDING | COPY_SRC` usage so the
/// same texture can be written by a dispatch, sampled by the composite, and
/// copied out for read-back.
pub struct StorageTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Texel format.
    pub format: wgpu::TextureFormat,
}

impl StorageTarget {
    /// Usage flags every storage target is created with.
    pub const USAGE: wgpu::TextureUsages = wgpu::TextureUsages::STORAGE_BINDING
        .union(wgpu::TextureUsages::TEXTURE_BINDING)
        .union(wgpu::TextureUsages::COPY_SRC);

    /// Create a new storage target with the given dimensions and format.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: Self::USAGE,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
            format,
        }
    }

    /// Free the GPU memory now instead of waiting for the last handle to
    /// drop.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}
