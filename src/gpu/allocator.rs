//! The GPU device boundary used by the resource managers.
//!
//! [`SiteBuffer`](super::site_buffer::SiteBuffer) and
//! [`RenderTargets`](super::targets::RenderTargets) never talk to wgpu
//! directly. They go through [`GpuAllocator`], which [`WgpuAllocator`]
//! implements for a real device and the test double implements with plain
//! counters, so allocation/release ordering can be verified without a GPU.

use super::texture::StorageTarget;
use crate::error::VoroError;

/// A buffer allocation request.
#[derive(Debug, Clone, Copy)]
pub struct BufferRequest<'a> {
    /// Debug label.
    pub label: &'a str,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags (`COPY_DST` is always added).
    pub usage: wgpu::BufferUsages,
}

/// A 2D storage target allocation request.
#[derive(Debug, Clone, Copy)]
pub struct TargetRequest<'a> {
    /// Debug label.
    pub label: &'a str,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Texel format.
    pub format: wgpu::TextureFormat,
}

/// Allocates, fills and releases GPU resources.
pub trait GpuAllocator {
    /// Handle to an allocated buffer.
    type Buffer;
    /// Handle to an allocated storage target.
    type Target;

    /// Allocate a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if the request exceeds what the
    /// device supports.
    fn create_buffer(
        &mut self,
        request: &BufferRequest<'_>,
    ) -> Result<Self::Buffer, VoroError>;

    /// Upload `bytes` to the start of `buffer`.
    fn write_buffer(&mut self, buffer: &Self::Buffer, bytes: &[u8]);

    /// Release a buffer. The handle is consumed.
    fn release_buffer(&mut self, buffer: Self::Buffer);

    /// Allocate a storage-writable 2D target.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if either dimension exceeds the
    /// device's maximum 2D texture size.
    fn create_target(
        &mut self,
        request: &TargetRequest<'_>,
    ) -> Result<Self::Target, VoroError>;

    /// Release a target. The handle is consumed.
    fn release_target(&mut self, target: Self::Target);
}

/// [`GpuAllocator`] over a wgpu device and queue.
pub struct WgpuAllocator<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
}

impl<'a> WgpuAllocator<'a> {
    /// Borrow a device and queue for allocation.
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

impl GpuAllocator for WgpuAllocator<'_> {
    type Buffer = wgpu::Buffer;
    type Target = StorageTarget;

    fn create_buffer(
        &mut self,
        request: &BufferRequest<'_>,
    ) -> Result<wgpu::Buffer, VoroError> {
        let limits = self.device.limits();
        let limit = limits
            .max_buffer_size
            .min(u64::from(limits.max_storage_buffer_binding_size));
        if request.size > limit {
            return Err(VoroError::ResourceLimit {
                label: request.label.to_owned(),
                requested: request.size,
                limit,
            });
        }
        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(request.label),
            size: request.size,
            usage: request.usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    fn write_buffer(&mut self, buffer: &wgpu::Buffer, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.queue.write_buffer(buffer, 0, bytes);
        }
    }

    fn release_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn create_target(
        &mut self,
        request: &TargetRequest<'_>,
    ) -> Result<StorageTarget, VoroError> {
        let limit = self.device.limits().max_texture_dimension_2d;
        let largest = request.width.max(request.height);
        if largest > limit {
            return Err(VoroError::ResourceLimit {
                label: request.label.to_owned(),
                requested: u64::from(largest),
                limit: u64::from(limit),
            });
        }
        Ok(StorageTarget::new(
            self.device,
            request.label,
            request.width,
            request.height,
            request.format,
        ))
    }

    fn release_target(&mut self, target: StorageTarget) {
        target.destroy();
    }
}
