//! Device-side copy of the packed site array.

use super::allocator::{BufferRequest, GpuAllocator};
use crate::error::VoroError;
use crate::sites::{PackedSite, SITE_STRIDE};

/// Owns the storage buffer the kernels read sites from.
///
/// The buffer is sized exactly for the current site count. A count change
/// releases the old buffer before allocating its replacement, so at most
/// one buffer is live at a time. An empty array still gets a one-record
/// buffer because zero-sized bindings are rejected by the device; the
/// logical length stays zero and the kernels read the count from their
/// params.
pub struct SiteBuffer<B> {
    buffer: Option<B>,
    len: usize,
    generation: u64,
}

impl<B> Default for SiteBuffer<B> {
    fn default() -> Self {
        Self {
            buffer: None,
            len: 0,
            generation: 0,
        }
    }
}

impl<B> SiteBuffer<B> {
    /// Nothing allocated yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Release any current buffer, allocate one sized for `records` and
    /// upload them. Always reallocates, even at an unchanged count.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if the array does not fit in a
    /// storage binding. The previous buffer is already released by then,
    /// so the manager is left empty.
    pub fn ensure<A>(
        &mut self,
        alloc: &mut A,
        records: &[PackedSite],
    ) -> Result<(), VoroError>
    where
        A: GpuAllocator<Buffer = B>,
    {
        self.release(alloc);

        let size = (records.len().max(1) * SITE_STRIDE) as u64;
        let buffer = alloc.create_buffer(&BufferRequest {
            label: "Site Buffer",
            size,
            usage: wgpu::BufferUsages::STORAGE,
        })?;
        alloc.write_buffer(&buffer, bytemuck::cast_slice(records));

        log::debug!("site buffer allocated: {} sites, {size} bytes", records.len());
        self.buffer = Some(buffer);
        self.len = records.len();
        self.generation += 1;
        Ok(())
    }

    /// Bring the device copy up to date with `records`.
    ///
    /// Writes in place when the count is unchanged and a buffer exists,
    /// otherwise goes through [`ensure`](Self::ensure). Returns whether the
    /// buffer was reallocated (bindings referencing it are then stale).
    ///
    /// # Errors
    ///
    /// Propagates allocation failures from [`ensure`](Self::ensure).
    pub fn sync<A>(
        &mut self,
        alloc: &mut A,
        records: &[PackedSite],
    ) -> Result<bool, VoroError>
    where
        A: GpuAllocator<Buffer = B>,
    {
        match &self.buffer {
            Some(buffer) if self.len == records.len() => {
                alloc.write_buffer(buffer, bytemuck::cast_slice(records));
                Ok(false)
            }
            _ => {
                self.ensure(alloc, records)?;
                Ok(true)
            }
        }
    }

    /// Release the buffer. A no-op when nothing is allocated.
    pub fn release<A>(&mut self, alloc: &mut A)
    where
        A: GpuAllocator<Buffer = B>,
    {
        if let Some(buffer) = self.buffer.take() {
            alloc.release_buffer(buffer);
        }
        self.len = 0;
    }

    /// Number of sites currently on the device.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the device copy holds no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bumped on every allocation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The live buffer, if any.
    #[must_use]
    pub fn buffer(&self) -> Option<&B> {
        self.buffer.as_ref()
    }
}
