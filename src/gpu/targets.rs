//! The kernel's output images.

use super::allocator::{GpuAllocator, TargetRequest};
use crate::error::VoroError;

/// Texel format of the color result.
pub const RESULT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Texel format of the per-pixel owner ids.
pub const OWNER_ID_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Uint;

/// Owns the Result target and, for the post-process variant, the Owner-Id
/// target. Both always share the viewport size.
///
/// Targets are only reallocated on a real size change; the old ones are
/// released before the new ones are created.
pub struct RenderTargets<T> {
    result: Option<T>,
    owner_ids: Option<T>,
    size: (u32, u32),
    with_owner_ids: bool,
    generation: u64,
}

impl<T> RenderTargets<T> {
    /// Empty manager. `with_owner_ids` selects whether an Owner-Id target is
    /// allocated next to the Result.
    #[must_use]
    pub fn new(with_owner_ids: bool) -> Self {
        Self {
            result: None,
            owner_ids: None,
            size: (0, 0),
            with_owner_ids,
            generation: 0,
        }
    }

    /// Make sure targets of `width x height` exist (each side clamped to at
    /// least 1). Returns whether anything was allocated.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ResourceLimit`] if the size exceeds the device's
    /// 2D texture limit. The previous targets are released in that case.
    pub fn ensure<A>(
        &mut self,
        alloc: &mut A,
        width: u32,
        height: u32,
    ) -> Result<bool, VoroError>
    where
        A: GpuAllocator<Target = T>,
    {
        let size = (width.max(1), height.max(1));
        if self.result.is_some() && self.size == size {
            return Ok(false);
        }
        self.release(alloc);

        let result = alloc.create_target(&TargetRequest {
            label: "Voronoi Result",
            width: size.0,
            height: size.1,
            format: RESULT_FORMAT,
        })?;
        let owner_ids = if self.with_owner_ids {
            match alloc.create_target(&TargetRequest {
                label: "Voronoi Owner Ids",
                width: size.0,
                height: size.1,
                format: OWNER_ID_FORMAT,
            }) {
                Ok(target) => Some(target),
                Err(e) => {
                    alloc.release_target(result);
                    return Err(e);
                }
            }
        } else {
            None
        };

        log::debug!("render targets allocated at {}x{}", size.0, size.1);
        self.result = Some(result);
        self.owner_ids = owner_ids;
        self.size = size;
        self.generation += 1;
        Ok(true)
    }

    /// Allocate targets of `width x height` in place of `previous`, whose
    /// targets are released first. Used when a stage of another variant
    /// replaces the live one.
    ///
    /// # Errors
    ///
    /// Same as [`ensure`](Self::ensure). `previous` stays released.
    pub fn take_over<A>(
        &mut self,
        previous: &mut Self,
        alloc: &mut A,
        width: u32,
        height: u32,
    ) -> Result<bool, VoroError>
    where
        A: GpuAllocator<Target = T>,
    {
        previous.release(alloc);
        self.ensure(alloc, width, height)
    }

    /// Release every target. A no-op when nothing is allocated.
    pub fn release<A>(&mut self, alloc: &mut A)
    where
        A: GpuAllocator<Target = T>,
    {
        if let Some(result) = self.result.take() {
            alloc.release_target(result);
        }
        if let Some(owner_ids) = self.owner_ids.take() {
            alloc.release_target(owner_ids);
        }
        self.size = (0, 0);
    }

    /// The color result.
    #[must_use]
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Per-pixel owner ids (post-process variant only).
    #[must_use]
    pub fn owner_ids(&self) -> Option<&T> {
        self.owner_ids.as_ref()
    }

    /// Current size, `(0, 0)` when nothing is allocated.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Whether an Owner-Id target accompanies the Result.
    #[must_use]
    pub fn has_owner_ids(&self) -> bool {
        self.with_owner_ids
    }

    /// Bumped on every allocation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
