//! Tracks which resource allocations a bind group was built against.

use crate::gpu::site_buffer::SiteBuffer;
use crate::gpu::targets::RenderTargets;

/// Allocation generations a bind group references. A bind group is stale
/// as soon as any of them moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BindingKey {
    sites: u64,
    targets: u64,
    frame: u64,
}

impl BindingKey {
    pub(crate) fn new<B, T>(
        sites: &SiteBuffer<B>,
        targets: &RenderTargets<T>,
    ) -> Self {
        Self {
            sites: sites.generation(),
            targets: targets.generation(),
            frame: 0,
        }
    }

    /// Also key on the generation of the frame texture.
    pub(crate) fn with_frame(self, frame: u64) -> Self {
        Self { frame, ..self }
    }
}
