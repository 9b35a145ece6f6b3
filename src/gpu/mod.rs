//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, the allocator seam the
//! resource managers go through, the site buffer and render-target
//! managers, and shader composition.

/// Allocation boundary between resource managers and the device.
pub mod allocator;
/// Shared wgpu boilerplate for compute and screen-space pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Device copy of the packed site array.
pub mod site_buffer;
/// Result and Owner-Id render targets.
pub mod targets;
/// Storage-capable texture used for the render targets.
pub mod texture;
