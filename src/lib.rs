// -- Lint policy ---------------------------------------------------------
// Lint groups and allowances live in Cargo.toml; only the no-panic and
// no-print rules are repeated here so they hold under any lint config.

// Documentation
#![deny(missing_docs)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Allowed in tests
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! Real-time screen-space Voronoi diagrams computed on the GPU with wgpu.
//!
//! A set of world-space anchors is projected through a camera into pixel
//! positions. A compute kernel assigns every output pixel the color (and,
//! in the post-process variant, the index) of its nearest site, and a
//! screen pass blits the result onto the surface.
//!
//! # Key entry points
//!
//! - [`engine::VoronoiEngine`] - per-frame driver (update, render, resize)
//! - [`renderer::VoronoiStage`] - GPU resources and passes of one pipeline
//! - [`options::Options`] - runtime configuration with TOML presets
//! - [`sites::SiteStore`] - the host-side site collection
//!
//! # Architecture
//!
//! Each tick has an update phase and a render phase. The update phase
//! moves the anchors and polls their change flags; the first change of a
//! tick re-uploads the packed site array and dispatches the kernel, and
//! the [`engine::FrameOrchestrator`] drops every later request until the
//! next tick. The render phase runs every frame: optional backdrop and
//! tint, then the composite blit.

pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod options;
pub mod renderer;
pub mod sites;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use engine::VoronoiEngine;
pub use error::VoroError;
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
