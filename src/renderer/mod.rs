//! Voronoi rendering subsystems.
//!
//! The `generate_voronoi` and `voronoi_post_process` compute passes, the
//! full-screen passes around them, the [`stage::VoronoiStage`] that owns
//! their resources, and a CPU rendition of both kernels.

pub(crate) mod bindings;
pub mod cpu;
pub mod postprocess;
pub mod stage;
pub mod tint;
pub mod voronoi;

pub use stage::VoronoiStage;
