//! Shared utilities.

/// Frame pacing, FPS smoothing and periodic stats.
pub mod frame_timing;
