use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Optional on-disk WGSL overrides for the built-in shaders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AssetOptions {
    /// Replacement for the Voronoi compute kernel. Must keep the
    /// `generate_voronoi` entry point and binding layout.
    pub voronoi_kernel: Option<PathBuf>,
    /// Replacement for the composite shader. Must keep `vs_main`/`fs_main`
    /// and the binding layout.
    pub composite_shader: Option<PathBuf>,
}
