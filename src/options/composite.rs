use serde::{Deserialize, Serialize};

/// Final blit parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompositeOptions {
    /// Opacity of the Voronoi image over a black background.
    pub opacity: f32,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}
