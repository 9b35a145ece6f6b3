use serde::{Deserialize, Serialize};

/// Tint pass parameters (post-process variant).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PostProcessingOptions {
    /// Blend factor from the frame color (0) to the owning site's color (1).
    pub tint_strength: f32,
    /// Blend factor toward `border_color` on cell boundaries.
    pub border_strength: f32,
    /// Cell boundary color.
    pub border_color: [f32; 4],
}

impl Default for PostProcessingOptions {
    fn default() -> Self {
        Self {
            tint_strength: 0.35,
            border_strength: 0.8,
            border_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
