use serde::{Deserialize, Serialize};

/// Which pipeline the stage builds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Voronoi colors blitted straight to the output.
    #[default]
    Base,
    /// Owner ids feed a tint pass over the rendered frame before the blit.
    PostProcess,
}

impl Variant {
    /// Whether this variant allocates and writes the owner-id target.
    #[must_use]
    pub fn uses_owner_ids(self) -> bool {
        matches!(self, Self::PostProcess)
    }
}

/// When the Voronoi kernel is re-dispatched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecomputePolicy {
    /// Only in ticks where at least one anchor moved (or after a resize).
    #[default]
    OnChange,
    /// Once every tick, moved or not.
    EveryTick,
}

/// Pipeline shape and scheduling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineOptions {
    /// Base or post-process pipeline.
    pub variant: Variant,
    /// Recompute scheduling.
    pub recompute: RecomputePolicy,
    /// Color written where no site owns a pixel (zero sites).
    pub clear_color: [f32; 4],
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            variant: Variant::Base,
            recompute: RecomputePolicy::OnChange,
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}
