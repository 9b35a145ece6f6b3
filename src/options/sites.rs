use serde::{Deserialize, Serialize};

/// How site colors are chosen at setup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Independent random hue, saturation and value per site.
    #[default]
    RandomHsv,
    /// Every site gets [`SiteOptions::uniform_color`].
    Uniform,
}

/// Site generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteOptions {
    /// Number of sites to generate (1..=100000).
    pub count: u32,
    /// Fixed RNG seed for reproducible layouts; random when absent.
    pub seed: Option<u64>,
    /// Distance of the anchors in front of the camera, in world units.
    pub depth: f32,
    /// Color scheme.
    pub palette: Palette,
    /// Color used by [`Palette::Uniform`].
    pub uniform_color: [f32; 4],
}

impl SiteOptions {
    /// Smallest accepted site count.
    pub const MIN_COUNT: u32 = 1;
    /// Largest accepted site count.
    pub const MAX_COUNT: u32 = 100_000;
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            count: 64,
            seed: None,
            depth: 10.0,
            palette: Palette::RandomHsv,
            uniform_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
