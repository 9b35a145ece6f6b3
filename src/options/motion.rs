use serde::{Deserialize, Serialize};

/// Anchor animation parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionOptions {
    /// Whether anchors move at all.
    pub enabled: bool,
    /// Orbit radius in world units.
    pub radius: f32,
    /// Base angular speed in radians per second.
    pub angular_speed: f32,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 0.4,
            angular_speed: 0.8,
        }
    }
}
