//! Camera used to project site anchors into screen space.

/// Core camera struct and screen-space projection.
pub mod core;

pub use self::core::Camera;
