use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::options::CameraOptions;

/// Perspective camera defined by eye position, target, and projection
/// parameters.
///
/// Passed explicitly to everything that projects anchors; nothing queries a
/// global "active camera".
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Camera {
    /// Camera at the origin looking down -Z, configured from `options`.
    #[must_use]
    pub fn from_options(options: &CameraOptions, viewport: (u32, u32)) -> Self {
        Self {
            eye: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            aspect: aspect_of(viewport),
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        }
    }

    /// Update the aspect ratio for a new viewport size.
    pub fn set_viewport(&mut self, viewport: (u32, u32)) {
        self.aspect = aspect_of(viewport);
    }

    /// Build the combined view-projection matrix.
    pub fn build_matrix(&self) -> Mat4 {
        self.build_projection() * self.build_view()
    }

    /// World-to-view transform.
    pub fn build_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Projection matrix, [0,1] depth range (wgpu convention).
    pub fn build_projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// Unit vector from the eye toward the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize()
    }

    /// Project a world position to pixel coordinates with the origin at the
    /// top-left corner, matching storage-texture addressing.
    ///
    /// Points behind the eye project mirrored; callers keep anchors in front
    /// of the camera.
    pub fn world_to_screen(&self, world: Vec3, viewport: (u32, u32)) -> Vec2 {
        let clip = self.build_matrix() * world.extend(1.0);
        let ndc = clip.xy() / clip.w;
        let (w, h) = (viewport.0 as f32, viewport.1 as f32);
        Vec2::new((ndc.x * 0.5 + 0.5) * w, (0.5 - ndc.y * 0.5) * h)
    }

    /// Inverse of [`world_to_screen`](Self::world_to_screen): the world point
    /// under pixel `screen` that lies `depth` units in front of the eye along
    /// the view direction.
    pub fn screen_to_world(
        &self,
        screen: Vec2,
        depth: f32,
        viewport: (u32, u32),
    ) -> Vec3 {
        let (w, h) = (viewport.0 as f32, viewport.1 as f32);
        let ndc = Vec2::new(screen.x / w * 2.0 - 1.0, 1.0 - screen.y / h * 2.0);
        let inverse = self.build_matrix().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let dir = (far - near).normalize();
        let along = dir.dot(self.forward());
        self.eye + dir * (depth / along)
    }
}

fn aspect_of((width, height): (u32, u32)) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
