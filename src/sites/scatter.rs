//! Random scene setup.

use glam::Vec2;
use rand::Rng;

use super::anchor::Anchor;
use super::palette::random_hsv;
use super::store::{SiteHandle, SiteStore};
use crate::camera::Camera;
use crate::options::{Palette, SiteOptions};

/// Place `options.count` anchors under uniformly random pixels,
/// `options.depth` units in front of the camera, and add them to `store`.
pub fn scatter_sites<R: Rng + ?Sized>(
    store: &mut SiteStore,
    camera: &Camera,
    viewport: (u32, u32),
    options: &SiteOptions,
    rng: &mut R,
) -> Vec<SiteHandle> {
    let (w, h) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
    (0..options.count)
        .map(|_| {
            let pixel =
                Vec2::new(rng.random_range(0.0..w), rng.random_range(0.0..h));
            let world = camera.screen_to_world(pixel, options.depth, viewport);
            let color = match options.palette {
                Palette::RandomHsv => random_hsv(rng),
                Palette::Uniform => options.uniform_color,
            };
            store.add_site(Anchor::new(world), color)
        })
        .collect()
}
