//! Free functions for scene setup.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::options::Options;
use crate::sites::motion::SiteMotion;
use crate::sites::scatter::scatter_sites;
use crate::sites::SiteStore;

/// The host-side scene: sites, their motion and the camera they are
/// projected through.
pub(super) struct Scene {
    pub(super) store: SiteStore,
    pub(super) motion: SiteMotion,
    pub(super) camera: Camera,
}

/// RNG for scene setup: seeded when `options.sites.seed` is set so runs
/// are reproducible, otherwise from OS entropy.
pub(super) fn scene_rng(options: &Options) -> StdRng {
    options
        .sites
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

/// Scatter `options.sites.count` sites in front of a camera fitted to
/// `viewport` and give each an orbit.
pub(super) fn build_scene(options: &Options, viewport: (u32, u32)) -> Scene {
    let camera = Camera::from_options(&options.camera, viewport);
    let mut rng = scene_rng(options);
    let mut store = SiteStore::new();
    let handles =
        scatter_sites(&mut store, &camera, viewport, &options.sites, &mut rng);
    let motion = SiteMotion::new(&mut store, options.motion, &mut rng);
    log::info!(
        "scattered {} sites at depth {} ({:?} palette)",
        handles.len(),
        options.sites.depth,
        options.sites.palette
    );
    Scene {
        store,
        motion,
        camera,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64, count: u32) -> Options {
        let mut options = Options::default();
        options.sites.seed = Some(seed);
        options.sites.count = count;
        options
    }

    #[test]
    fn scene_has_the_configured_site_count() {
        let scene = build_scene(&seeded(1, 17), (320, 240));
        assert_eq!(scene.store.len(), 17);
    }

    #[test]
    fn fixed_seed_reproduces_the_layout() {
        let a = build_scene(&seeded(7, 12), (320, 240));
        let b = build_scene(&seeded(7, 12), (320, 240));
        let pack = |s: &Scene| s.store.packed_array(&s.camera, (320, 240));
        assert_eq!(pack(&a), pack(&b));

        let c = build_scene(&seeded(8, 12), (320, 240));
        assert_ne!(pack(&a), pack(&c));
    }
}
