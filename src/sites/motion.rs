//! Keeps the anchors moving so the diagram changes over time.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::store::SiteStore;
use crate::options::MotionOptions;

#[derive(Debug, Clone, Copy)]
struct Orbit {
    home: Vec3,
    phase: f32,
    rate: f32,
}

/// Moves every anchor on a small circle around its starting point, in the
/// plane facing the camera.
#[derive(Debug, Clone)]
pub struct SiteMotion {
    orbits: Vec<Orbit>,
    elapsed: f32,
    options: MotionOptions,
}

impl SiteMotion {
    /// Record the current anchor positions as orbit centers, with a random
    /// phase and rate per site.
    pub fn new<R: Rng + ?Sized>(
        store: &mut SiteStore,
        options: MotionOptions,
        rng: &mut R,
    ) -> Self {
        let orbits = store
            .anchors_mut()
            .map(|anchor| Orbit {
                home: anchor.position(),
                phase: rng.random_range(0.0..TAU),
                rate: rng.random_range(0.5..1.5),
            })
            .collect();
        Self {
            orbits,
            elapsed: 0.0,
            options,
        }
    }

    /// Replace the motion parameters. Orbit centers are kept.
    pub fn set_options(&mut self, options: MotionOptions) {
        self.options = options;
    }

    /// Advance by `dt` seconds and move the anchors. Does nothing while
    /// motion is disabled, so the anchors report no change.
    pub fn step(&mut self, store: &mut SiteStore, dt: f32) {
        if !self.options.enabled {
            return;
        }
        self.elapsed += dt;
        let radius = self.options.radius;
        let speed = self.options.angular_speed;
        for (anchor, orbit) in store.anchors_mut().zip(&self.orbits) {
            let angle = orbit.phase + self.elapsed * speed * orbit.rate;
            let offset = Vec3::new(angle.cos(), angle.sin(), 0.0) * radius;
            anchor.set_position(orbit.home + offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sites::anchor::Anchor;

    fn store_with(n: usize) -> SiteStore {
        let mut store = SiteStore::new();
        for i in 0..n {
            let _ = store.add_site(
                Anchor::new(Vec3::new(i as f32, 0.0, -10.0)),
                [1.0; 4],
            );
        }
        store
    }

    #[test]
    fn enabled_motion_marks_every_anchor_changed() {
        let mut store = store_with(4);
        let mut motion = SiteMotion::new(
            &mut store,
            MotionOptions::default(),
            &mut StdRng::seed_from_u64(3),
        );
        motion.step(&mut store, 0.016);
        assert_eq!(store.poll_changes().len(), 4);
    }

    #[test]
    fn disabled_motion_leaves_anchors_untouched() {
        let mut store = store_with(4);
        let options = MotionOptions {
            enabled: false,
            ..MotionOptions::default()
        };
        let mut motion =
            SiteMotion::new(&mut store, options, &mut StdRng::seed_from_u64(3));
        motion.step(&mut store, 0.5);
        assert!(store.poll_changes().is_empty());
    }

    #[test]
    fn anchors_stay_on_their_orbit() {
        let mut store = store_with(2);
        let options = MotionOptions {
            radius: 0.25,
            ..MotionOptions::default()
        };
        let mut motion =
            SiteMotion::new(&mut store, options, &mut StdRng::seed_from_u64(9));
        for _ in 0..10 {
            motion.step(&mut store, 0.1);
        }
        for (i, anchor) in store.anchors_mut().enumerate() {
            let home = Vec3::new(i as f32, 0.0, -10.0);
            assert!(((anchor.position() - home).length() - 0.25).abs() < 1e-4);
        }
    }
}
