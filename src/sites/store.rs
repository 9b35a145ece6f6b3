//! Append-only collection of sites.

use super::anchor::Anchor;
use super::packed::PackedSite;
use crate::camera::Camera;

/// Index of a site in its [`SiteStore`]. Stable for the store's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteHandle(usize);

impl SiteHandle {
    /// Array index of the site; also its owner id in the kernel output.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Site {
    anchor: Anchor,
    color: [f32; 4],
}

/// Holds every site and produces the packed array the kernels consume.
#[derive(Debug, Clone, Default)]
pub struct SiteStore {
    sites: Vec<Site>,
}

impl SiteStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a site driven by `anchor`.
    pub fn add_site(&mut self, anchor: Anchor, color: [f32; 4]) -> SiteHandle {
        self.sites.push(Site { anchor, color });
        SiteHandle(self.sites.len() - 1)
    }

    /// Number of sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the store has no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// The anchor of `handle`.
    #[must_use]
    pub fn anchor(&self, handle: SiteHandle) -> Option<&Anchor> {
        self.sites.get(handle.0).map(|s| &s.anchor)
    }

    /// Mutable anchor of `handle`.
    pub fn anchor_mut(&mut self, handle: SiteHandle) -> Option<&mut Anchor> {
        self.sites.get_mut(handle.0).map(|s| &mut s.anchor)
    }

    /// The cell color of `handle`.
    #[must_use]
    pub fn color(&self, handle: SiteHandle) -> Option<[f32; 4]> {
        self.sites.get(handle.0).map(|s| s.color)
    }

    /// Every anchor, in site order.
    pub fn anchors_mut(&mut self) -> impl Iterator<Item = &mut Anchor> {
        self.sites.iter_mut().map(|s| &mut s.anchor)
    }

    /// Poll every anchor's changed flag, clearing it, and return the sites
    /// that moved since the previous poll.
    pub fn poll_changes(&mut self) -> Vec<SiteHandle> {
        self.sites
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.anchor.take_changed().then_some(SiteHandle(i)))
            .collect()
    }

    /// Project every anchor through `camera` and pack the result in site
    /// order.
    ///
    /// Rebuilt from scratch on each call, so the array always reflects the
    /// anchors' current positions. This allocates once per call; at demo
    /// site counts it is far below the cost of the dispatch it feeds.
    #[must_use]
    pub fn packed_array(
        &self,
        camera: &Camera,
        viewport: (u32, u32),
    ) -> Vec<PackedSite> {
        self.sites
            .iter()
            .map(|s| {
                let screen =
                    camera.world_to_screen(s.anchor.position(), viewport);
                PackedSite::new(screen.to_array(), s.color)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::options::CameraOptions;

    const VIEWPORT: (u32, u32) = (640, 480);

    fn camera() -> Camera {
        Camera::from_options(&CameraOptions::default(), VIEWPORT)
    }

    #[test]
    fn handles_follow_insertion_order() {
        let mut store = SiteStore::new();
        let a = store.add_site(Anchor::new(Vec3::ZERO), [1.0; 4]);
        let b = store.add_site(Anchor::new(Vec3::ONE), [0.5; 4]);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.color(b), Some([0.5; 4]));
    }

    #[test]
    fn packed_array_tracks_current_anchor_positions() {
        let cam = camera();
        let mut store = SiteStore::new();
        let start = cam.screen_to_world(Vec2::new(100.0, 100.0), 10.0, VIEWPORT);
        let h = store.add_site(Anchor::new(start), [1.0, 0.0, 0.0, 1.0]);

        let before = store.packed_array(&cam, VIEWPORT);
        assert!((Vec2::from(before[0].position) - Vec2::new(100.0, 100.0)).length() < 1e-2);

        let moved = cam.screen_to_world(Vec2::new(300.0, 50.0), 10.0, VIEWPORT);
        store.anchor_mut(h).unwrap().set_position(moved);

        let after = store.packed_array(&cam, VIEWPORT);
        assert!((Vec2::from(after[0].position) - Vec2::new(300.0, 50.0)).length() < 1e-2);
        assert_eq!(after[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(after[0].count, 0);
    }

    #[test]
    fn poll_changes_reports_each_move_once() {
        let mut store = SiteStore::new();
        let a = store.add_site(Anchor::new(Vec3::ZERO), [1.0; 4]);
        let b = store.add_site(Anchor::new(Vec3::ZERO), [1.0; 4]);
        let _ = store.add_site(Anchor::new(Vec3::ZERO), [1.0; 4]);

        store.anchor_mut(a).unwrap().set_position(Vec3::X);
        store.anchor_mut(b).unwrap().set_position(Vec3::Y);

        assert_eq!(store.poll_changes(), vec![a, b]);
        assert!(store.poll_changes().is_empty());
    }

    #[test]
    fn empty_store_packs_nothing() {
        let store = SiteStore::new();
        assert!(store.packed_array(&camera(), VIEWPORT).is_empty());
    }
}
