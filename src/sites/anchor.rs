//! World-space anchors that sites are projected from.

use glam::Vec3;

/// A point in world space that owns a site's position.
///
/// Every move raises a "changed" flag which the per-tick update polls with
/// [`take_changed`](Self::take_changed). That poll is the only signal that
/// drives a Voronoi recompute in the change-gated policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    position: Vec3,
    changed: bool,
}

impl Anchor {
    /// Anchor at `position`. A new anchor starts unchanged.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            changed: false,
        }
    }

    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the anchor. Setting the same position does not count as a change.
    pub fn set_position(&mut self, position: Vec3) {
        if position != self.position {
            self.position = position;
            self.changed = true;
        }
    }

    /// Whether the anchor moved since the last poll, without clearing it.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Report whether the anchor moved since the last poll and clear the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_reports_once_then_clears() {
        let mut anchor = Anchor::new(Vec3::ZERO);
        assert!(!anchor.take_changed());

        anchor.set_position(Vec3::X);
        assert!(anchor.has_changed());
        assert!(anchor.take_changed());
        assert!(!anchor.take_changed());
    }

    #[test]
    fn setting_same_position_is_not_a_change() {
        let mut anchor = Anchor::new(Vec3::ONE);
        anchor.set_position(Vec3::ONE);
        assert!(!anchor.take_changed());
    }
}
