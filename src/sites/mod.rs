//! Sites: the moving points the Voronoi diagram is built from.
//!
//! A site is a world-space [`anchor::Anchor`] plus a cell color. The
//! [`store::SiteStore`] projects anchors through the camera into the packed
//! records the kernels read.

/// World-space anchors and their change flag.
pub mod anchor;
/// Anchor animation.
pub mod motion;
/// GPU transfer record.
pub mod packed;
/// Color generation.
pub mod palette;
/// Random initial placement.
pub mod scatter;
/// The site collection.
pub mod store;

pub use anchor::Anchor;
pub use packed::{PackedSite, SITE_STRIDE};
pub use store::{SiteHandle, SiteStore};
