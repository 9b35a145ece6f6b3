//! Full-screen passes.
//!
//! The backdrop frame the tint kernel reads, and the composite that blits
//! the Voronoi result onto the output surface.

pub mod backdrop;
pub mod composite;
pub mod screen_pass;
