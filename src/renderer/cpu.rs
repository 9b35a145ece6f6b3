//! CPU rendition of the Voronoi and tint kernels.
//!
//! Mirrors `generate_voronoi` and `voronoi_post_process` pixel for pixel,
//! including the tiled dispatch shape and the tie-break rule. Used to check
//! GPU read-backs and to pin down the kernel contract without a device.

use super::voronoi::{workgroup_count, WORKGROUP_SIZE};
use crate::options::PostProcessingOptions;
use crate::sites::PackedSite;

/// Owner id of pixels no site owns (only possible with zero sites).
pub const NO_OWNER: u32 = u32::MAX;

/// What the kernel writes: a color and an owner id per pixel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Result target contents.
    pub colors: Vec<[f32; 4]>,
    /// Owner-Id target contents.
    pub owners: Vec<u32>,
}

impl VoronoiImage {
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Owner of pixel `(x, y)`.
    #[must_use]
    pub fn owner(&self, x: u32, y: u32) -> u32 {
        self.owners[self.index(x, y)]
    }

    /// Color of pixel `(x, y)`.
    #[must_use]
    pub fn color(&self, x: u32, y: u32) -> [f32; 4] {
        self.colors[self.index(x, y)]
    }
}

/// Index of the site nearest to `pixel` by squared Euclidean distance.
///
/// Only a strictly smaller distance replaces the current best, so
/// equidistant sites resolve to the lowest index. `None` for an empty
/// slice.
#[must_use]
pub fn nearest_site(sites: &[PackedSite], pixel: [f32; 2]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, site) in sites.iter().enumerate() {
        let dx = pixel[0] - site.position[0];
        let dy = pixel[1] - site.position[1];
        let dist = dx * dx + dy * dy;
        match best {
            Some((_, d)) if dist >= d => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Rasterize the diagram for a `width x height` target, visiting pixels in
/// the same 8x8 tiles the compute dispatch uses.
#[must_use]
pub fn rasterize(
    sites: &[PackedSite],
    width: u32,
    height: u32,
    clear_color: [f32; 4],
) -> VoronoiImage {
    let len = width as usize * height as usize;
    let mut image = VoronoiImage {
        width,
        height,
        colors: vec![[0.0; 4]; len],
        owners: vec![0; len],
    };

    let (groups_x, groups_y) = workgroup_count(width, height);
    for gy in 0..groups_y {
        for gx in 0..groups_x {
            for ly in 0..WORKGROUP_SIZE {
                for lx in 0..WORKGROUP_SIZE {
                    let (x, y) = (gx * WORKGROUP_SIZE + lx, gy * WORKGROUP_SIZE + ly);
                    if x >= width || y >= height {
                        continue;
                    }
                    let owner = nearest_site(sites, [x as f32, y as f32]);
                    let i = image.index(x, y);
                    image.colors[i] = owner.map_or(clear_color, |o| sites[o].color);
                    image.owners[i] = owner.map_or(NO_OWNER, |o| o as u32);
                }
            }
        }
    }
    image
}

/// Blend `frame` (row-major, same size as `image`) with the owning site's
/// color and darken cell borders.
///
/// A pixel is a border pixel when its right or lower neighbour (clamped at
/// the image edge) has a different owner.
#[must_use]
pub fn tint(
    image: &VoronoiImage,
    sites: &[PackedSite],
    frame: &[[f32; 4]],
    options: &PostProcessingOptions,
) -> Vec<[f32; 4]> {
    let mix = |a: [f32; 3], b: [f32; 3], t: f32| -> [f32; 3] {
        [
            a[0] * (1.0 - t) + b[0] * t,
            a[1] * (1.0 - t) + b[1] * t,
            a[2] * (1.0 - t) + b[2] * t,
        ]
    };
    let rgb = |c: [f32; 4]| [c[0], c[1], c[2]];

    let (w, h) = (image.width, image.height);
    let mut out = Vec::with_capacity(frame.len());
    for y in 0..h {
        for x in 0..w {
            let owner = image.owner(x, y);
            let source = rgb(frame[image.index(x, y)]);
            let mut color = match sites.get(owner as usize) {
                Some(site) if owner != NO_OWNER => {
                    mix(source, rgb(site.color), options.tint_strength)
                }
                _ => source,
            };
            let right = image.owner((x + 1).min(w - 1), y);
            let below = image.owner(x, (y + 1).min(h - 1));
            if right != owner || below != owner {
                color = mix(color, rgb(options.border_color), options.border_strength);
            }
            out.push([color[0], color[1], color[2], 1.0]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    const CLEAR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

    fn three_corners() -> Vec<PackedSite> {
        vec![
            PackedSite::new([10.0, 10.0], RED),
            PackedSite::new([500.0, 10.0], GREEN),
            PackedSite::new([10.0, 500.0], BLUE),
        ]
    }

    #[test]
    fn three_site_corners() {
        let image = rasterize(&three_corners(), 512, 512, CLEAR);
        assert_eq!(image.color(0, 0), RED);
        assert_eq!(image.color(511, 0), GREEN);
        assert_eq!(image.color(0, 511), BLUE);
        // Equidistant from all three; the lowest index wins.
        assert_eq!(image.owner(255, 255), 0);
        assert_eq!(image.color(255, 255), RED);
    }

    #[test]
    fn every_pixel_is_owned_by_its_strictly_nearest_site() {
        let sites: Vec<_> = [[3.5, 7.0], [20.0, 2.0], [11.0, 19.0], [28.0, 25.0]]
            .into_iter()
            .map(|p| PackedSite::new(p, RED))
            .collect();
        let image = rasterize(&sites, 33, 29, CLEAR);
        for y in 0..29 {
            for x in 0..33 {
                let d = |s: &PackedSite| {
                    let (dx, dy) = (x as f32 - s.position[0], y as f32 - s.position[1]);
                    dx * dx + dy * dy
                };
                let owner = image.owner(x, y) as usize;
                for (i, s) in sites.iter().enumerate() {
                    if i < owner {
                        assert!(d(s) > d(&sites[owner]), "({x},{y}) lost tie to {i}");
                    } else {
                        assert!(d(s) >= d(&sites[owner]));
                    }
                }
            }
        }
    }

    #[test]
    fn coincident_sites_resolve_to_the_lowest_index() {
        let sites = vec![
            PackedSite::new([4.0, 4.0], GREEN),
            PackedSite::new([2.0, 2.0], RED),
            PackedSite::new([2.0, 2.0], BLUE),
        ];
        assert_eq!(nearest_site(&sites, [2.0, 2.0]), Some(1));
        assert_eq!(nearest_site(&sites, [0.0, 0.0]), Some(1));
        assert_eq!(nearest_site(&[], [0.0, 0.0]), None);
    }

    #[test]
    fn rasterizing_twice_is_bit_identical() {
        let sites = three_corners();
        let a = rasterize(&sites, 97, 61, CLEAR);
        let b = rasterize(&sites, 97, 61, CLEAR);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_sites_clear_every_pixel() {
        let clear = [0.1, 0.2, 0.3, 1.0];
        let image = rasterize(&[], 13, 9, clear);
        assert!(image.colors.iter().all(|&c| c == clear));
        assert!(image.owners.iter().all(|&o| o == NO_OWNER));
    }

    #[test]
    fn tiles_cover_targets_that_are_not_a_multiple_of_eight() {
        let image = rasterize(&three_corners(), 13, 9, CLEAR);
        assert_eq!(image.owners.len(), 13 * 9);
        assert!(image.owners.iter().all(|&o| o != NO_OWNER));
    }

    #[test]
    fn tint_blends_inside_cells_and_darkens_borders() {
        let sites = vec![
            PackedSite::new([0.0, 0.0], RED),
            PackedSite::new([7.0, 0.0], BLUE),
        ];
        let image = rasterize(&sites, 8, 1, CLEAR);
        let frame = vec![[1.0, 1.0, 1.0, 1.0]; 8];
        let options = PostProcessingOptions {
            tint_strength: 0.5,
            border_strength: 1.0,
            border_color: [0.0, 0.0, 0.0, 1.0],
        };
        let out = tint(&image, &sites, &frame, &options);

        assert_eq!(out[0], [1.0, 0.5, 0.5, 1.0]);
        assert_eq!(out[7], [0.5, 0.5, 1.0, 1.0]);
        // Pixel 3 belongs to site 0 and its right neighbour to site 1.
        assert_eq!(image.owner(3, 0), 0);
        assert_eq!(image.owner(4, 0), 1);
        assert_eq!(out[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn tint_passes_unowned_pixels_through() {
        let image = rasterize(&[], 2, 2, CLEAR);
        let frame = vec![[0.25, 0.5, 0.75, 1.0]; 4];
        let out = tint(&image, &[], &frame, &PostProcessingOptions::default());
        assert!(out.iter().all(|&c| c == [0.25, 0.5, 0.75, 1.0]));
    }
}
