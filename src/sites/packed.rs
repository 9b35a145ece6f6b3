//! GPU transfer layout of a site.

/// Byte stride of one [`PackedSite`] in the site storage buffer.
pub const SITE_STRIDE: usize = 2 * 4 + 4 * 4 + 4;

/// One site as the Voronoi kernels read it: screen position, RGBA color and
/// an auxiliary counter.
///
/// Tightly packed to 28 bytes; the WGSL `Site` struct declares seven 4-byte
/// scalars so its array stride matches.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedSite {
    /// Screen-space position in pixels, origin top-left.
    pub position: [f32; 2],
    /// Linear RGBA color of the cell.
    pub color: [f32; 4],
    /// Reserved ownership counter. Always zero; no kernel reads it.
    pub count: i32,
}

impl PackedSite {
    /// Site at `position` with `color` and a zero counter.
    #[must_use]
    pub fn new(position: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            color,
            count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_tightly_packed() {
        assert_eq!(size_of::<PackedSite>(), SITE_STRIDE);
        assert_eq!(SITE_STRIDE, 28);
    }

    #[test]
    fn field_offsets_match_kernel_layout() {
        let site = PackedSite {
            position: [1.0, 2.0],
            color: [3.0, 4.0, 5.0, 6.0],
            count: 7,
        };
        let bytes = bytemuck::bytes_of(&site);
        let word = |i: usize| {
            f32::from_le_bytes([
                bytes[i * 4],
                bytes[i * 4 + 1],
                bytes[i * 4 + 2],
                bytes[i * 4 + 3],
            ])
        };
        for (i, expected) in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0].iter().enumerate() {
            assert_eq!(word(i), *expected);
        }
        assert_eq!(i32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]), 7);
    }
}
