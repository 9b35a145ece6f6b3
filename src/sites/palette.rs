//! Site colors.

use rand::Rng;

/// Convert HSV (all components in `[0, 1]`) to RGB.
#[must_use]
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Uniformly random hue, saturation and value, opaque.
pub fn random_hsv<R: Rng + ?Sized>(rng: &mut R) -> [f32; 4] {
    let [r, g, b] = hsv_to_rgb(
        rng.random_range(0.0..1.0),
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
    );
    [r, g, b, 1.0]
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn primary_hues() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), [0.0, 1.0, 0.0]);
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), [0.0, 0.0, 1.0]);
        assert_eq!(hsv_to_rgb(0.5, 0.0, 0.25), [0.25, 0.25, 0.25]);
    }

    #[test]
    fn random_colors_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..256 {
            let c = random_hsv(&mut rng);
            assert!(c.iter().all(|v| (0.0..=1.0).contains(v)));
            assert_eq!(c[3], 1.0);
        }
    }
}
