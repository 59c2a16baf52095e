use glam::Vec3;

/// Converts a hue in `[0, 1]` to a desaturated RGB color.
///
/// The fully saturated hue is blended 80% of the way from white, so every light
/// keeps some white in it.
pub fn hue_to_rgb(h: f32) -> Vec3 {
    let f = |n: f32| {
        let k = (n + h * 6.0).rem_euclid(6.0);
        1.0 - k.min(4.0 - k).min(1.0).max(0.0)
    };
    Vec3::ONE.lerp(Vec3::new(f(5.0), f(3.0), f(1.0)), 0.8)
}
