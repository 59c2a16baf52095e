//! Host form of the light motion kernel.
//!
//! `move_lights.cs.wgsl` computes the same function on the GPU. Both must stay
//! in sync: the hash, the light volume and the orbit constants are shared.

use std::f32::consts::TAU;

use glam::Vec3;

use super::store::LightSet;

/// Lower corner of the volume light base points are drawn from.
pub const LIGHT_VOLUME_MIN: Vec3 = Vec3::new(-14.0, 0.0, -6.0);

/// Upper corner of the volume light base points are drawn from.
pub const LIGHT_VOLUME_MAX: Vec3 = Vec3::new(14.0, 20.0, 6.0);

/// Orbit radius in the XZ plane.
pub const ORBIT_RADIUS: f32 = 1.5;

/// Vertical bob amplitude.
pub const BOB_AMPLITUDE: f32 = 2.0;

/// PCG output permutation, as used by the kernel.
#[inline]
pub fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// Hash mapped to `[0, 1]`.
#[inline]
pub fn hash_unit(input: u32) -> f32 {
    pcg_hash(input) as f32 / u32::MAX as f32
}

/// Position of light `index` at `time` seconds.
pub fn light_position(index: u32, time: f32) -> Vec3 {
    let seed = index.wrapping_mul(4);
    let t = Vec3::new(
        hash_unit(seed),
        hash_unit(seed.wrapping_add(1)),
        hash_unit(seed.wrapping_add(2)),
    );
    let base = LIGHT_VOLUME_MIN + (LIGHT_VOLUME_MAX - LIGHT_VOLUME_MIN) * t;

    let r = hash_unit(seed.wrapping_add(3));
    let phase = r * TAU;
    let speed = 0.3 + 0.7 * r;
    let angle = time * speed + phase;

    base + Vec3::new(
        angle.cos() * ORBIT_RADIUS,
        (angle * 1.7 + phase).sin() * BOB_AMPLITUDE,
        angle.sin() * ORBIT_RADIUS,
    )
}

/// Rewrites the position of every active light for `time`.
///
/// Colors and records past the active count are left alone.
pub fn move_lights(lights: &mut LightSet, time: f32) {
    for (i, light) in lights.active_mut().iter_mut().enumerate() {
        light.position = light_position(i as u32, time).to_array();
    }
}

/// Workgroups needed to cover `num_lights` with groups of `workgroup_size`.
///
/// Zero lights need zero workgroups; the dispatch is skipped entirely.
#[inline]
pub fn workgroup_count(num_lights: usize, workgroup_size: u32) -> u32 {
    (num_lights as u32).div_ceil(workgroup_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lights(n: usize) -> LightSet {
        let mut set = LightSet::new(16, 0.1, 11);
        set.set_active_count(n).unwrap();
        set
    }

    #[test]
    fn zero_lights_leave_the_buffer_untouched() {
        let mut set = lights(0);
        let before = set.to_bytes();
        move_lights(&mut set, 3.5);
        assert_eq!(set.to_bytes(), before);
    }

    #[test]
    fn only_the_active_prefix_moves() {
        let mut set = lights(5);
        let before = set.records().to_vec();
        move_lights(&mut set, 1.25);

        for (i, (old, new)) in before.iter().zip(set.records()).enumerate() {
            assert_eq!(old.color, new.color, "color of light {i} changed");
            if i < 5 {
                assert_ne!(old.position, new.position, "light {i} did not move");
            } else {
                assert_eq!(old.position, new.position, "inactive light {i} moved");
            }
        }
    }

    #[test]
    fn positions_are_deterministic() {
        assert_eq!(light_position(17, 2.0), light_position(17, 2.0));
        assert_ne!(light_position(17, 2.0), light_position(18, 2.0));
    }

    #[test]
    fn positions_stay_near_the_light_volume() {
        let slack = Vec3::new(ORBIT_RADIUS, BOB_AMPLITUDE, ORBIT_RADIUS) + 1e-3;
        for i in 0..200 {
            for t in [0.0, 0.7, 13.0, 250.0] {
                let p = light_position(i, t);
                assert!(p.cmpge(LIGHT_VOLUME_MIN - slack).all(), "{p:?}");
                assert!(p.cmple(LIGHT_VOLUME_MAX + slack).all(), "{p:?}");
            }
        }
    }

    #[test]
    fn hash_matches_known_values() {
        assert_eq!(pcg_hash(0), 129_708_002);
        assert!((0.0..=1.0).contains(&hash_unit(u32::MAX)));
    }

    #[test]
    fn workgroup_count_rounds_up() {
        assert_eq!(workgroup_count(0, 128), 0);
        assert_eq!(workgroup_count(1, 128), 1);
        assert_eq!(workgroup_count(128, 128), 1);
        assert_eq!(workgroup_count(129, 128), 2);
        assert_eq!(workgroup_count(5000, 128), 40);
    }
}
