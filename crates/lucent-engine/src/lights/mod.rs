//! Light set store.
//!
//! Owns the packed light records and their binary layout, plus the host form of
//! the motion kernel. GPU residency lives in `render::LightingResources`.

mod color;
mod layout;
mod motion;
mod store;

pub use color::hue_to_rgb;
pub use layout::{
    light_record_offset, light_set_size_bytes, GpuLight, LightSetHeader, FLOATS_PER_LIGHT,
    LIGHT_SET_HEADER_BYTES,
};
pub use motion::{
    hash_unit, light_position, move_lights, pcg_hash, workgroup_count, BOB_AMPLITUDE,
    LIGHT_VOLUME_MAX, LIGHT_VOLUME_MIN, ORBIT_RADIUS,
};
pub use store::LightSet;
