use bytemuck::{Pod, Zeroable};

/// Bytes reserved in front of the record array: `num_lights` plus padding.
pub const LIGHT_SET_HEADER_BYTES: usize = 16;

/// Float slots per record. `vec3f` is 16-byte aligned in storage buffers, so
/// position and color each take four.
pub const FLOATS_PER_LIGHT: usize = 8;

/// One light record as laid out in the light-set storage buffer (32 bytes).
///
/// Matches `struct Light { pos: vec3f, color: vec3f }` in WGSL.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

impl GpuLight {
    pub const fn with_color(color: [f32; 3]) -> Self {
        Self {
            position: [0.0; 3],
            _pad0: 0.0,
            color,
            _pad1: 0.0,
        }
    }
}

/// Light-set header (16 bytes). Only `num_lights` is read by kernels.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct LightSetHeader {
    pub num_lights: u32,
    pub _pad: [u32; 3],
}

impl LightSetHeader {
    pub const fn new(num_lights: u32) -> Self {
        Self {
            num_lights,
            _pad: [0; 3],
        }
    }
}

/// Total light-set buffer size for `capacity` records.
pub const fn light_set_size_bytes(capacity: usize) -> usize {
    LIGHT_SET_HEADER_BYTES + capacity * std::mem::size_of::<GpuLight>()
}

/// Byte offset of record `index` inside the light-set buffer.
pub const fn light_record_offset(index: usize) -> usize {
    LIGHT_SET_HEADER_BYTES + index * std::mem::size_of::<GpuLight>()
}

const _: () = assert!(std::mem::size_of::<GpuLight>() == FLOATS_PER_LIGHT * 4);
const _: () = assert!(std::mem::size_of::<LightSetHeader>() == LIGHT_SET_HEADER_BYTES);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fields_sit_on_16_byte_boundaries() {
        assert_eq!(std::mem::offset_of!(GpuLight, position), 0);
        assert_eq!(std::mem::offset_of!(GpuLight, color), 16);
        assert_eq!(std::mem::size_of::<GpuLight>() % 16, 0);
    }

    #[test]
    fn buffer_size_is_header_plus_records() {
        assert_eq!(light_set_size_bytes(0), 16);
        assert_eq!(light_set_size_bytes(5000), 16 + 5000 * 32);
        assert_eq!(light_record_offset(1), 48);
    }
}
