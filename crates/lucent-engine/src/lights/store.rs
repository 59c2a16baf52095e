use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::config::LightingConfig;
use crate::error::LightCountError;

use super::color::hue_to_rgb;
use super::layout::{light_set_size_bytes, GpuLight, LightSetHeader, LIGHT_SET_HEADER_BYTES};

/// Host-side light set: a fixed-capacity record array plus the active count.
///
/// This is the canonical copy of the light-set buffer. Its byte image
/// ([`LightSet::to_bytes`]) is exactly what the kernels bind: a 16-byte header
/// followed by `capacity` packed records. Only the first `num_lights` records
/// are live; the rest keep their colors so growing the count needs no upload.
#[derive(Debug, Clone)]
pub struct LightSet {
    records: Vec<GpuLight>,
    num_lights: usize,
    header_dirty: bool,
}

impl LightSet {
    /// Allocates `capacity` records with random hues scaled by `intensity`.
    ///
    /// Positions start zeroed; the motion step sets them before first use.
    pub fn new(capacity: usize, intensity: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let records = (0..capacity)
            .map(|_| {
                let color = hue_to_rgb(rng.random_range(0.0..1.0f32)) * intensity;
                GpuLight::with_color(color.to_array())
            })
            .collect();

        Self {
            records,
            num_lights: 0,
            header_dirty: true,
        }
    }

    /// Builds the store described by `config`, with its initial light count.
    pub fn from_config(config: &LightingConfig) -> Self {
        let seed = config.color_seed.unwrap_or_else(wall_clock_seed);
        let mut set = Self::new(
            config.max_num_lights as usize,
            config.light_intensity,
            seed,
        );
        // validate() guarantees the initial count fits.
        set.num_lights = (config.initial_num_lights as usize).min(set.capacity());
        set
    }

    /// Maximum number of records.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Number of active records.
    #[inline]
    pub fn num_lights(&self) -> usize {
        self.num_lights
    }

    /// Sets the active light count.
    ///
    /// On error the previous count is kept. On success the header is marked
    /// for upload before the next kernel reads it.
    pub fn set_active_count(&mut self, n: usize) -> Result<(), LightCountError> {
        if n > self.capacity() {
            return Err(LightCountError::OutOfRange {
                requested: n,
                capacity: self.capacity(),
            });
        }

        if n != self.num_lights {
            self.num_lights = n;
            self.header_dirty = true;
        }
        Ok(())
    }

    /// The header as it will be uploaded.
    #[inline]
    pub fn header(&self) -> LightSetHeader {
        LightSetHeader::new(self.num_lights as u32)
    }

    /// All records, active and inactive.
    #[inline]
    pub fn records(&self) -> &[GpuLight] {
        &self.records
    }

    /// The active prefix.
    #[inline]
    pub fn active(&self) -> &[GpuLight] {
        &self.records[..self.num_lights]
    }

    /// Mutable access to the active prefix.
    #[inline]
    pub fn active_mut(&mut self) -> &mut [GpuLight] {
        &mut self.records[..self.num_lights]
    }

    /// Returns whether the header changed since the last call, and clears the flag.
    pub fn take_header_dirty(&mut self) -> bool {
        std::mem::take(&mut self.header_dirty)
    }

    /// Size in bytes of the full buffer image.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        light_set_size_bytes(self.capacity())
    }

    /// Full buffer image: header followed by every record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size_bytes());
        bytes.extend_from_slice(bytemuck::bytes_of(&self.header()));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.records));
        bytes
    }

    /// Replaces the record array from a buffer image read back from the GPU.
    ///
    /// The header in `bytes` is ignored; the host count stays authoritative.
    pub fn copy_records_from_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        anyhow::ensure!(
            bytes.len() == self.size_bytes(),
            "light set image is {} bytes, expected {}",
            bytes.len(),
            self.size_bytes()
        );
        let records = &bytes[LIGHT_SET_HEADER_BYTES..];
        // Readback data has no alignment guarantee; copy record by record.
        for (dst, chunk) in self
            .records
            .iter_mut()
            .zip(records.chunks_exact(std::mem::size_of::<GpuLight>()))
        {
            *dst = bytemuck::pod_read_unaligned(chunk);
        }
        Ok(())
    }
}

fn wall_clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(capacity: usize) -> LightSet {
        LightSet::new(capacity, 0.1, 7)
    }

    #[test]
    fn every_count_in_range_is_accepted() {
        let mut lights = set(64);
        for n in 0..=64 {
            lights.set_active_count(n).unwrap();
            assert_eq!(lights.header().num_lights, n as u32);
            let bytes = lights.to_bytes();
            let header: LightSetHeader = bytemuck::pod_read_unaligned(&bytes[..16]);
            assert_eq!(header.num_lights, n as u32);
        }
    }

    #[test]
    fn count_over_capacity_is_rejected_and_state_kept() {
        let mut lights = set(64);
        lights.set_active_count(10).unwrap();
        lights.take_header_dirty();

        let err = lights.set_active_count(65).unwrap_err();
        assert_eq!(
            err,
            LightCountError::OutOfRange {
                requested: 65,
                capacity: 64
            }
        );
        assert_eq!(lights.num_lights(), 10);
        assert_eq!(lights.header().num_lights, 10);
        assert!(!lights.take_header_dirty());
    }

    #[test]
    fn count_change_marks_header_dirty() {
        let mut lights = set(8);
        lights.take_header_dirty();
        lights.set_active_count(3).unwrap();
        assert!(lights.take_header_dirty());
        assert!(!lights.take_header_dirty());
        lights.set_active_count(3).unwrap();
        assert!(!lights.take_header_dirty());
    }

    #[test]
    fn colors_are_scaled_by_intensity_and_positions_zeroed() {
        let lights = LightSet::new(32, 0.1, 3);
        for light in lights.records() {
            assert_eq!(light.position, [0.0; 3]);
            let max = light.color.iter().copied().fold(0.0f32, f32::max);
            assert!((max - 0.1).abs() < 1e-6, "brightest channel should be 1 * intensity");
        }
    }

    #[test]
    fn same_seed_same_colors() {
        assert_eq!(LightSet::new(16, 0.1, 42).records(), LightSet::new(16, 0.1, 42).records());
    }

    #[test]
    fn image_has_header_then_records() {
        let mut lights = set(4);
        lights.set_active_count(2).unwrap();
        let bytes = lights.to_bytes();
        assert_eq!(bytes.len(), 16 + 4 * 32);
        let first: GpuLight = bytemuck::pod_read_unaligned(&bytes[16..48]);
        assert_eq!(first, lights.records()[0]);
    }

    #[test]
    fn copy_records_round_trips_positions() {
        let mut lights = set(4);
        lights.set_active_count(4).unwrap();
        let mut other = lights.clone();
        other.active_mut()[2].position = [1.0, 2.0, 3.0];
        lights.copy_records_from_bytes(&other.to_bytes()).unwrap();
        assert_eq!(lights.records()[2].position, [1.0, 2.0, 3.0]);
        assert!(lights.copy_records_from_bytes(&[0u8; 8]).is_err());
    }

    #[test]
    fn from_config_uses_initial_count() {
        let config = LightingConfig {
            max_num_lights: 100,
            initial_num_lights: 10,
            color_seed: Some(1),
            ..Default::default()
        };
        let lights = LightSet::from_config(&config);
        assert_eq!(lights.capacity(), 100);
        assert_eq!(lights.num_lights(), 10);
    }
}
