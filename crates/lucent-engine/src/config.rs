use anyhow::Result;

use crate::cluster::ClusterGrid;

/// Clustering and light-set parameters.
///
/// Every field is baked into buffer sizes or WGSL constants when
/// `LightingResources` is created. Changing one means building new resources;
/// nothing here is hot-swappable mid-frame.
#[derive(Debug, Clone)]
pub struct LightingConfig {
    /// Cluster grid dimensions `(X, Y, Z)`: screen tiles in X/Y, depth slices in Z.
    pub grid_dims: [u32; 3],

    /// Capacity of each cluster's light-index list.
    pub max_lights_per_cluster: u32,

    /// Capacity of the light set (records allocated up front).
    pub max_num_lights: u32,

    /// Active light count at startup.
    pub initial_num_lights: u32,

    /// Scale applied to the random hue when lights are created.
    pub light_intensity: f32,

    /// Influence radius of every light, in world units.
    pub light_radius: f32,

    /// Workgroup extent of the clustering kernel, per grid axis.
    pub cluster_workgroup_size: [u32; 3],

    /// Workgroup size of the motion kernel.
    pub move_lights_workgroup_size: u32,

    /// Seed for the light color generator. `None` seeds from the wall clock.
    pub color_seed: Option<u64>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            grid_dims: [16, 9, 24],
            max_lights_per_cluster: 100,
            max_num_lights: 5000,
            initial_num_lights: 10,
            light_intensity: 0.1,
            light_radius: 2.0,
            cluster_workgroup_size: [4, 4, 4],
            move_lights_workgroup_size: 128,
            color_seed: None,
        }
    }
}

impl LightingConfig {
    /// The cluster grid described by this configuration.
    pub fn grid(&self) -> ClusterGrid {
        ClusterGrid::new(self.grid_dims, self.max_lights_per_cluster)
    }

    /// Size in bytes of the light-set buffer (header + all records).
    pub fn light_set_size_bytes(&self) -> u64 {
        crate::lights::light_set_size_bytes(self.max_num_lights as usize) as u64
    }

    /// Checks internal consistency. Device limits are checked separately by
    /// [`LightingConfig::validate_for_device`].
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.grid_dims.iter().all(|&d| d > 0),
            "cluster grid dimensions must be non-zero, got {:?}",
            self.grid_dims
        );
        anyhow::ensure!(
            self.max_lights_per_cluster > 0,
            "max_lights_per_cluster must be non-zero"
        );
        anyhow::ensure!(
            self.initial_num_lights <= self.max_num_lights,
            "initial light count {} exceeds capacity {}",
            self.initial_num_lights,
            self.max_num_lights
        );
        anyhow::ensure!(
            self.cluster_workgroup_size.iter().all(|&d| d > 0)
                && self.move_lights_workgroup_size > 0,
            "workgroup sizes must be non-zero"
        );
        anyhow::ensure!(
            self.light_radius.is_finite() && self.light_radius > 0.0,
            "light radius must be positive and finite"
        );
        Ok(())
    }

    /// Checks buffer sizes and workgroup extents against device limits.
    pub fn validate_for_device(&self, limits: &wgpu::Limits) -> Result<()> {
        self.validate()?;

        let cluster_bytes = self.grid().buffer_size_bytes();
        anyhow::ensure!(
            cluster_bytes <= u64::from(limits.max_storage_buffer_binding_size),
            "cluster buffer needs {cluster_bytes} bytes, device allows {}",
            limits.max_storage_buffer_binding_size
        );

        let light_bytes = self.light_set_size_bytes();
        anyhow::ensure!(
            light_bytes <= u64::from(limits.max_storage_buffer_binding_size),
            "light set buffer needs {light_bytes} bytes, device allows {}",
            limits.max_storage_buffer_binding_size
        );

        let [wx, wy, wz] = self.cluster_workgroup_size;
        anyhow::ensure!(
            wx <= limits.max_compute_workgroup_size_x
                && wy <= limits.max_compute_workgroup_size_y
                && wz <= limits.max_compute_workgroup_size_z
                && u64::from(wx) * u64::from(wy) * u64::from(wz)
                    <= u64::from(limits.max_compute_invocations_per_workgroup),
            "cluster workgroup {:?} exceeds device limits",
            self.cluster_workgroup_size
        );
        anyhow::ensure!(
            self.move_lights_workgroup_size <= limits.max_compute_workgroup_size_x
                && self.move_lights_workgroup_size
                    <= limits.max_compute_invocations_per_workgroup,
            "motion workgroup size {} exceeds device limits",
            self.move_lights_workgroup_size
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        LightingConfig::default().validate().unwrap();
    }

    #[test]
    fn default_buffers_fit_default_limits() {
        let config = LightingConfig::default();
        let limits = wgpu::Limits::default();
        config.validate_for_device(&limits).unwrap();
    }

    #[test]
    fn zero_grid_axis_is_rejected() {
        let config = LightingConfig {
            grid_dims: [16, 0, 24],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn initial_count_over_capacity_is_rejected() {
        let config = LightingConfig {
            max_num_lights: 4,
            initial_num_lights: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_cluster_workgroup_is_rejected() {
        let config = LightingConfig {
            cluster_workgroup_size: [16, 16, 16],
            ..Default::default()
        };
        assert!(config.validate_for_device(&wgpu::Limits::default()).is_err());
    }

    #[test]
    fn huge_workgroup_product_is_an_error_not_a_panic() {
        let limits = wgpu::Limits {
            max_compute_workgroup_size_x: u32::MAX,
            max_compute_workgroup_size_y: u32::MAX,
            max_compute_workgroup_size_z: u32::MAX,
            ..wgpu::Limits::default()
        };
        let config = LightingConfig {
            cluster_workgroup_size: [65_536, 65_536, 2],
            ..Default::default()
        };
        assert!(config.validate_for_device(&limits).is_err());
    }
}
