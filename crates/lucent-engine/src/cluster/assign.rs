//! Host form of the cluster assignment kernel.
//!
//! Same inputs, same buffer image as `clustering.cs.wgsl`: lights are tested in
//! ascending index order and each cell keeps the first
//! `max_lights_per_cluster` hits.

use glam::Vec3;

use crate::camera::CameraUniforms;
use crate::lights::LightSet;

use super::bounds::cell_bounds;
use super::set::ClusterSet;

/// Summary of one assignment run.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AssignStats {
    /// Sum of stored counts.
    pub assignments: u64,
    /// Cells with at least one light.
    pub occupied_cells: usize,
    /// Cells that had more intersecting lights than slots.
    pub truncated_cells: usize,
    /// Largest intersecting-light count seen in any cell, before clamping.
    pub max_cell_lights: u32,
}

impl AssignStats {
    /// Fraction of cells holding at least one light.
    pub fn occupancy(&self, total_clusters: usize) -> f32 {
        if total_clusters == 0 {
            return 0.0;
        }
        self.occupied_cells as f32 / total_clusters as f32
    }
}

/// Assigns the active lights of `lights` to the cells of `out`.
///
/// Every count is rewritten; the dimension header is left as is. Output depends
/// only on `camera`, the active light positions and `radius`.
pub fn assign_clusters(
    camera: &CameraUniforms,
    lights: &LightSet,
    radius: f32,
    out: &mut ClusterSet,
) -> AssignStats {
    let grid = *out.grid();
    let view_positions: Vec<Vec3> = lights
        .active()
        .iter()
        .map(|l| camera.view.transform_point3(Vec3::from_array(l.position)))
        .collect();

    out.clear_counts();

    let mut stats = AssignStats::default();
    for cell in 0..grid.total_clusters() {
        let bounds = cell_bounds(
            &grid,
            &camera.inv_proj,
            camera.near,
            camera.far,
            grid.cell_coords(cell),
        );

        let mut hits = 0u32;
        for (i, center) in view_positions.iter().enumerate() {
            if bounds.intersects_sphere(*center, radius) {
                hits += 1;
                out.push_light(cell, i as u32);
            }
        }

        stats.max_cell_lights = stats.max_cell_lights.max(hits);
        if hits > 0 {
            stats.occupied_cells += 1;
        }
        if hits > grid.max_lights_per_cluster() {
            stats.truncated_cells += 1;
        }
    }
    stats.assignments = out.total_assignments();

    if stats.truncated_cells > 0 {
        log::debug!(
            "cluster assignment: {} cells truncated (max {} lights in one cell, capacity {})",
            stats.truncated_cells,
            stats.max_cell_lights,
            grid.max_lights_per_cluster()
        );
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::cluster::ClusterGrid;
    use crate::lights::move_lights;

    fn camera() -> CameraUniforms {
        Camera::new(Vec3::new(0.0, 6.0, 18.0), 0.0, -0.15).uniforms([1280, 720])
    }

    fn lights_at(positions: &[Vec3]) -> LightSet {
        let mut set = LightSet::new(positions.len(), 0.1, 1);
        set.set_active_count(positions.len()).unwrap();
        for (light, p) in set.active_mut().iter_mut().zip(positions) {
            light.position = p.to_array();
        }
        set
    }

    #[test]
    fn identical_inputs_give_identical_buffers() {
        let grid = ClusterGrid::new([16, 9, 24], 100);
        let mut lights = LightSet::new(64, 0.1, 5);
        lights.set_active_count(64).unwrap();
        move_lights(&mut lights, 4.0);

        let mut a = ClusterSet::new(grid);
        let mut b = ClusterSet::new(grid);
        let sa = assign_clusters(&camera(), &lights, 2.0, &mut a);
        let sb = assign_clusters(&camera(), &lights, 2.0, &mut b);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(sa, sb);
        assert!(sa.assignments > 0);
    }

    #[test]
    fn full_cells_keep_the_lowest_indices() {
        let grid = ClusterGrid::new([4, 4, 4], 2);
        // Five lights stacked on the view axis, well inside the frustum.
        let cam = Camera::new(Vec3::ZERO, 0.0, 0.0);
        let uniforms = cam.uniforms([800, 800]);
        let lights = lights_at(&[Vec3::new(0.0, 0.0, -5.0); 5]);

        let mut set = ClusterSet::new(grid);
        let stats = assign_clusters(&uniforms, &lights, 2.0, &mut set);

        assert!(stats.truncated_cells > 0);
        assert_eq!(stats.max_cell_lights, 5);
        for cell in 0..grid.total_clusters() {
            assert!(set.count(cell) <= 2);
            if set.count(cell) > 0 {
                assert_eq!(set.indices(cell), &[0, 1]);
            }
        }
    }

    #[test]
    fn reassignment_overwrites_previous_counts() {
        let grid = ClusterGrid::new([4, 4, 4], 8);
        let cam = Camera::new(Vec3::ZERO, 0.0, 0.0).uniforms([800, 800]);
        let mut set = ClusterSet::new(grid);

        assign_clusters(&cam, &lights_at(&[Vec3::new(0.0, 0.0, -5.0)]), 2.0, &mut set);
        assert!(set.total_assignments() > 0);

        // Behind the camera: no cell can see it.
        let stats = assign_clusters(&cam, &lights_at(&[Vec3::new(0.0, 0.0, 50.0)]), 2.0, &mut set);
        assert_eq!(stats.assignments, 0);
        assert_eq!(set.total_assignments(), 0);
        assert_eq!(set.header(), [4, 4, 4]);
    }

    #[test]
    fn counts_sum_within_bound() {
        let grid = ClusterGrid::new([16, 9, 24], 100);
        let mut lights = LightSet::new(5000, 0.1, 9);
        lights.set_active_count(10).unwrap();
        move_lights(&mut lights, 0.0);

        let mut set = ClusterSet::new(grid);
        let stats = assign_clusters(&camera(), &lights, 2.0, &mut set);
        assert!(stats.assignments <= 10 * grid.total_clusters() as u64);
        assert_eq!(stats.truncated_cells, 0);
        for cell in 0..grid.total_clusters() {
            assert!(set.indices(cell).iter().all(|&i| i < 10));
        }
    }

    #[test]
    fn no_lights_no_assignments() {
        let grid = ClusterGrid::new([4, 4, 4], 4);
        let lights = LightSet::new(16, 0.1, 2);
        let mut set = ClusterSet::new(grid);
        let stats = assign_clusters(&camera(), &lights, 2.0, &mut set);
        assert_eq!(stats, AssignStats::default());
        assert_eq!(stats.occupancy(grid.total_clusters()), 0.0);
    }

    #[test]
    fn occupancy_is_the_share_of_lit_cells() {
        let stats = AssignStats {
            occupied_cells: 16,
            ..Default::default()
        };
        assert_eq!(stats.occupancy(64), 0.25);
        assert_eq!(stats.occupancy(0), 0.0);
    }
}
