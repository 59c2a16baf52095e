//! Blocking buffer readback and GPU-vs-host cluster validation.
//!
//! Used by tests and by the viewer's validation key; never on the frame path.

use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::camera::CameraUniforms;
use crate::cluster::{assign_clusters, AssignStats, ClusterSet};

use super::lighting::LightingResources;

/// Copies `size` bytes from the start of `buffer` and waits for them.
///
/// `buffer` needs `COPY_SRC`. Everything already submitted to `queue` is
/// visible in the result.
pub fn read_buffer(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    size: u64,
) -> Result<Vec<u8>> {
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lucent readback staging"),
        size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("lucent readback encoder"),
    });
    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .context("device poll failed during readback")?;
    rx.recv()
        .context("map_async callback channel dropped")?
        .context("failed to map readback buffer")?;

    let data = slice.get_mapped_range().to_vec();
    staging.unmap();
    Ok(data)
}

/// Current contents of the cluster buffer.
pub fn read_cluster_set(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    lighting: &LightingResources,
) -> Result<ClusterSet> {
    let grid = *lighting.grid();
    let bytes = read_buffer(device, queue, lighting.cluster_buffer(), grid.buffer_size_bytes())?;
    ClusterSet::from_bytes(grid, &bytes)
}

/// Pulls the GPU light records into the host copy. The host count stays as is.
pub fn sync_light_positions(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    lighting: &mut LightingResources,
) -> Result<()> {
    let size = lighting.lights().size_bytes() as u64;
    let bytes = read_buffer(device, queue, lighting.light_buffer(), size)?;
    lighting.lights_mut().copy_records_from_bytes(&bytes)
}

/// Outcome of comparing the GPU cluster buffer with the host assignment.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub total_clusters: usize,
    pub gpu_assignments: u64,
    pub host: AssignStats,
    /// Cells whose count or index list differ.
    pub mismatched_cells: Vec<usize>,
    /// GPU counts above the per-cluster capacity. Always zero for a
    /// well-formed buffer.
    pub overfull_cells: usize,
}

impl ValidationReport {
    pub fn is_exact(&self) -> bool {
        self.mismatched_cells.is_empty() && self.overfull_cells == 0
    }

    /// Share of cells that differ.
    pub fn mismatch_ratio(&self) -> f32 {
        if self.total_clusters == 0 {
            return 0.0;
        }
        self.mismatched_cells.len() as f32 / self.total_clusters as f32
    }
}

/// Reads back lights and clusters, reruns the assignment on the host with the
/// camera the GPU used, and compares cell by cell.
///
/// Cells on a bounds edge may differ by float rounding between backends, so
/// callers should judge `mismatch_ratio` rather than demand exactness.
pub fn validate_clusters(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    lighting: &mut LightingResources,
    camera: &CameraUniforms,
) -> Result<ValidationReport> {
    sync_light_positions(device, queue, lighting)?;
    let gpu = read_cluster_set(device, queue, lighting)?;

    let grid = *lighting.grid();
    let mut host = ClusterSet::new(grid);
    let stats = assign_clusters(camera, lighting.lights(), lighting.config().light_radius, &mut host);

    let overfull_cells = (0..grid.total_clusters())
        .filter(|&cell| gpu.count(cell) > grid.max_lights_per_cluster())
        .count();

    let report = ValidationReport {
        total_clusters: grid.total_clusters(),
        gpu_assignments: gpu.total_assignments(),
        host: stats,
        mismatched_cells: gpu.diff_cells(&host),
        overfull_cells,
    };

    if report.is_exact() {
        log::info!(
            "cluster validation: exact ({} assignments, {:.1}% cells occupied, {} truncated cells)",
            report.gpu_assignments,
            stats.occupancy(report.total_clusters) * 100.0,
            stats.truncated_cells
        );
    } else {
        log::warn!(
            "cluster validation: {} of {} cells differ, gpu {} vs host {} assignments, {} overfull",
            report.mismatched_cells.len(),
            report.total_clusters,
            report.gpu_assignments,
            stats.assignments,
            report.overfull_cells
        );
    }
    Ok(report)
}
