//! Headless end-to-end frames. Every test returns early when no adapter is
//! available (CI without a GPU or software rasterizer).

use glam::Vec3;

use lucent_engine::camera::Camera;
use lucent_engine::device::{FrameSource, FrameTarget, GpuInit, HeadlessGpu};
use lucent_engine::lights::light_position;
use lucent_engine::render::{readback, FrameOrchestrator, StrategyKind};
use lucent_engine::scene::Scene;
use lucent_engine::{FrameError, LightingConfig};

const SIZE: [u32; 2] = [320, 180];

fn headless() -> Option<HeadlessGpu> {
    match HeadlessGpu::new_blocking(SIZE, GpuInit::default()) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping GPU test: {err:#}");
            None
        }
    }
}

fn config() -> LightingConfig {
    LightingConfig {
        color_seed: Some(7),
        ..Default::default()
    }
}

fn camera() -> Camera {
    let mut camera = Camera::default();
    camera.set_viewport(SIZE[0], SIZE[1]);
    camera
}

/// Hands out the headless device but fails every acquisition.
struct LostSurface<'a>(&'a HeadlessGpu);

impl FrameSource for LostSurface<'_> {
    fn device(&self) -> &wgpu::Device {
        self.0.device()
    }

    fn queue(&self) -> &wgpu::Queue {
        self.0.queue()
    }

    fn target_format(&self) -> wgpu::TextureFormat {
        self.0.target_format()
    }

    fn target_size(&self) -> [u32; 2] {
        self.0.target_size()
    }

    fn acquire(&self) -> Result<FrameTarget, wgpu::SurfaceError> {
        Err(wgpu::SurfaceError::Lost)
    }
}

/// Reports a minimized target.
struct Minimized<'a>(&'a HeadlessGpu);

impl FrameSource for Minimized<'_> {
    fn device(&self) -> &wgpu::Device {
        self.0.device()
    }

    fn queue(&self) -> &wgpu::Queue {
        self.0.queue()
    }

    fn target_format(&self) -> wgpu::TextureFormat {
        self.0.target_format()
    }

    fn target_size(&self) -> [u32; 2] {
        [0, 0]
    }

    fn acquire(&self) -> Result<FrameTarget, wgpu::SurfaceError> {
        self.0.acquire()
    }
}

#[test]
fn ten_lights_produce_a_bounded_cluster_buffer() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config(), StrategyKind::ForwardPlus).unwrap();

    let report = orchestrator.render_frame(&gpu, &camera(), &scene, 0.5).unwrap();
    assert_eq!(report.num_lights, 10);
    assert_eq!(report.motion_workgroups, 1);
    assert_eq!(report.cluster_workgroups, [4, 3, 6]);
    assert_eq!(orchestrator.frame_count(), 1);

    let clusters =
        readback::read_cluster_set(gpu.device(), gpu.queue(), orchestrator.lighting()).unwrap();
    let grid = *orchestrator.lighting().grid();
    assert_eq!(clusters.header(), [16, 9, 24]);

    let total = clusters.total_assignments();
    assert!(total <= 10 * grid.total_clusters() as u64);
    for cell in 0..grid.total_clusters() {
        assert!(clusters.count(cell) <= 10);
        assert!(clusters.indices(cell).iter().all(|&i| i < 10));
    }
}

#[test]
fn motion_moves_only_active_lights() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config(), StrategyKind::Naive).unwrap();

    orchestrator.render_frame(&gpu, &camera(), &scene, 2.0).unwrap();

    let size = orchestrator.lighting().lights().size_bytes() as u64;
    let bytes = readback::read_buffer(
        gpu.device(),
        gpu.queue(),
        orchestrator.lighting().light_buffer(),
        size,
    )
    .unwrap();
    let mut host = orchestrator.lighting().lights().clone();
    host.copy_records_from_bytes(&bytes).unwrap();

    for (i, light) in host.records().iter().enumerate() {
        let p = Vec3::from_array(light.position);
        if i < 10 {
            let expected = light_position(i as u32, 2.0);
            assert!((p - expected).length() < 1e-2, "light {i}: {p} vs {expected}");
        } else {
            assert_eq!(p, Vec3::ZERO, "inactive light {i} moved");
        }
    }
}

#[test]
fn every_strategy_renders_with_shared_buffers() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config(), StrategyKind::Naive).unwrap();
    let cluster_bytes = orchestrator.lighting().cluster_buffer().size();

    for (i, kind) in StrategyKind::ALL.into_iter().enumerate() {
        orchestrator.set_strategy(kind);
        let report = orchestrator
            .render_frame(&gpu, &camera(), &scene, i as f32)
            .unwrap();
        assert_eq!(report.strategy, kind);
        assert_eq!(report.frame_index, i as u64);
    }
    assert_eq!(orchestrator.lighting().cluster_buffer().size(), cluster_bytes);
}

#[test]
fn failed_acquisition_aborts_the_frame() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config(), StrategyKind::ClusteredDeferred).unwrap();

    let err = orchestrator
        .render_frame(&LostSurface(&gpu), &camera(), &scene, 0.0)
        .unwrap_err();
    assert!(matches!(err, FrameError::ResourceAcquisition(wgpu::SurfaceError::Lost)));
    assert_eq!(orchestrator.frame_count(), 0);

    let err = orchestrator
        .render_frame(&Minimized(&gpu), &camera(), &scene, 0.0)
        .unwrap_err();
    assert!(matches!(err, FrameError::ZeroSizedTarget));

    // The next good frame goes through.
    orchestrator.render_frame(&gpu, &camera(), &scene, 0.1).unwrap();
    assert_eq!(orchestrator.frame_count(), 1);
}

#[test]
fn light_count_changes_reach_the_gpu() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config(), StrategyKind::ForwardPlus).unwrap();

    assert!(orchestrator.set_active_count(5001).is_err());
    assert_eq!(orchestrator.num_lights(), 10);

    orchestrator.set_active_count(0).unwrap();
    let report = orchestrator.render_frame(&gpu, &camera(), &scene, 1.0).unwrap();
    assert_eq!(report.motion_workgroups, 0);

    let clusters =
        readback::read_cluster_set(gpu.device(), gpu.queue(), orchestrator.lighting()).unwrap();
    assert_eq!(clusters.total_assignments(), 0);

    orchestrator.set_active_count(300).unwrap();
    let report = orchestrator.render_frame(&gpu, &camera(), &scene, 1.0).unwrap();
    assert_eq!(report.motion_workgroups, 3);
}

#[test]
fn gpu_clusters_agree_with_host_assignment() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config(), StrategyKind::ForwardPlus).unwrap();
    orchestrator.set_active_count(200).unwrap();

    assert!(orchestrator.validate_clusters(&gpu).is_err());

    orchestrator.render_frame(&gpu, &camera(), &scene, 3.0).unwrap();
    let report = orchestrator.validate_clusters(&gpu).unwrap();
    assert_eq!(report.overfull_cells, 0);
    assert!(report.host.assignments > 0);
    assert!(report.mismatch_ratio() < 0.05, "{report:?}");
}

#[test]
fn full_gpu_cells_keep_the_first_lights() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let config = LightingConfig {
        max_lights_per_cluster: 2,
        light_radius: 1.0e4,
        initial_num_lights: 5,
        ..config()
    };
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config, StrategyKind::ForwardPlus).unwrap();

    orchestrator.render_frame(&gpu, &camera(), &scene, 1.5).unwrap();
    let first =
        readback::read_cluster_set(gpu.device(), gpu.queue(), orchestrator.lighting()).unwrap();
    let grid = *orchestrator.lighting().grid();
    for cell in 0..grid.total_clusters() {
        assert_eq!(first.count(cell), 2, "cell {cell}");
        assert_eq!(first.indices(cell), &[0, 1], "cell {cell}");
    }

    let report = orchestrator.validate_clusters(&gpu).unwrap();
    assert_eq!(report.host.truncated_cells, grid.total_clusters());
    assert!(report.is_exact(), "{report:?}");
}

#[test]
fn same_time_and_camera_give_identical_cluster_buffers() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config(), StrategyKind::ClusteredDeferred).unwrap();
    orchestrator.set_active_count(500).unwrap();

    orchestrator.render_frame(&gpu, &camera(), &scene, 2.25).unwrap();
    let first =
        readback::read_cluster_set(gpu.device(), gpu.queue(), orchestrator.lighting()).unwrap();
    orchestrator.render_frame(&gpu, &camera(), &scene, 2.25).unwrap();
    let second =
        readback::read_cluster_set(gpu.device(), gpu.queue(), orchestrator.lighting()).unwrap();

    assert!(first.total_assignments() > 0);
    assert!(first.as_bytes() == second.as_bytes());
}

#[test]
fn aborted_frame_blocks_cluster_validation() {
    let Some(gpu) = headless() else { return };
    let scene = Scene::demo(gpu.device()).unwrap();
    let mut orchestrator =
        FrameOrchestrator::new(gpu.device(), config(), StrategyKind::ForwardPlus).unwrap();

    orchestrator.render_frame(&gpu, &camera(), &scene, 0.5).unwrap();
    assert!(orchestrator.validate_clusters(&gpu).is_ok());

    // Lights move to t = 4 but the cluster buffer still holds t = 0.5.
    orchestrator
        .render_frame(&LostSurface(&gpu), &camera(), &scene, 4.0)
        .unwrap_err();
    assert!(orchestrator.validate_clusters(&gpu).is_err());

    orchestrator.render_frame(&gpu, &camera(), &scene, 4.0).unwrap();
    assert!(orchestrator.validate_clusters(&gpu).is_ok());
}
