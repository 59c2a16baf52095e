use anyhow::Result;

use crate::camera::{Camera, CameraUniforms};
use crate::config::LightingConfig;
use crate::device::FrameSource;
use crate::error::{FrameError, LightCountError};
use crate::lights::workgroup_count;
use crate::scene::Scene;

use super::ctx::{RenderCtx, RenderTarget};
use super::lighting::LightingResources;
use super::readback::{self, ValidationReport};
use super::stage::{FrameStage, StageTracker};
use super::strategy::{RenderStrategy, StrategyKind};

/// What one presented frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub strategy: StrategyKind,
    pub num_lights: usize,
    pub target_size: [u32; 2],
    /// Motion kernel workgroups (zero when no light is active).
    pub motion_workgroups: u32,
    /// Clustering kernel workgroups per axis.
    pub cluster_workgroups: [u32; 3],
}

/// Runs frames: motion, clustering, the strategy's passes, present.
///
/// The light and cluster buffers belong to the orchestrator and are shared by
/// whichever strategy is active; switching strategies never reallocates them.
pub struct FrameOrchestrator {
    lighting: LightingResources,
    strategy: Box<dyn RenderStrategy>,
    /// Camera of the last presented frame. Cleared whenever lights move, so it
    /// is only set while the cluster buffer matches the light positions.
    last_camera: Option<CameraUniforms>,
    frames: u64,
}

fn enter(tracker: &mut StageTracker, stage: FrameStage) {
    let entered = tracker.enter(stage);
    debug_assert!(entered, "frame stage {stage} entered out of order");
}

impl FrameOrchestrator {
    pub fn new(device: &wgpu::Device, config: LightingConfig, strategy: StrategyKind) -> Result<Self> {
        let lighting = LightingResources::new(device, config)?;
        log::info!("render strategy: {strategy}");
        Ok(Self {
            lighting,
            strategy: strategy.create(),
            last_camera: None,
            frames: 0,
        })
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Takes effect from the next frame.
    pub fn set_strategy(&mut self, kind: StrategyKind) {
        if self.strategy.kind() == kind {
            return;
        }
        log::info!("render strategy: {} -> {kind}", self.strategy.kind());
        self.strategy = kind.create();
    }

    pub fn lighting(&self) -> &LightingResources {
        &self.lighting
    }

    pub fn num_lights(&self) -> usize {
        self.lighting.num_lights()
    }

    pub fn set_active_count(&mut self, n: usize) -> Result<(), LightCountError> {
        self.lighting.set_active_count(n)
    }

    /// Frames presented so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Renders and presents one frame at `time` seconds.
    ///
    /// Either every stage runs and the frame is presented, or an error is
    /// returned and nothing is presented. Motion already submitted for an
    /// aborted frame stays applied.
    pub fn render_frame(
        &mut self,
        source: &impl FrameSource,
        camera: &Camera,
        scene: &Scene,
        time: f32,
    ) -> Result<FrameReport, FrameError> {
        let size = source.target_size();
        if size[0] == 0 || size[1] == 0 {
            return Err(FrameError::ZeroSizedTarget);
        }
        let device = source.device();
        let queue = source.queue();
        let mut tracker = StageTracker::new();

        enter(&mut tracker, FrameStage::MotionUpdate);
        self.lighting.submit_motion(device, queue, time);
        self.last_camera = None;

        enter(&mut tracker, FrameStage::ClusterAssignment);
        let uniforms = camera.uniforms(size);
        self.lighting.write_camera(queue, &uniforms);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lucent frame encoder"),
        });
        self.lighting.record_clustering(&mut encoder);

        enter(&mut tracker, FrameStage::GeometryPass);
        // Dropping the encoder on failure discards the recorded clustering.
        let target = source.acquire()?;
        if target.size[0] == 0 || target.size[1] == 0 {
            return Err(FrameError::ZeroSizedTarget);
        }
        let ctx = RenderCtx {
            device,
            queue,
            lighting: &self.lighting,
            scene,
        };
        let mut render_target = RenderTarget {
            encoder: &mut encoder,
            color_view: &target.view,
            format: target.format,
            size: target.size,
        };
        self.strategy.record(&ctx, &mut render_target);

        enter(&mut tracker, FrameStage::Present);
        queue.submit(Some(encoder.finish()));
        target.present();

        self.last_camera = Some(uniforms);
        self.frames += 1;

        let config = self.lighting.config();
        Ok(FrameReport {
            frame_index: self.frames - 1,
            strategy: self.strategy.kind(),
            num_lights: self.lighting.num_lights(),
            target_size: size,
            motion_workgroups: workgroup_count(
                self.lighting.num_lights(),
                config.move_lights_workgroup_size,
            ),
            cluster_workgroups: self
                .lighting
                .grid()
                .workgroup_counts(config.cluster_workgroup_size),
        })
    }

    /// Compares the cluster buffer of the last presented frame with the host
    /// assignment for the same camera and light positions.
    ///
    /// Fails when no frame has been presented since the lights last moved: an
    /// aborted frame moves the lights without reclustering them.
    pub fn validate_clusters(&mut self, source: &impl FrameSource) -> Result<ValidationReport> {
        let Some(camera) = self.last_camera else {
            anyhow::bail!("no presented frame matches the current light positions");
        };
        readback::validate_clusters(source.device(), source.queue(), &mut self.lighting, &camera)
    }
}
