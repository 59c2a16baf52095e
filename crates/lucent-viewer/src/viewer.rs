use anyhow::Result;

use lucent_engine::camera::{Camera, FlyController};
use lucent_engine::core::{App, AppControl, FrameCtx};
use lucent_engine::device::{FrameSource, Gpu};
use lucent_engine::input::Key;
use lucent_engine::render::{FrameOrchestrator, FrameReport, StrategyKind};
use lucent_engine::scene::Scene;
use lucent_engine::LightingConfig;

/// Light count step for `Up`/`Down`, and with `Shift` held.
const LIGHT_STEP: usize = 10;
const LIGHT_STEP_LARGE: usize = 500;

/// Seconds between title refreshes.
const TITLE_INTERVAL: f32 = 0.5;

struct GpuState {
    scene: Scene,
    orchestrator: FrameOrchestrator,
}

pub struct Viewer {
    config: LightingConfig,
    camera: Camera,
    controller: FlyController,
    gpu: Option<GpuState>,

    /// Frame times accumulated since the last title refresh.
    title_elapsed: f32,
    title_frames: u32,
    last_report: Option<FrameReport>,
}

impl Viewer {
    pub fn new(config: LightingConfig) -> Self {
        Self {
            config,
            camera: Camera::default(),
            controller: FlyController::default(),
            gpu: None,
            title_elapsed: 0.0,
            title_frames: 0,
            last_report: None,
        }
    }
}

/// `current` moved by `step` in the given direction, or `None` on underflow.
fn stepped_count(current: usize, step: usize, up: bool) -> Option<usize> {
    if up {
        current.checked_add(step)
    } else {
        current.checked_sub(step)
    }
}

fn strategy_for_key(ctx: &FrameCtx<'_, '_>) -> Option<StrategyKind> {
    [Key::Digit1, Key::Digit2, Key::Digit3]
        .into_iter()
        .zip(StrategyKind::ALL)
        .find(|(key, _)| ctx.input_frame.pressed(*key))
        .map(|(_, kind)| kind)
}

fn title(report: &FrameReport, frame_ms: f32) -> String {
    format!(
        "Lucent | {} | {} lights | {:.2} ms",
        report.strategy, report.num_lights, frame_ms
    )
}

impl App for Viewer {
    fn on_start(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let device = gpu.device();
        let scene = Scene::demo(device)?;
        let orchestrator = FrameOrchestrator::new(device, self.config.clone(), StrategyKind::default())?;
        self.gpu = Some(GpuState { scene, orchestrator });
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.pressed(Key::Escape) {
            return AppControl::Exit;
        }
        let Some(state) = self.gpu.as_mut() else {
            return AppControl::Continue;
        };

        if let Some(kind) = strategy_for_key(ctx) {
            state.orchestrator.set_strategy(kind);
        }

        let up = ctx.input_frame.pressed(Key::ArrowUp);
        let down = ctx.input_frame.pressed(Key::ArrowDown);
        if up != down {
            let step = if ctx.input.key_down(Key::Shift) {
                LIGHT_STEP_LARGE
            } else {
                LIGHT_STEP
            };
            match stepped_count(state.orchestrator.num_lights(), step, up) {
                Some(n) => {
                    if let Err(err) = state.orchestrator.set_active_count(n) {
                        log::warn!("{err}");
                    }
                }
                None => log::warn!("light count cannot go below zero"),
            }
        }

        let [w, h] = ctx.gpu.target_size();
        self.camera.set_viewport(w, h);
        self.controller
            .update(&mut self.camera, ctx.input, ctx.input_frame, ctx.time.dt);

        let result = state.orchestrator.render_frame(
            &*ctx.gpu,
            &self.camera,
            &state.scene,
            ctx.time.elapsed,
        );
        match result {
            Ok(report) => self.last_report = Some(report),
            Err(err) => return ctx.handle_frame_error(&err),
        }

        if ctx.input_frame.pressed(Key::V) {
            if let Err(err) = state.orchestrator.validate_clusters(&*ctx.gpu) {
                log::error!("cluster validation failed: {err:#}");
            }
        }

        self.title_elapsed += ctx.time.dt;
        self.title_frames += 1;
        if self.title_elapsed >= TITLE_INTERVAL {
            if let Some(report) = &self.last_report {
                let frame_ms = 1000.0 * self.title_elapsed / self.title_frames as f32;
                ctx.runtime.set_title(title(report, frame_ms));
            }
            self.title_elapsed = 0.0;
            self.title_frames = 0;
        }

        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_below_zero_is_refused() {
        assert_eq!(stepped_count(5, LIGHT_STEP, false), None);
        assert_eq!(stepped_count(10, LIGHT_STEP, false), Some(0));
        assert_eq!(stepped_count(10, LIGHT_STEP_LARGE, true), Some(510));
    }

    #[test]
    fn title_shows_strategy_and_count() {
        let report = FrameReport {
            frame_index: 3,
            strategy: StrategyKind::ClusteredDeferred,
            num_lights: 500,
            target_size: [1280, 720],
            motion_workgroups: 4,
            cluster_workgroups: [4, 3, 6],
        };
        assert_eq!(title(&report, 16.666), "Lucent | Clustered Deferred | 500 lights | 16.67 ms");
    }
}
