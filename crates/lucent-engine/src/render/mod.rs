//! GPU frame pipeline.
//!
//! [`LightingResources`] holds the light and cluster buffers and the two
//! compute kernels. [`FrameOrchestrator`] sequences a frame through motion,
//! clustering, the active [`RenderStrategy`] and presentation.
//!
//! Convention:
//! - World space is right-handed, +Y up; the camera looks down -Z in view space.
//! - Every shader module is the generated constants, `common.wgsl`, then its body.

mod ctx;
mod lighting;
mod orchestrator;
pub mod readback;
mod shaders;
mod stage;
pub mod strategy;
mod targets;

pub use ctx::{RenderCtx, RenderTarget};
pub use lighting::LightingResources;
pub use orchestrator::{FrameOrchestrator, FrameReport};
pub use readback::ValidationReport;
pub use shaders::{constants_preamble, ShaderLibrary};
pub use stage::{FrameStage, StageTracker};
pub use strategy::{RenderStrategy, StrategyKind};
pub use targets::{DepthTarget, GBuffer, DEPTH_FORMAT};
