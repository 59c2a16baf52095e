//! Domain error types.
//!
//! Setup and plumbing failures use `anyhow` with context, like the device and
//! runtime layers. The types here are the ones callers are expected to match on.

use thiserror::Error;

/// Rejected change to the active light count.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LightCountError {
    /// The requested count is larger than the light set capacity.
    #[error("light count {requested} out of range (capacity {capacity})")]
    OutOfRange { requested: usize, capacity: usize },
}

/// Reason a frame was abandoned before presentation.
///
/// A frame either runs all four stages or nothing is presented. The frame loop
/// decides whether to try again on the next tick.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The presentable color target could not be acquired.
    #[error("failed to acquire frame target: {0}")]
    ResourceAcquisition(#[from] wgpu::SurfaceError),

    /// The target was acquired but has no drawable area (minimized window).
    #[error("frame target has zero size")]
    ZeroSizedTarget,
}
