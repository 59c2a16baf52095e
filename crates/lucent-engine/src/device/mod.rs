//! GPU device + frame target management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the window Surface, or an offscreen target
//! - handing out one color target per frame through [`FrameSource`]

mod error;
mod gpu;
mod headless;
mod init;
mod surface;
mod target;

pub use error::SurfaceErrorAction;
pub use gpu::Gpu;
pub use headless::HeadlessGpu;
pub use init::GpuInit;
pub use target::{FrameSource, FrameTarget};
